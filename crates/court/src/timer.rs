use crate::events::Outbox;

/// 90 in-game minutes, mapped onto 5 real minutes of play.
pub const INITIAL_GAME_SECONDS: f32 = 90.0 * 60.0;
/// 300 real seconds must cover 5400 game seconds.
pub const GAME_SECONDS_PER_REAL_SECOND: f32 = 18.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimerEvent {
    Updated { remaining_game_seconds: f32 },
    Expired,
}

/// Countdown clock for the interrogation. Counts in game seconds, is driven
/// with real-second deltas, and notifies through its outbox.
#[derive(Debug)]
pub struct GameTimer {
    remaining_game_seconds: f32,
    paused: bool,
    events: Outbox<TimerEvent>,
}

impl Default for GameTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl GameTimer {
    pub fn new() -> Self {
        Self {
            remaining_game_seconds: INITIAL_GAME_SECONDS,
            paused: false,
            events: Outbox::default(),
        }
    }

    pub fn remaining_game_seconds(&self) -> f32 {
        self.remaining_game_seconds
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn reset(&mut self) {
        self.remaining_game_seconds = INITIAL_GAME_SECONDS;
        self.paused = false;
        self.events.emit(TimerEvent::Updated {
            remaining_game_seconds: self.remaining_game_seconds,
        });
    }

    /// Advances the countdown by `delta_real_seconds` of real time. No-op
    /// while paused or after expiry, so Expired fires once per crossing.
    /// Callers pass non-negative deltas; negative input is outside the
    /// contract.
    pub fn update(&mut self, delta_real_seconds: f32) {
        if self.paused || self.remaining_game_seconds <= 0.0 {
            return;
        }

        self.remaining_game_seconds -= delta_real_seconds * GAME_SECONDS_PER_REAL_SECOND;

        if self.remaining_game_seconds <= 0.0 {
            self.remaining_game_seconds = 0.0;
            self.events.emit(TimerEvent::Expired);
        }

        self.events.emit(TimerEvent::Updated {
            remaining_game_seconds: self.remaining_game_seconds,
        });
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn add_time(&mut self, game_seconds: f32) {
        self.remaining_game_seconds =
            (self.remaining_game_seconds + game_seconds).clamp(0.0, INITIAL_GAME_SECONDS);
        self.events.emit(TimerEvent::Updated {
            remaining_game_seconds: self.remaining_game_seconds,
        });
    }

    /// Removes time even while paused (the dev surface relies on this), and
    /// re-fires Expired on every call that lands at zero.
    pub fn subtract_time(&mut self, game_seconds: f32) {
        self.remaining_game_seconds = (self.remaining_game_seconds - game_seconds).max(0.0);
        self.events.emit(TimerEvent::Updated {
            remaining_game_seconds: self.remaining_game_seconds,
        });

        if self.remaining_game_seconds <= 0.0 {
            self.events.emit(TimerEvent::Expired);
        }
    }

    /// Remaining time as zero-padded `MM:SS`.
    pub fn formatted_time(&self) -> String {
        let total_seconds = self.remaining_game_seconds.floor() as u32;
        let minutes = total_seconds / 60;
        let seconds = total_seconds % 60;
        format!("{minutes:02}:{seconds:02}")
    }

    pub(crate) fn drain_events(&mut self) -> Vec<TimerEvent> {
        self.events.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_timer_holds_ninety_game_minutes() {
        let timer = GameTimer::new();
        assert_eq!(timer.remaining_game_seconds(), 5400.0);
        assert_eq!(timer.formatted_time(), "90:00");
        assert!(!timer.is_paused());
    }

    #[test]
    fn one_real_second_burns_eighteen_game_seconds() {
        let mut timer = GameTimer::new();
        timer.update(1.0);
        assert_eq!(timer.remaining_game_seconds(), 5382.0);
    }

    #[test]
    fn update_while_paused_changes_nothing_and_emits_nothing() {
        let mut timer = GameTimer::new();
        timer.drain_events();
        timer.pause();
        timer.update(1.0);

        assert_eq!(timer.remaining_game_seconds(), 5400.0);
        assert!(timer.drain_events().is_empty());
    }

    #[test]
    fn toggle_pause_flips_the_flag() {
        let mut timer = GameTimer::new();
        timer.toggle_pause();
        assert!(timer.is_paused());
        timer.toggle_pause();
        assert!(!timer.is_paused());
    }

    #[test]
    fn reset_restores_initial_time_and_clears_pause() {
        let mut timer = GameTimer::new();
        timer.subtract_time(1234.0);
        timer.pause();
        timer.drain_events();

        timer.reset();
        assert_eq!(timer.remaining_game_seconds(), 5400.0);
        assert!(!timer.is_paused());
        assert_eq!(
            timer.drain_events(),
            vec![TimerEvent::Updated {
                remaining_game_seconds: 5400.0
            }]
        );
    }

    #[test]
    fn add_time_clamps_at_the_initial_amount() {
        let mut timer = GameTimer::new();
        timer.add_time(100.0);
        assert_eq!(timer.remaining_game_seconds(), 5400.0);

        timer.subtract_time(300.0);
        timer.add_time(60.0);
        assert_eq!(timer.remaining_game_seconds(), 5160.0);
    }

    #[test]
    fn update_expiry_emits_expired_before_updated_exactly_once() {
        let mut timer = GameTimer::new();
        timer.subtract_time(5399.0);
        timer.drain_events();

        timer.update(1.0);
        assert_eq!(
            timer.drain_events(),
            vec![
                TimerEvent::Expired,
                TimerEvent::Updated {
                    remaining_game_seconds: 0.0
                }
            ]
        );

        timer.update(1.0);
        assert!(timer.drain_events().is_empty());
    }

    #[test]
    fn subtract_time_expires_regardless_of_pause() {
        let mut timer = GameTimer::new();
        timer.pause();
        timer.drain_events();

        timer.subtract_time(timer.remaining_game_seconds());
        assert_eq!(timer.remaining_game_seconds(), 0.0);
        assert_eq!(
            timer.drain_events(),
            vec![
                TimerEvent::Updated {
                    remaining_game_seconds: 0.0
                },
                TimerEvent::Expired
            ]
        );
    }

    #[test]
    fn subtract_time_at_zero_refires_expired() {
        let mut timer = GameTimer::new();
        timer.subtract_time(5400.0);
        timer.drain_events();

        timer.subtract_time(60.0);
        assert_eq!(timer.remaining_game_seconds(), 0.0);
        assert_eq!(
            timer.drain_events(),
            vec![
                TimerEvent::Updated {
                    remaining_game_seconds: 0.0
                },
                TimerEvent::Expired
            ]
        );
    }

    #[test]
    fn formatted_time_floors_and_zero_pads() {
        let mut timer = GameTimer::new();
        timer.subtract_time(0.5);
        assert_eq!(timer.formatted_time(), "89:59");

        timer.subtract_time(5399.5 - 61.0);
        assert_eq!(timer.formatted_time(), "01:01");

        timer.subtract_time(2.0);
        assert_eq!(timer.formatted_time(), "00:59");

        timer.subtract_time(59.0);
        assert_eq!(timer.formatted_time(), "00:00");
    }
}
