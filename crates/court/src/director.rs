use tracing::{info, warn};

use crate::events::{GameEvent, ListenerId, ListenerSet};
use crate::guilt::{GuiltEvent, GuiltMeter};
use crate::state::{GameState, StateEvent, StateMachine};
use crate::timer::{GameTimer, TimerEvent};

/// Upper bound on notification pump passes. Current rules settle in two;
/// the cap keeps a future rule from spinning the pump forever.
const MAX_EVENT_PUMP_PASSES: u32 = 8;

/// Sole owner of the timer, the guilt meter, and the state machine.
///
/// Every mutating entry point runs the event pump afterwards, which applies
/// the cross-system verdict rule and fans notifications out to listeners:
/// - clock expires while guilt is at or above the victory threshold: GameOver;
/// - guilt changes during the interrogation to below the threshold: Victory.
///
/// Expiry with the victory condition already met deliberately triggers
/// neither transition.
pub struct GameDirector {
    timer: GameTimer,
    guilt: GuiltMeter,
    state: StateMachine,
    listeners: ListenerSet<GameEvent>,
}

impl Default for GameDirector {
    fn default() -> Self {
        Self::new()
    }
}

impl GameDirector {
    pub fn new() -> Self {
        Self {
            timer: GameTimer::new(),
            guilt: GuiltMeter::new(),
            state: StateMachine::new(),
            listeners: ListenerSet::default(),
        }
    }

    pub fn timer(&self) -> &GameTimer {
        &self.timer
    }

    pub fn guilt(&self) -> &GuiltMeter {
        &self.guilt
    }

    pub fn state(&self) -> &StateMachine {
        &self.state
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&GameEvent) + 'static) -> ListenerId {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Per-frame entry point. The clock only runs during the interrogation.
    pub fn tick(&mut self, delta_real_seconds: f32) {
        if self.state.is_playing() {
            self.timer.update(delta_real_seconds);
        }
        self.pump_events();
    }

    pub fn start_game(&mut self) {
        info!("game_started");
        self.timer.reset();
        self.guilt.reset();
        self.state.change_to(GameState::Interrogation);
        self.pump_events();
    }

    pub fn restart_game(&mut self) {
        self.start_game();
    }

    pub fn pause_game(&mut self) {
        self.timer.pause();
    }

    pub fn resume_game(&mut self) {
        self.timer.resume();
    }

    pub fn toggle_pause(&mut self) {
        self.timer.toggle_pause();
    }

    /// Leaves timer and guilt untouched; only `start_game` resets them.
    pub fn return_to_main_menu(&mut self) {
        self.state.change_to(GameState::MainMenu);
        self.pump_events();
    }

    pub fn trigger_victory(&mut self) {
        self.enter_terminal_state(GameState::Victory);
        self.pump_events();
    }

    pub fn trigger_game_over(&mut self) {
        self.enter_terminal_state(GameState::GameOver);
        self.pump_events();
    }

    /// Dev-surface mutators. Routed through the director so the verdict rule
    /// still sees the resulting notifications.
    pub fn set_guilt(&mut self, percentage: f32) {
        self.guilt.set(percentage);
        self.pump_events();
    }

    pub fn increase_guilt(&mut self, amount: f32) {
        self.guilt.increase(amount);
        self.pump_events();
    }

    pub fn decrease_guilt(&mut self, amount: f32) {
        self.guilt.decrease(amount);
        self.pump_events();
    }

    pub fn add_time(&mut self, game_seconds: f32) {
        self.timer.add_time(game_seconds);
        self.pump_events();
    }

    /// Removes time even while paused, unlike `tick`.
    pub fn subtract_time(&mut self, game_seconds: f32) {
        self.timer.subtract_time(game_seconds);
        self.pump_events();
    }

    fn enter_terminal_state(&mut self, target: GameState) {
        self.state.change_to(target);
        self.timer.pause();
    }

    fn pump_events(&mut self) {
        for _ in 0..MAX_EVENT_PUMP_PASSES {
            let timer_events = self.timer.drain_events();
            let guilt_events = self.guilt.drain_events();
            let state_events = self.state.drain_events();
            if timer_events.is_empty() && guilt_events.is_empty() && state_events.is_empty() {
                return;
            }

            for event in timer_events {
                match event {
                    TimerEvent::Updated {
                        remaining_game_seconds,
                    } => {
                        self.listeners.broadcast(&GameEvent::TimerUpdated {
                            remaining_game_seconds,
                        });
                    }
                    TimerEvent::Expired => {
                        if !self.guilt.is_victory_condition_met() {
                            self.enter_terminal_state(GameState::GameOver);
                        }
                        self.listeners.broadcast(&GameEvent::TimerExpired);
                    }
                }
            }

            for GuiltEvent::Changed { percentage } in guilt_events {
                if self.state.is_playing() && self.guilt.is_victory_condition_met() {
                    self.enter_terminal_state(GameState::Victory);
                }
                self.listeners
                    .broadcast(&GameEvent::GuiltChanged { percentage });
            }

            for StateEvent::Changed { state } in state_events {
                info!(state = state.as_token(), "state_changed");
                self.listeners.broadcast(&GameEvent::StateChanged { state });
            }
        }

        warn!(
            max_passes = MAX_EVENT_PUMP_PASSES,
            "event pump did not settle; dropping remaining notifications"
        );
    }
}
