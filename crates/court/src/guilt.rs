use serde::Serialize;

use crate::events::Outbox;

/// The suspect starts the interrogation nearly condemned.
pub const INITIAL_GUILT_PERCENTAGE: f32 = 98.0;
/// Winning requires guilt strictly below this threshold.
pub const VICTORY_GUILT_THRESHOLD: f32 = 92.0;

const MIN_GUILT: f32 = 0.0;
const MAX_GUILT: f32 = 100.0;
const RED_BAND_THRESHOLD: f32 = 90.0;
const YELLOW_BAND_THRESHOLD: f32 = 50.0;

/// Display band for the meter: Red at 90% and above, Yellow from 50%,
/// Green below that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GuiltBand {
    Red,
    Yellow,
    Green,
}

impl GuiltBand {
    pub fn as_token(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Yellow => "yellow",
            Self::Green => "green",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GuiltEvent {
    Changed { percentage: f32 },
}

/// Bounded [0, 100] guilt meter. Every mutation clamps and notifies, even
/// when clamping leaves the stored value unchanged.
#[derive(Debug)]
pub struct GuiltMeter {
    percentage: f32,
    events: Outbox<GuiltEvent>,
}

impl Default for GuiltMeter {
    fn default() -> Self {
        Self::new()
    }
}

impl GuiltMeter {
    pub fn new() -> Self {
        Self {
            percentage: INITIAL_GUILT_PERCENTAGE,
            events: Outbox::default(),
        }
    }

    pub fn percentage(&self) -> f32 {
        self.percentage
    }

    pub fn reset(&mut self) {
        self.set(INITIAL_GUILT_PERCENTAGE);
    }

    pub fn set(&mut self, percentage: f32) {
        self.percentage = percentage.clamp(MIN_GUILT, MAX_GUILT);
        self.events.emit(GuiltEvent::Changed {
            percentage: self.percentage,
        });
    }

    pub fn increase(&mut self, amount: f32) {
        self.set(self.percentage + amount);
    }

    pub fn decrease(&mut self, amount: f32) {
        self.set(self.percentage - amount);
    }

    pub fn band(&self) -> GuiltBand {
        if self.percentage >= RED_BAND_THRESHOLD {
            GuiltBand::Red
        } else if self.percentage >= YELLOW_BAND_THRESHOLD {
            GuiltBand::Yellow
        } else {
            GuiltBand::Green
        }
    }

    /// Meter fill in [0, 1] for display bars.
    pub fn normalized(&self) -> f32 {
        self.percentage / MAX_GUILT
    }

    pub fn is_victory_condition_met(&self) -> bool {
        self.percentage < VICTORY_GUILT_THRESHOLD
    }

    pub(crate) fn drain_events(&mut self) -> Vec<GuiltEvent> {
        self.events.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_meter_reads_ninety_eight_percent() {
        let meter = GuiltMeter::new();
        assert_eq!(meter.percentage(), 98.0);
        assert!(!meter.is_victory_condition_met());
    }

    #[test]
    fn set_clamps_to_meter_bounds() {
        let mut meter = GuiltMeter::new();
        meter.set(150.0);
        assert_eq!(meter.percentage(), 100.0);

        meter.set(-10.0);
        assert_eq!(meter.percentage(), 0.0);
    }

    #[test]
    fn victory_threshold_is_strictly_below_ninety_two() {
        let mut meter = GuiltMeter::new();
        meter.set(92.0);
        assert!(!meter.is_victory_condition_met());

        meter.set(91.999);
        assert!(meter.is_victory_condition_met());
    }

    #[test]
    fn band_boundaries_follow_the_display_thresholds() {
        let mut meter = GuiltMeter::new();
        meter.set(90.0);
        assert_eq!(meter.band(), GuiltBand::Red);

        meter.set(89.999);
        assert_eq!(meter.band(), GuiltBand::Yellow);

        meter.set(50.0);
        assert_eq!(meter.band(), GuiltBand::Yellow);

        meter.set(49.999);
        assert_eq!(meter.band(), GuiltBand::Green);
    }

    #[test]
    fn increase_and_decrease_shift_from_the_current_value() {
        let mut meter = GuiltMeter::new();
        meter.set(50.0);
        meter.increase(10.0);
        assert_eq!(meter.percentage(), 60.0);

        meter.decrease(15.0);
        assert_eq!(meter.percentage(), 45.0);

        meter.increase(-5.0);
        assert_eq!(meter.percentage(), 40.0);
    }

    #[test]
    fn normalized_maps_percentage_into_unit_range() {
        let mut meter = GuiltMeter::new();
        meter.set(50.0);
        assert_eq!(meter.normalized(), 0.5);

        meter.set(100.0);
        assert_eq!(meter.normalized(), 1.0);
    }

    #[test]
    fn set_notifies_even_when_the_clamped_value_is_unchanged() {
        let mut meter = GuiltMeter::new();
        meter.set(150.0);
        meter.set(120.0);

        assert_eq!(
            meter.drain_events(),
            vec![
                GuiltEvent::Changed { percentage: 100.0 },
                GuiltEvent::Changed { percentage: 100.0 }
            ]
        );
    }

    #[test]
    fn reset_restores_the_initial_reading_and_notifies() {
        let mut meter = GuiltMeter::new();
        meter.set(10.0);
        meter.drain_events();

        meter.reset();
        assert_eq!(meter.percentage(), 98.0);
        assert_eq!(
            meter.drain_events(),
            vec![GuiltEvent::Changed { percentage: 98.0 }]
        );
    }
}
