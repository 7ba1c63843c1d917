use court::{GameDirector, GameState, GuiltBand};
use serde::Serialize;

/// Point-in-time view of the whole game, for the console `status` command.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct StatusSnapshot {
    state: GameState,
    guilt_percentage: f32,
    guilt_band: GuiltBand,
    remaining_game_seconds: f32,
    clock: String,
    paused: bool,
}

impl StatusSnapshot {
    pub(crate) fn capture(director: &GameDirector) -> Self {
        Self {
            state: director.state().current(),
            guilt_percentage: director.guilt().percentage(),
            guilt_band: director.guilt().band(),
            remaining_game_seconds: director.timer().remaining_game_seconds(),
            clock: director.timer().formatted_time(),
            paused: director.timer().is_paused(),
        }
    }

    pub(crate) fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self)
            .unwrap_or_else(|error| format!("{{\"error\":\"encode status: {error}\"}}"))
    }
}
