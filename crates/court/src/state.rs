use serde::Serialize;

use crate::events::Outbox;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    MainMenu,
    Interrogation,
    Victory,
    GameOver,
}

impl GameState {
    pub fn as_token(self) -> &'static str {
        match self {
            Self::MainMenu => "main_menu",
            Self::Interrogation => "interrogation",
            Self::Victory => "victory",
            Self::GameOver => "game_over",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StateEvent {
    Changed { state: GameState },
}

/// Four-state machine over the game's screens. Transitions are externally
/// requested; the director enforces which ones are meaningful, not this type.
#[derive(Debug)]
pub struct StateMachine {
    current: GameState,
    events: Outbox<StateEvent>,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            current: GameState::MainMenu,
            events: Outbox::default(),
        }
    }

    pub fn current(&self) -> GameState {
        self.current
    }

    /// Same-state requests are silent no-ops.
    pub fn change_to(&mut self, target: GameState) {
        if self.current == target {
            return;
        }

        self.current = target;
        self.events.emit(StateEvent::Changed { state: target });
    }

    pub fn is_playing(&self) -> bool {
        self.current == GameState::Interrogation
    }

    /// Victory and GameOver end the run; only an explicit external request
    /// moves the machine out of them.
    pub fn is_terminal(&self) -> bool {
        matches!(self.current, GameState::Victory | GameState::GameOver)
    }

    pub(crate) fn drain_events(&mut self) -> Vec<StateEvent> {
        self.events.drain()
    }
}
