//! Gameplay logic core for Mercy Court: a countdown clock, a bounded guilt
//! meter, a four-state machine, and the director that wires them together
//! and renders the verdict.
//!
//! The crate is single-threaded and does no I/O. A host drives it by calling
//! [`GameDirector::tick`] once per frame and forwarding user intents to the
//! director's command operations; presentation code observes through read
//! accessors and the [`GameEvent`] listener registry.

pub mod director;
pub mod events;
pub mod guilt;
pub mod state;
pub mod timer;

pub use director::GameDirector;
pub use events::{GameEvent, ListenerId, ListenerSet};
pub use guilt::{
    GuiltBand, GuiltMeter, INITIAL_GUILT_PERCENTAGE, VICTORY_GUILT_THRESHOLD,
};
pub use state::{GameState, StateMachine};
pub use timer::{GameTimer, GAME_SECONDS_PER_REAL_SECOND, INITIAL_GAME_SECONDS};
