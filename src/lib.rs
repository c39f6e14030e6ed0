//! Fightgame - a real-time two-fighter arena engine built with Bevy
//!
//! The engine core (moves, fighters, arena, controller, scoring, peer sync) is
//! plain Rust driven by integer millisecond ticks. Bevy supplies the window,
//! input devices and rendering through [`FightPlugin`].

// Engine core
pub mod arena;
pub mod controller;
pub mod countdown;
pub mod fighter;
pub mod moves;
pub mod net;
pub mod scoring;
pub mod session;

// Host and tooling
pub mod config_watcher;
pub mod constants;
pub mod events;
pub mod generate;
pub mod input;
pub mod plugin;
pub mod presentation;
pub mod settings;
pub mod simulation;
pub mod testing;
pub mod tuning;
pub mod ui;

// Re-export commonly used types for convenience
pub use arena::{Arena, ArenaSignal};
pub use config_watcher::ConfigWatcher;
pub use constants::*;
pub use controller::{ControlMode, Controller, ControllerEvent};
pub use countdown::{CountdownPhase, RoundCountdown, RoundTimer};
pub use events::{BusEvent, EventBuffer, EventBus, GameEvent, PlayerId, SqliteEventLogger};
pub use fighter::{Fighter, Orientation};
pub use input::{FightKey, PressedKeys, decide_move};
pub use moves::{MoveType, StepPolicy};
pub use net::{LoopbackRoom, PeerChannel, QuicChannel, RealtimeSync};
pub use plugin::FightPlugin;
pub use presentation::DeviceScale;
pub use scoring::{GameState, MatchState, RoundOutcome};
pub use session::{EngineError, GameSlot, GameType, Session, StartOptions, start};
pub use settings::{CurrentSettings, InitSettings};
pub use tuning::FightTuning;
