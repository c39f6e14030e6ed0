//! Moves module - move kinds, the static move table and running move state

mod kind;
mod runtime;
mod table;

pub use kind::{MoveType, UnknownMove};
pub use runtime::{Move, StepEffect};
pub use table::{Impact, Motion, MoveSpec, StepPolicy, spec};
