//! Fight event logging
//!
//! Provides a compact text format for every round, move, hit and peer event.
//! Sessions emit into an [`EventBus`]; simulations keep the drained events in
//! an [`EventBuffer`], the windowed game persists them to SQLite.

mod buffer;
mod bus;
mod format;
mod sqlite_logger;
mod types;

pub use buffer::EventBuffer;
pub use bus::{BusEvent, EventBus};
pub use format::{parse_event, serialize_event};
pub use sqlite_logger::{EVENT_DB_FILE, SqliteEventLogger, flush_events_to_sqlite};
pub use types::{GameEvent, PlayerId};
