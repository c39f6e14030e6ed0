//! Net module - peer protocol, broadcast transports and realtime sync
//!
//! Each client simulates its own fighter and trusts the other client's
//! broadcasts for the opponent. Nothing here ever blocks the frame.

mod channel;
mod protocol;
mod quic;
mod sync;

pub use channel::{LoopbackChannel, LoopbackRoom, PeerChannel};
pub use protocol::{PeerEnvelope, PeerMessage, decode, encode, now_ms};
pub use quic::QuicChannel;
pub use sync::{RealtimeSync, RemoteUpdate, SyncStats};

use thiserror::Error;

use crate::moves::UnknownMove;

#[derive(Debug, Error)]
pub enum NetError {
    #[error("peer channel I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error("peer payload: {0}")]
    Codec(#[from] serde_json::Error),
    #[error(transparent)]
    UnknownMove(#[from] UnknownMove),
    #[error("peer link: {0}")]
    Link(String),
    #[error("peer channel offline")]
    Offline,
    #[error("peer channel closed")]
    Closed,
}
