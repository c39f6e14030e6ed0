//! Realtime peer synchronisation: move relay, heartbeats and inbound filtering

use bevy::log::{debug, warn};

use super::channel::PeerChannel;
use super::protocol::{PeerMessage, decode, encode, now_ms};
use crate::fighter::Fighter;
use crate::moves::MoveType;
use crate::scoring::MatchState;
use crate::tuning::FightTuning;

/// Counters describing how the peer link behaved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub sent: u64,
    pub send_failures: u64,
    pub received: u64,
    pub ignored_self: u64,
    pub foreign_room: u64,
    pub malformed: u64,
}

/// Peer state to apply to the remote fighter or the match
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteUpdate {
    /// First message seen from the other player
    Connected(String),
    Move(MoveType),
    Position { x: f32, y: f32 },
    Life(f32),
    GameState(MatchState),
}

/// Repeating send slot with a minimum gap between two sends
#[derive(Debug, Clone)]
struct Heartbeat {
    interval_ms: u32,
    min_gap_ms: u32,
    elapsed_ms: u32,
    since_last_ms: Option<u64>,
}

impl Heartbeat {
    fn new(interval_ms: u32, min_gap_ms: u32) -> Self {
        Self {
            interval_ms,
            min_gap_ms,
            elapsed_ms: 0,
            since_last_ms: None,
        }
    }

    /// Advance; true when the interval fired and the gap since the last send allows another
    fn tick(&mut self, dt_ms: u32) -> bool {
        if let Some(since) = self.since_last_ms.as_mut() {
            *since += dt_ms as u64;
        }
        self.elapsed_ms += dt_ms;
        if self.interval_ms == 0 || self.elapsed_ms < self.interval_ms {
            return false;
        }
        self.elapsed_ms %= self.interval_ms;
        self.since_last_ms
            .is_none_or(|since| since > self.min_gap_ms as u64)
    }

    fn mark_sent(&mut self) {
        self.since_last_ms = Some(0);
    }
}

/// Relays the local fighter to the room and turns inbound traffic into [`RemoteUpdate`]s.
///
/// Sends never block and never fail the caller: errors are logged, counted
/// and queued in [`RealtimeSync::drain_failures`] for the event log.
pub struct RealtimeSync {
    room_id: String,
    player_id: String,
    channel: Box<dyn PeerChannel>,
    position: Heartbeat,
    life: Heartbeat,
    stats: SyncStats,
    peer: Option<String>,
    failures: Vec<String>,
}

impl RealtimeSync {
    pub fn new(
        room_id: impl Into<String>,
        player_id: impl Into<String>,
        channel: Box<dyn PeerChannel>,
        tuning: &FightTuning,
    ) -> Self {
        Self {
            room_id: room_id.into(),
            player_id: player_id.into(),
            channel,
            position: Heartbeat::new(tuning.position_sync_interval_ms, tuning.position_sync_min_gap_ms),
            life: Heartbeat::new(tuning.life_sync_interval_ms, tuning.life_sync_min_gap_ms),
            stats: SyncStats::default(),
            peer: None,
            failures: Vec::new(),
        }
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    pub fn stats(&self) -> SyncStats {
        self.stats
    }

    /// Player id of the other client, once it has been heard from
    pub fn peer(&self) -> Option<&str> {
        self.peer.as_deref()
    }

    pub fn drain_failures(&mut self) -> Vec<String> {
        std::mem::take(&mut self.failures)
    }

    fn publish(&mut self, message: PeerMessage) -> bool {
        let result = encode(&self.room_id, &message).and_then(|bytes| self.channel.send(&bytes));
        match result {
            Ok(()) => {
                self.stats.sent += 1;
                true
            }
            Err(e) => {
                self.stats.send_failures += 1;
                warn!("Peer send of {} failed: {}", message.kind(), e);
                self.failures.push(format!("{}: {}", message.kind(), e));
                false
            }
        }
    }

    pub fn broadcast_move(&mut self, kind: MoveType) -> bool {
        self.publish(PeerMessage::Move {
            player_id: self.player_id.clone(),
            mv: kind.as_str().to_string(),
            timestamp: now_ms(),
        })
    }

    pub fn broadcast_position(&mut self, x: f32, y: f32) -> bool {
        self.publish(PeerMessage::Position {
            player_id: self.player_id.clone(),
            x,
            y,
            timestamp: now_ms(),
        })
    }

    pub fn broadcast_life(&mut self, life: f32) -> bool {
        self.publish(PeerMessage::Life {
            player_id: self.player_id.clone(),
            life,
            timestamp: now_ms(),
        })
    }

    pub fn broadcast_game_state(&mut self, state: &MatchState) -> bool {
        let message = PeerMessage::game_state(&self.player_id, state, now_ms());
        self.publish(message)
    }

    /// Heartbeats for the local fighter. Position is held back while airborne.
    pub fn tick(&mut self, dt_ms: u32, local: &Fighter) {
        if self.position.tick(dt_ms) && !local.is_jumping() && self.broadcast_position(local.x(), local.y()) {
            self.position.mark_sent();
        }
        if self.life.tick(dt_ms) && self.broadcast_life(local.life()) {
            self.life.mark_sent();
        }
    }

    /// Drain the channel. Own echoes, other rooms and malformed payloads are dropped.
    pub fn poll(&mut self) -> Vec<RemoteUpdate> {
        let payloads = match self.channel.poll() {
            Ok(payloads) => payloads,
            Err(e) => {
                warn!("Peer receive failed: {}", e);
                return Vec::new();
            }
        };

        let mut updates = Vec::new();
        for payload in payloads {
            let envelope = match decode(&payload) {
                Ok(envelope) => envelope,
                Err(e) => {
                    self.stats.malformed += 1;
                    warn!("Dropping malformed peer payload: {}", e);
                    continue;
                }
            };
            if envelope.room_id != self.room_id {
                self.stats.foreign_room += 1;
                continue;
            }
            let message = envelope.message;
            if message.player_id() == self.player_id {
                self.stats.ignored_self += 1;
                continue;
            }
            self.stats.received += 1;
            if self.peer.is_none() {
                self.peer = Some(message.player_id().to_string());
                updates.push(RemoteUpdate::Connected(message.player_id().to_string()));
            }

            match &message {
                PeerMessage::Move { mv, .. } => match mv.parse::<MoveType>() {
                    Ok(kind) => updates.push(RemoteUpdate::Move(kind)),
                    Err(e) => {
                        self.stats.malformed += 1;
                        warn!("Peer sent {}", e);
                    }
                },
                PeerMessage::Position { x, y, .. } => updates.push(RemoteUpdate::Position { x: *x, y: *y }),
                PeerMessage::Life { life, .. } => updates.push(RemoteUpdate::Life(*life)),
                PeerMessage::GameState { .. } => {
                    if let Some(state) = message.to_match_state() {
                        updates.push(RemoteUpdate::GameState(state));
                    }
                }
            }
        }
        if !updates.is_empty() {
            debug!("{} peer updates", updates.len());
        }
        updates
    }

    /// Leave the room; idempotent
    pub fn close(&mut self) {
        self.channel.close();
    }
}
