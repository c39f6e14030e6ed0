//! Event Bus - timestamped outbox for everything a session does
//!
//! The session emits rounds, moves, hits and peer activity here; hosts drain
//! it once per frame into the SQLite logger, an [`super::EventBuffer`] or a
//! scenario checker.

use super::types::GameEvent;

/// One emitted event and the session time it happened at
#[derive(Debug, Clone, PartialEq)]
pub struct BusEvent {
    pub time_ms: u32,
    pub event: GameEvent,
}

/// Events wait here until the host drains them; each is handed out once
#[derive(Debug, Default)]
pub struct EventBus {
    pending: Vec<BusEvent>,
    now_ms: u32,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp for everything emitted from now on
    pub fn set_time_ms(&mut self, now_ms: u32) {
        self.now_ms = now_ms;
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.pending.push(BusEvent {
            time_ms: self.now_ms,
            event,
        });
    }

    pub fn drain(&mut self) -> Vec<BusEvent> {
        std::mem::take(&mut self.pending)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Drain as `(time_ms, event)` pairs, the shape the buffer and SQLite take
    pub fn export_events(&mut self) -> Vec<(u32, GameEvent)> {
        self.drain()
            .into_iter()
            .map(|e| (e.time_ms, e.event))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::types::PlayerId;
    use crate::moves::MoveType;

    #[test]
    fn test_drain_hands_out_once() {
        let mut bus = EventBus::new();
        bus.set_time_ms(1500);
        bus.emit(GameEvent::MoveChange {
            player: PlayerId::L,
            mv: MoveType::Walk,
        });
        assert_eq!(bus.pending_count(), 1);

        let events = bus.drain();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].time_ms, 1500);
        assert!(bus.drain().is_empty());
    }

    #[test]
    fn test_export_keeps_order_and_stamps() {
        let mut bus = EventBus::new();
        bus.emit(GameEvent::RoundStart {
            round: 1,
            wins_left: 0,
            wins_right: 0,
        });
        bus.set_time_ms(10_000);
        bus.emit(GameEvent::CountdownFinished { round: 1 });

        let exported = bus.export_events();
        assert_eq!(exported.len(), 2);
        assert_eq!(exported[0].0, 0);
        assert_eq!(exported[1], (10_000, GameEvent::CountdownFinished { round: 1 }));
        assert_eq!(bus.pending_count(), 0);
    }
}
