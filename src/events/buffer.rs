//! In-memory event buffer for simulations and scenario runs.

use uuid::Uuid;

use super::format::serialize_event;
use super::types::GameEvent;
use crate::tuning::FightTuning;

/// Simple in-memory event log (no file I/O)
#[derive(Debug, Default)]
pub struct EventBuffer {
    events: Vec<(u32, GameEvent)>,
    session_id: String,
}

impl EventBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new session with a fresh UUID
    pub fn start_session(&mut self, timestamp: &str) {
        self.clear();
        self.session_id = Uuid::new_v4().to_string();
        self.log(
            0,
            GameEvent::SessionStart {
                session_id: self.session_id.clone(),
                timestamp: timestamp.to_string(),
            },
        );
    }

    pub fn log_config(&mut self, tuning: FightTuning) {
        self.log(0, GameEvent::Config(tuning));
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.session_id.clear();
    }

    pub fn log(&mut self, time_ms: u32, event: GameEvent) {
        self.events.push((time_ms, event));
    }

    pub fn events(&self) -> &[(u32, GameEvent)] {
        &self.events
    }

    /// Import events from an external source (like EventBus)
    pub fn import_events(&mut self, events: Vec<(u32, GameEvent)>) {
        self.events.extend(events);
    }

    /// Number of events carrying `code`
    pub fn count(&self, code: &str) -> usize {
        self.events
            .iter()
            .filter(|(_, e)| e.type_code() == code)
            .count()
    }

    /// Serialize all events to a log string
    pub fn serialize(&self) -> String {
        self.events
            .iter()
            .map(|(ts, e)| serialize_event(*ts, e))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_header_and_serialize() {
        let mut buffer = EventBuffer::new();
        buffer.start_session("2026-01-01T00:00:00Z");
        buffer.log_config(FightTuning::default());
        buffer.import_events(vec![(250, GameEvent::RoundDraw { round: 3 })]);

        assert!(!buffer.session_id().is_empty());
        assert_eq!(buffer.events().len(), 3);
        assert_eq!(buffer.count("RD"), 1);

        let text = buffer.serialize();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("T:00000|SE|"));
        assert!(lines[1].starts_with("T:00000|CF|{"));
        assert_eq!(lines[2], "T:00250|RD|3");
    }

    #[test]
    fn test_new_session_clears_previous_one() {
        let mut buffer = EventBuffer::new();
        buffer.start_session("a");
        let first = buffer.session_id().to_string();
        buffer.log(10, GameEvent::CountdownFinished { round: 1 });
        buffer.start_session("b");
        assert_ne!(buffer.session_id(), first);
        assert_eq!(buffer.events().len(), 1);
    }
}
