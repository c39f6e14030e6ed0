//! SQLite event logger - persistent audit trail for windowed sessions
//!
//! Sessions, matches and every bus event land in one database so fights can
//! be inspected with plain SQL afterwards.

use bevy::prelude::*;
use rusqlite::{Connection, params};
use std::path::Path;
use std::sync::Mutex;

use super::format::serialize_event;
use super::types::{GameEvent, PlayerId};
use crate::session::GameSlot;

/// Default database location for the windowed game
pub const EVENT_DB_FILE: &str = "db/fights.db";

/// Event persistence; a disabled logger holds no connection
#[derive(Resource)]
pub struct SqliteEventLogger {
    conn: Option<Mutex<Connection>>,
    session_id: String,
    open_match: Mutex<Option<i64>>,
}

impl SqliteEventLogger {
    /// Open (or create) the database at `db_path` and register a session of `session_type`
    pub fn new(db_path: &Path, session_type: &str) -> Result<Self, rusqlite::Error> {
        if let Some(dir) = db_path.parent()
            && !dir.as_os_str().is_empty()
        {
            let _ = std::fs::create_dir_all(dir);
        }
        let conn = Connection::open(db_path)?;
        // WAL so analysis can read while a match is written
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        Self::from_connection(conn, session_type)
    }

    fn from_connection(conn: Connection, session_type: &str) -> Result<Self, rusqlite::Error> {
        init_schema(&conn)?;
        let session_id = create_session(&conn, session_type)?;
        Ok(Self {
            conn: Some(Mutex::new(conn)),
            session_id,
            open_match: Mutex::new(None),
        })
    }

    /// No-op logger
    pub fn disabled() -> Self {
        Self {
            conn: None,
            session_id: String::new(),
            open_match: Mutex::new(None),
        }
    }

    fn with_conn<T>(&self, f: impl FnOnce(&mut Connection) -> Option<T>) -> Option<T> {
        let mut guard = self.conn.as_ref()?.lock().ok()?;
        f(&mut guard)
    }

    /// Start a new match and return its ID
    pub fn start_match(&self, game_type: &str, left: &str, right: &str, arena: u32) -> Option<i64> {
        let match_id = self.with_conn(|conn| {
            let result = conn.execute(
                r#"INSERT INTO matches
                   (session_id, game_type, left_fighter, right_fighter, arena,
                    wins_left, wins_right, duration_secs, winner)
                   VALUES (?1, ?2, ?3, ?4, ?5, 0, 0, 0.0, '')"#,
                params![self.session_id, game_type, left, right, arena],
            );
            match result {
                Ok(_) => Some(conn.last_insert_rowid()),
                Err(e) => {
                    warn!("Failed to start match: {}", e);
                    None
                }
            }
        })?;

        *self.open_match.lock().ok()? = Some(match_id);
        info!("Started match {} ({}: {} vs {})", match_id, game_type, left, right);
        Some(match_id)
    }

    pub fn log_event(&self, time_ms: u32, event: &GameEvent) {
        self.log_events(std::slice::from_ref(&(time_ms, event.clone())));
    }

    /// Log a batch in one transaction
    pub fn log_events(&self, events: &[(u32, GameEvent)]) {
        if events.is_empty() {
            return;
        }
        let Some(match_id) = self.current_match_id() else {
            return;
        };

        self.with_conn(|conn| {
            let tx = conn.transaction().ok()?;
            {
                let mut insert = tx
                    .prepare_cached(
                        "INSERT INTO events (match_id, time_ms, event_type, data) VALUES (?1, ?2, ?3, ?4)",
                    )
                    .ok()?;
                for (time_ms, event) in events {
                    let data = serialize_event(*time_ms, event);
                    if let Err(e) = insert.execute(params![match_id, time_ms, event.type_code(), data]) {
                        // Dropping the transaction rolls the batch back
                        warn!("Failed to log event: {}", e);
                        return None;
                    }
                }
            }
            tx.commit().ok()
        });
    }

    /// Record the final score and close the current match
    pub fn end_match(&self, winner: Option<PlayerId>, wins_left: u32, wins_right: u32, duration_secs: f32) {
        let Some(match_id) = self.current_match_id() else {
            return;
        };
        let winner = match winner {
            Some(PlayerId::L) => "left",
            Some(PlayerId::R) => "right",
            None => "draw",
        };

        self.with_conn(|conn| {
            let result = conn.execute(
                "UPDATE matches SET wins_left = ?1, wins_right = ?2, duration_secs = ?3, winner = ?4 WHERE id = ?5",
                params![wins_left, wins_right, duration_secs, winner, match_id],
            );
            match result {
                Ok(_) => info!(
                    "Ended match {} ({}-{}, {}, {:.1}s)",
                    match_id, wins_left, wins_right, winner, duration_secs
                ),
                Err(e) => warn!("Failed to end match: {}", e),
            }
            Some(())
        });

        if let Ok(mut open) = self.open_match.lock() {
            *open = None;
        }
    }

    pub fn current_match_id(&self) -> Option<i64> {
        self.open_match.lock().ok().and_then(|open| *open)
    }

    pub fn is_enabled(&self) -> bool {
        self.conn.is_some()
    }

    /// Event count for the current match
    pub fn event_count(&self) -> Option<u64> {
        let match_id = self.current_match_id()?;
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM events WHERE match_id = ?1",
                params![match_id],
                |row| row.get(0),
            )
            .ok()
        })
    }

    /// Route one drained batch: match boundaries open and close rows, everything is logged
    pub fn record(&self, events: &[(u32, GameEvent)]) {
        let mut batch = Vec::new();
        for (time_ms, event) in events {
            match event {
                GameEvent::MatchStart {
                    game_type,
                    left,
                    right,
                    arena,
                } => {
                    self.log_events(&batch);
                    batch.clear();
                    self.start_match(game_type, left, right, *arena);
                    batch.push((*time_ms, event.clone()));
                }
                GameEvent::MatchEnd {
                    winner,
                    wins_left,
                    wins_right,
                    duration,
                } => {
                    batch.push((*time_ms, event.clone()));
                    self.log_events(&batch);
                    batch.clear();
                    self.end_match(*winner, *wins_left, *wins_right, *duration);
                }
                _ => batch.push((*time_ms, event.clone())),
            }
        }
        self.log_events(&batch);
    }
}

fn init_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            id TEXT PRIMARY KEY,
            created_at TEXT NOT NULL,
            session_type TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS matches (
            id INTEGER PRIMARY KEY,
            session_id TEXT REFERENCES sessions(id),
            game_type TEXT NOT NULL,
            left_fighter TEXT NOT NULL,
            right_fighter TEXT NOT NULL,
            arena INTEGER NOT NULL,
            wins_left INTEGER NOT NULL,
            wins_right INTEGER NOT NULL,
            duration_secs REAL NOT NULL,
            winner TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_matches_session ON matches(session_id);
        CREATE INDEX IF NOT EXISTS idx_matches_fighters ON matches(left_fighter, right_fighter);

        CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY,
            match_id INTEGER REFERENCES matches(id),
            time_ms INTEGER NOT NULL,
            event_type TEXT NOT NULL,
            data TEXT NOT NULL,
            created_at TEXT DEFAULT CURRENT_TIMESTAMP
        );

        CREATE INDEX IF NOT EXISTS idx_events_match ON events(match_id);
        CREATE INDEX IF NOT EXISTS idx_events_type ON events(event_type);
        "#,
    )?;
    Ok(())
}

fn create_session(conn: &Connection, session_type: &str) -> Result<String, rusqlite::Error> {
    let id = uuid::Uuid::new_v4().to_string();
    let created_at = chrono::Utc::now().to_rfc3339();

    conn.execute(
        "INSERT INTO sessions (id, created_at, session_type) VALUES (?1, ?2, ?3)",
        params![id, created_at, session_type],
    )?;

    Ok(id)
}

/// Drain the active session's bus into SQLite
pub fn flush_events_to_sqlite(mut slot: ResMut<GameSlot>, logger: Option<Res<SqliteEventLogger>>) {
    let Some(session) = slot.get_game_mut() else {
        return;
    };
    let events = session.events_mut().export_events();
    let Some(logger) = logger else {
        return;
    };
    if logger.is_enabled() && !events.is_empty() {
        logger.record(&events);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::MoveType;

    fn create_test_logger() -> SqliteEventLogger {
        SqliteEventLogger::from_connection(Connection::open_in_memory().unwrap(), "test").unwrap()
    }

    #[test]
    fn test_start_and_end_match() {
        let logger = create_test_logger();
        assert!(logger.start_match("basic", "subzero", "kano", 0).is_some());
        assert!(logger.current_match_id().is_some());
        logger.end_match(Some(PlayerId::L), 2, 1, 95.5);
        assert!(logger.current_match_id().is_none());
    }

    #[test]
    fn test_events_need_an_open_match() {
        let logger = create_test_logger();
        logger.log_event(0, &GameEvent::RoundDraw { round: 1 });
        assert_eq!(logger.event_count(), None);

        logger.start_match("basic", "subzero", "kano", 0);
        logger.log_event(
            100,
            &GameEvent::MoveChange {
                player: PlayerId::R,
                mv: MoveType::Block,
            },
        );
        logger.log_events(&[
            (150, GameEvent::CountdownFinished { round: 1 }),
            (
                200,
                GameEvent::Attack {
                    attacker: PlayerId::L,
                    attack: MoveType::LowKick,
                    damage: 1.2,
                    victim_life: 98.8,
                },
            ),
        ]);
        assert_eq!(logger.event_count(), Some(3));
    }

    #[test]
    fn test_record_follows_match_boundaries() {
        let logger = create_test_logger();
        logger.record(&[
            (
                0,
                GameEvent::MatchStart {
                    game_type: "multiplayer".to_string(),
                    left: "subzero".to_string(),
                    right: "kano".to_string(),
                    arena: 2,
                },
            ),
            (
                0,
                GameEvent::RoundStart {
                    round: 1,
                    wins_left: 0,
                    wins_right: 0,
                },
            ),
        ]);
        assert_eq!(logger.event_count(), Some(2));

        logger.record(&[(
            900,
            GameEvent::MatchEnd {
                winner: None,
                wins_left: 1,
                wins_right: 1,
                duration: 0.9,
            },
        )]);
        assert!(logger.current_match_id().is_none());
    }

    #[test]
    fn test_disabled_logger() {
        let logger = SqliteEventLogger::disabled();
        assert!(!logger.is_enabled());
        assert!(logger.start_match("basic", "a", "b", 0).is_none());
        logger.log_event(0, &GameEvent::RoundDraw { round: 1 });
        logger.end_match(None, 0, 0, 0.0);
    }
}
