//! Match session - the host-facing handle around one fight
//!
//! [`start`] validates the options and builds a [`Session`]: the controller,
//! the best-of-three aggregate, the peer link for realtime play and the event
//! bus. The host keeps the session in a [`GameSlot`] and drives it with
//! [`Session::tick`] and [`Session::handle_input`].

use bevy::log::{info, warn};
use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::controller::{ControlMode, Controller, ControllerEvent};
use crate::events::{EventBus, GameEvent, PlayerId};
use crate::input::PressedKeys;
use crate::moves::MoveType;
use crate::net::{PeerChannel, RealtimeSync, RemoteUpdate};
use crate::scoring::{GameState, MatchState, RoundOutcome};
use crate::tuning::FightTuning;

/// Controller variant requested by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameType {
    #[default]
    Basic,
    /// Realtime play over the QUIC peer link
    Network,
    Multiplayer,
    Realtime,
}

impl GameType {
    pub fn as_str(self) -> &'static str {
        match self {
            GameType::Basic => "basic",
            GameType::Network => "network",
            GameType::Multiplayer => "multiplayer",
            GameType::Realtime => "realtime",
        }
    }

    /// Whether one fighter follows a peer
    pub fn is_networked(self) -> bool {
        matches!(self, GameType::Network | GameType::Realtime)
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "basic" => Ok(GameType::Basic),
            "network" => Ok(GameType::Network),
            "multiplayer" => Ok(GameType::Multiplayer),
            "realtime" => Ok(GameType::Realtime),
            other => Err(format!("unknown game type '{}'", other)),
        }
    }
}

/// Construction-time failures; nothing has started when one is returned
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("exactly two named fighters are required, got {0}")]
    InvalidFighters(usize),
    #[error("{0} play needs a room id, a player id and a player index")]
    MissingRealtimeIds(GameType),
    #[error("player index {0} is out of range (0 or 1)")]
    PlayerIndexOutOfRange(usize),
    #[error("{0} play needs a peer channel")]
    MissingChannel(GameType),
    #[error("no render surface to mount the arena on")]
    MissingSurface,
}

/// Everything needed to start a match
#[derive(Debug, Clone, Default)]
pub struct StartOptions {
    /// Background selector
    pub arena: u32,
    /// Fighter names; index 0 starts on the left
    pub fighters: Vec<String>,
    pub game_type: GameType,
    pub room_id: Option<String>,
    pub player_id: Option<String>,
    /// Fighter this client controls in networked play
    pub player_index: Option<usize>,
    pub tuning: FightTuning,
}

/// Validate `options` and build a ready session with round one counting down.
///
/// Networked game types need `channel`; it is ignored otherwise.
pub fn start(options: StartOptions, channel: Option<Box<dyn PeerChannel>>) -> Result<Session, EngineError> {
    let names: [String; 2] = options
        .fighters
        .clone()
        .try_into()
        .map_err(|v: Vec<String>| EngineError::InvalidFighters(v.len()))?;
    if names.iter().any(|n| n.trim().is_empty()) {
        return Err(EngineError::InvalidFighters(options.fighters.len()));
    }

    let (mode, sync) = if options.game_type.is_networked() {
        let (Some(room_id), Some(player_id), Some(index)) =
            (&options.room_id, &options.player_id, options.player_index)
        else {
            return Err(EngineError::MissingRealtimeIds(options.game_type));
        };
        if index > 1 {
            return Err(EngineError::PlayerIndexOutOfRange(index));
        }
        let channel = channel.ok_or(EngineError::MissingChannel(options.game_type))?;
        let sync = RealtimeSync::new(room_id.clone(), player_id.clone(), channel, &options.tuning);
        (ControlMode::Realtime { local: index }, Some(sync))
    } else if options.game_type == GameType::Multiplayer {
        (ControlMode::Multiplayer, None)
    } else {
        (ControlMode::Basic, None)
    };

    let mut controller = Controller::new(names, mode, options.arena, options.tuning);
    controller.init();

    let mut session = Session {
        controller,
        match_state: MatchState::new(),
        game_type: options.game_type,
        sync,
        events: EventBus::new(),
        elapsed_ms: 0,
        next_round_in: None,
        match_over: false,
    };
    let [left, right] = [0, 1].map(|i| session.controller.fighter(i).name().to_string());
    info!(
        "Starting {} match: {} vs {} (arena {})",
        session.game_type, left, right, options.arena
    );
    session.events.emit(GameEvent::MatchStart {
        game_type: session.game_type.to_string(),
        left,
        right,
        arena: options.arena,
    });
    session.events.emit(GameEvent::RoundStart {
        round: 1,
        wins_left: 0,
        wins_right: 0,
    });
    Ok(session)
}

/// One match in progress
pub struct Session {
    controller: Controller,
    match_state: MatchState,
    game_type: GameType,
    sync: Option<RealtimeSync>,
    events: EventBus,
    elapsed_ms: u32,
    /// Countdown to the next round after a round result
    next_round_in: Option<u32>,
    match_over: bool,
}

impl Session {
    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut Controller {
        &mut self.controller
    }

    pub fn match_state(&self) -> &MatchState {
        &self.match_state
    }

    pub fn game_type(&self) -> GameType {
        self.game_type
    }

    pub fn sync(&self) -> Option<&RealtimeSync> {
        self.sync.as_ref()
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    pub fn elapsed_ms(&self) -> u32 {
        self.elapsed_ms
    }

    pub fn is_match_over(&self) -> bool {
        self.match_over
    }

    /// Milliseconds until the next round's countdown, while between rounds
    pub fn next_round_in(&self) -> Option<u32> {
        self.next_round_in
    }

    /// Held keys changed for fighter `idx`. Accepted moves are broadcast in networked play.
    pub fn handle_input(&mut self, idx: usize, pressed: PressedKeys) -> Option<MoveType> {
        if idx > 1 || !self.controller.mode().local_fighters().contains(&idx) {
            return None;
        }
        let accepted = self.controller.handle_input(idx, pressed);
        if let (Some(kind), Some(sync)) = (accepted, self.sync.as_mut()) {
            sync.broadcast_move(kind);
        }
        self.process_controller_events();
        self.collect_failures();
        accepted
    }

    /// Advance the whole match by `dt_ms`
    pub fn tick(&mut self, dt_ms: u32) {
        self.elapsed_ms = self.elapsed_ms.saturating_add(dt_ms);
        self.events.set_time_ms(self.elapsed_ms);

        self.apply_remote_updates();
        self.controller.tick(dt_ms);
        if let (Some(sync), ControlMode::Realtime { local }) = (self.sync.as_mut(), self.controller.mode()) {
            sync.tick(dt_ms, self.controller.fighter(local));
        }
        self.process_controller_events();

        if let Some(remaining) = self.next_round_in {
            let remaining = remaining.saturating_sub(dt_ms);
            if remaining == 0 {
                self.next_round_in = None;
                self.match_state.advance_round();
                self.begin_round();
            } else {
                self.next_round_in = Some(remaining);
            }
        }
        self.collect_failures();
    }

    /// Tear down the match: timers stop, the peer link closes. Idempotent.
    pub fn reset(&mut self) {
        self.controller.reset();
        if let Some(sync) = self.sync.as_mut() {
            sync.close();
        }
        self.next_round_in = None;
    }

    fn begin_round(&mut self) {
        let round = self.match_state.current_round;
        let wins = self.match_state.wins;
        self.controller.start_round(round, wins);
        self.events.emit(GameEvent::RoundStart {
            round,
            wins_left: wins[0],
            wins_right: wins[1],
        });
    }

    fn apply_remote_updates(&mut self) {
        let Some(sync) = self.sync.as_mut() else {
            return;
        };
        let Some(remote) = self.controller.mode().remote_fighter() else {
            return;
        };
        let player = PlayerId::from_index(remote);

        for update in sync.poll() {
            let kind = match update {
                RemoteUpdate::Connected(peer_id) => {
                    info!("Peer {} joined", peer_id);
                    self.events.emit(GameEvent::PeerConnected { peer_id });
                    continue;
                }
                RemoteUpdate::Move(kind) => {
                    self.controller.apply_remote_move(remote, kind);
                    "move"
                }
                RemoteUpdate::Position { x, y } => {
                    self.controller.apply_remote_position(remote, x, y);
                    "position"
                }
                RemoteUpdate::Life(life) => {
                    self.controller.apply_remote_life(remote, life);
                    "life"
                }
                RemoteUpdate::GameState(state) => {
                    if !self.adopt_match_state(&state) {
                        continue;
                    }
                    "gameState"
                }
            };
            self.events.emit(GameEvent::PeerApplied {
                player,
                kind: kind.to_string(),
            });
        }
    }

    /// Take the peer's round/match view when it is not behind ours
    fn adopt_match_state(&mut self, remote: &MatchState) -> bool {
        let local_round = self.match_state.current_round;
        if !self.match_state.adopt(remote) {
            return false;
        }

        match self.match_state.game_state {
            GameState::Playing if self.match_state.current_round > local_round => {
                // Peer already moved on; follow without waiting out our delay
                self.next_round_in = None;
                self.begin_round();
            }
            GameState::Playing => {}
            GameState::RoundWinner | GameState::FinalWinner => {
                let loser = self.match_state.round_winner.map(|w| 1 - w);
                self.controller.end_round(loser);
            }
        }
        true
    }

    fn process_controller_events(&mut self) {
        for event in self.controller.drain_events() {
            match event {
                ControllerEvent::CountdownFinished => {
                    self.events.emit(GameEvent::CountdownFinished {
                        round: self.controller.arena().round(),
                    });
                }
                ControllerEvent::MoveChanged { fighter, to } => {
                    self.events.emit(GameEvent::MoveChange {
                        player: PlayerId::from_index(fighter),
                        mv: to,
                    });
                }
                ControllerEvent::HeldKeysMove { to, .. } => {
                    if let Some(sync) = self.sync.as_mut() {
                        sync.broadcast_move(to);
                    }
                }
                ControllerEvent::Attack {
                    attacker,
                    victim,
                    attack,
                    damage,
                } => {
                    self.events.emit(GameEvent::Attack {
                        attacker: PlayerId::from_index(attacker),
                        attack,
                        damage,
                        victim_life: self.controller.fighter(victim).life(),
                    });
                }
                ControllerEvent::GameEnd { loser } => self.round_finished(loser),
            }
        }
    }

    fn round_finished(&mut self, loser: Option<usize>) {
        if self.match_over {
            return;
        }
        let round = self.match_state.current_round;

        // A result adopted from the peer has already been counted
        let outcome = if self.match_state.game_state == GameState::Playing {
            let outcome = self.match_state.record_round(loser.map(|l| 1 - l));
            let wins = self.match_state.wins;
            match self.match_state.round_winner {
                Some(winner) => self.events.emit(GameEvent::RoundEnd {
                    round,
                    winner: PlayerId::from_index(winner),
                    wins_left: wins[0],
                    wins_right: wins[1],
                }),
                None => self.events.emit(GameEvent::RoundDraw { round }),
            }
            if let Some(sync) = self.sync.as_mut() {
                sync.broadcast_game_state(&self.match_state);
            }
            outcome
        } else if self.match_state.is_over() {
            RoundOutcome::MatchOver(self.match_state.final_winner)
        } else {
            RoundOutcome::NextRound
        };

        match outcome {
            RoundOutcome::NextRound => {
                self.next_round_in = Some(self.controller.tuning().round_end_delay_ms.max(1));
            }
            RoundOutcome::MatchOver(winner) => {
                self.match_over = true;
                self.next_round_in = None;
                let wins = self.match_state.wins;
                self.events.emit(GameEvent::MatchEnd {
                    winner: winner.map(PlayerId::from_index),
                    wins_left: wins[0],
                    wins_right: wins[1],
                    duration: self.elapsed_ms as f32 / 1000.0,
                });
            }
        }
    }

    fn collect_failures(&mut self) {
        let Some(sync) = self.sync.as_mut() else {
            return;
        };
        for reason in sync.drain_failures() {
            self.events.emit(GameEvent::PeerSendFailed { reason });
        }
    }
}

/// Holder for the active session (`None` between matches)
#[derive(Resource, Default)]
pub struct GameSlot(Option<Session>);

impl GameSlot {
    pub fn new(session: Session) -> Self {
        Self(Some(session))
    }

    pub fn get_game(&self) -> Option<&Session> {
        self.0.as_ref()
    }

    pub fn get_game_mut(&mut self) -> Option<&mut Session> {
        self.0.as_mut()
    }

    /// Install a freshly started session, tearing down the previous one
    pub fn replace(&mut self, session: Session) {
        self.reset();
        self.0 = Some(session);
    }

    /// Tear down and drop the active session. Safe to call when empty.
    pub fn reset(&mut self) {
        if let Some(mut session) = self.0.take() {
            session.reset();
            warn_if_unflushed(&session);
        }
    }
}

fn warn_if_unflushed(session: &Session) {
    let pending = session.events().pending_count();
    if pending > 0 {
        warn!("Dropping {} unlogged events with the session", pending);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::FightKey;
    use crate::net::LoopbackRoom;

    fn options(game_type: GameType) -> StartOptions {
        StartOptions {
            arena: 0,
            fighters: vec!["subzero".to_string(), "kano".to_string()],
            game_type,
            ..Default::default()
        }
    }

    fn realtime(room: &LoopbackRoom, player_id: &str, index: usize) -> Session {
        let opts = StartOptions {
            room_id: Some("room-1".to_string()),
            player_id: Some(player_id.to_string()),
            player_index: Some(index),
            ..options(GameType::Realtime)
        };
        start(opts, Some(Box::new(room.connect()))).unwrap()
    }

    fn run(session: &mut Session, total_ms: u32, dt: u32) {
        let mut elapsed = 0;
        while elapsed < total_ms {
            session.tick(dt);
            elapsed += dt;
        }
    }

    fn codes(session: &mut Session) -> Vec<&'static str> {
        session
            .events_mut()
            .export_events()
            .iter()
            .map(|(_, e)| e.type_code())
            .collect()
    }

    #[test]
    fn test_start_validates_options() {
        let mut bad = options(GameType::Basic);
        bad.fighters.pop();
        assert!(matches!(start(bad, None), Err(EngineError::InvalidFighters(1))));

        let mut blank = options(GameType::Basic);
        blank.fighters[1] = "  ".to_string();
        assert!(matches!(start(blank, None), Err(EngineError::InvalidFighters(2))));

        assert!(matches!(
            start(options(GameType::Realtime), None),
            Err(EngineError::MissingRealtimeIds(GameType::Realtime))
        ));

        let out_of_range = StartOptions {
            room_id: Some("r".to_string()),
            player_id: Some("p".to_string()),
            player_index: Some(2),
            ..options(GameType::Network)
        };
        assert!(matches!(
            start(out_of_range.clone(), None),
            Err(EngineError::PlayerIndexOutOfRange(2))
        ));

        let no_channel = StartOptions {
            player_index: Some(0),
            ..out_of_range
        };
        assert!(matches!(
            start(no_channel, None),
            Err(EngineError::MissingChannel(GameType::Network))
        ));
    }

    #[test]
    fn test_start_opens_round_one() {
        let mut session = start(options(GameType::Multiplayer), None).unwrap();
        assert!(session.controller().is_ready());
        assert_eq!(session.controller().mode(), ControlMode::Multiplayer);
        assert_eq!(codes(&mut session), vec!["MS", "RS"]);
    }

    #[test]
    fn test_input_only_for_local_fighters() {
        let mut session = start(options(GameType::Basic), None).unwrap();
        run(&mut session, 10_000, 100);
        let right: PressedKeys = [FightKey::Right].into_iter().collect();
        assert_eq!(session.handle_input(1, right), None);
        assert_eq!(session.handle_input(0, right), Some(MoveType::Walk));
    }

    #[test]
    fn test_draws_advance_until_match_is_drawn() {
        let mut tuning = FightTuning::default();
        tuning.round_seconds = 2;
        let mut session = start(
            StartOptions {
                tuning,
                ..options(GameType::Basic)
            },
            None,
        )
        .unwrap();

        // 10 s countdown + 2 s round + 3 s pause per round
        run(&mut session, 3 * 15_000, 100);
        assert!(session.is_match_over());
        assert_eq!(session.match_state().final_winner, None);
        assert_eq!(session.match_state().current_round, 3);
        let codes = codes(&mut session);
        assert_eq!(codes.iter().filter(|c| **c == "RD").count(), 3);
        assert_eq!(codes.iter().filter(|c| **c == "RS").count(), 3);
        assert_eq!(codes.last(), Some(&"ME"));
    }

    #[test]
    fn test_knockouts_decide_match() {
        let mut session = start(options(GameType::Multiplayer), None).unwrap();
        for round in 1..=2 {
            run(&mut session, 10_000, 100);
            assert!(!session.controller().fighter(1).is_locked(), "round {}", round);
            session.controller_mut().fighter_dead(1);
            session.tick(10);
            if round == 1 {
                assert_eq!(session.next_round_in(), Some(3_000 - 10));
                run(&mut session, 3_000, 10);
                assert_eq!(session.controller().arena().round(), 2);
                assert_eq!(session.controller().fighter(1).life(), 100.0);
            }
        }
        assert!(session.is_match_over());
        assert_eq!(session.match_state().wins, [2, 0]);
        assert_eq!(session.match_state().final_winner, Some(0));
    }

    #[test]
    fn test_move_broadcast_applied_by_peer_without_echo() {
        let room = LoopbackRoom::new();
        let mut p1 = realtime(&room, "p1", 0);
        let mut p2 = realtime(&room, "p2", 1);
        for _ in 0..105 {
            p1.tick(100);
            p2.tick(100);
        }
        let sent_before = p2.sync().unwrap().stats().sent;

        let right: PressedKeys = [FightKey::Right].into_iter().collect();
        assert_eq!(p1.handle_input(0, right), Some(MoveType::Walk));
        p2.tick(10);

        assert_eq!(p2.controller().fighter(0).current_move(), MoveType::Walk);
        assert_eq!(p2.sync().unwrap().stats().sent, sent_before);
        let applied = p2.events_mut().export_events();
        assert!(applied.iter().any(|(_, e)| *e
            == GameEvent::PeerApplied {
                player: PlayerId::L,
                kind: "move".to_string()
            }));
    }

    #[test]
    fn test_peer_knockout_result_is_counted_once() {
        let room = LoopbackRoom::new();
        let mut p1 = realtime(&room, "p1", 0);
        let mut p2 = realtime(&room, "p2", 1);
        run(&mut p1, 10_000, 100);
        run(&mut p2, 10_000, 100);

        // p2 is knocked out on its own client
        p2.controller_mut().fighter_dead(1);
        p2.tick(10);
        assert_eq!(p2.match_state().wins, [1, 0]);

        // p1 hears the life heartbeat and the gameState in the same poll
        run(&mut p1, 2_000, 10);
        assert_eq!(p1.match_state().wins, [1, 0]);
        assert_eq!(p1.match_state().game_state, GameState::RoundWinner);
        assert!(p1.controller().is_round_over());
    }

    #[test]
    fn test_send_failures_reach_the_event_log() {
        let room = LoopbackRoom::new();
        let mut p1 = realtime(&room, "p1", 0);
        run(&mut p1, 10_000, 100);
        p1.events_mut().export_events();
        room.set_offline(true);

        let up: PressedKeys = [FightKey::Up].into_iter().collect();
        assert_eq!(p1.handle_input(0, up), Some(MoveType::Jump));
        assert!(codes(&mut p1).contains(&"PF"));
        assert_eq!(p1.controller().fighter(0).current_move(), MoveType::Jump);
    }

    #[test]
    fn test_slot_reset_is_idempotent() {
        let room = LoopbackRoom::new();
        let mut slot = GameSlot::new(realtime(&room, "p1", 0));
        assert!(slot.get_game().is_some());
        slot.reset();
        slot.reset();
        assert!(slot.get_game().is_none());
    }
}
