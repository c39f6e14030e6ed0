//! Fightgame - a two-fighter arena brawler built with Bevy
//!
//! Main entry point: settings, command line, session start and app setup.

use bevy::{diagnostic::FrameTimeDiagnosticsPlugin, prelude::*};
use fightgame::events::{EVENT_DB_FILE, SqliteEventLogger};
use fightgame::net::{PeerChannel, QuicChannel};
use fightgame::presentation::ViewportScale;
use fightgame::session::{self, GameSlot, GameType};
use fightgame::settings::CurrentSettings;
use fightgame::tuning::{FightTuning, apply_global_tuning};
use fightgame::{DEFAULT_BACKGROUND_COLOR, FightPlugin, VIEWPORT_PRESETS};
use std::net::SocketAddr;
use std::path::Path;

/// Value following `flag` on the command line
fn arg_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1).cloned())
}

fn parse_addr(value: &str, flag: &str) -> Result<SocketAddr, String> {
    value
        .parse()
        .map_err(|e| format!("{} {}: {}", flag, value, e))
}

/// QUIC link for networked play: `--peer <addr>` joins a host, otherwise host on `--bind`
fn peer_channel(args: &[String]) -> Result<Box<dyn PeerChannel>, String> {
    let bind = arg_value(args, "--bind");
    let channel = match arg_value(args, "--peer") {
        Some(peer) => {
            let peer = parse_addr(&peer, "--peer")?;
            let bind = parse_addr(bind.as_deref().unwrap_or("0.0.0.0:0"), "--bind")?;
            QuicChannel::join(bind, peer).map_err(|e| e.to_string())?
        }
        None => {
            let bind = bind.ok_or("networked play needs --bind <addr> to host or --peer <addr> to join")?;
            QuicChannel::host(parse_addr(&bind, "--bind")?).map_err(|e| e.to_string())?
        }
    };
    if let Ok(local) = channel.local_addr() {
        info!("Peer link on {}", local);
    }
    Ok(Box::new(channel))
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    // Load persistent settings (uses defaults if file doesn't exist)
    let mut current_settings = CurrentSettings::default();

    // Command line overrides the saved setup, and becomes the new saved setup
    let mut settings = current_settings.settings.clone();
    if args.iter().any(|a| a == "--realtime") {
        settings.game_type = GameType::Realtime;
    } else if args.iter().any(|a| a == "--multiplayer") {
        settings.game_type = GameType::Multiplayer;
    } else if let Some(game_type) = arg_value(&args, "--game-type") {
        match game_type.parse() {
            Ok(t) => settings.game_type = t,
            Err(e) => warn!("Ignoring --game-type: {}", e),
        }
    }
    if let Some(room) = arg_value(&args, "--room") {
        settings.room_id = room;
    }
    if let Some(player) = arg_value(&args, "--player") {
        settings.player_id = player;
    }
    if let Some(index) = arg_value(&args, "--player-index").and_then(|s| s.parse().ok()) {
        settings.player_index = index;
    }
    if let Some(arena) = arg_value(&args, "--arena").and_then(|s| s.parse().ok()) {
        settings.arena = arena;
    }
    if settings != current_settings.settings {
        current_settings.settings = settings.clone();
        current_settings.mark_dirty();
    }

    let mut tuning = FightTuning::default();
    if let Err(e) = apply_global_tuning(&mut tuning) {
        info!("{}, using default tuning", e);
    }

    let channel = if settings.game_type.is_networked() {
        match peer_channel(&args) {
            Ok(channel) => Some(channel),
            Err(e) => {
                eprintln!("Cannot start {} match: {}", settings.game_type, e);
                std::process::exit(1);
            }
        }
    } else {
        None
    };

    let session = match session::start(settings.start_options(tuning), channel) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Cannot start match: {}", e);
            std::process::exit(1);
        }
    };

    // Event log only when asked for
    let logger = if args.iter().any(|a| a == "--log-db") {
        if let Some(parent) = Path::new(EVENT_DB_FILE).parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!("Failed to create {}: {}", parent.display(), e);
        }
        SqliteEventLogger::new(Path::new(EVENT_DB_FILE), "game").unwrap_or_else(|e| {
            warn!("Event log disabled: {}", e);
            SqliteEventLogger::disabled()
        })
    } else {
        SqliteEventLogger::disabled()
    };

    let viewport = ViewportScale::new(settings.viewport_index);
    let (viewport_width, viewport_height, _) = VIEWPORT_PRESETS[viewport.preset_index];

    App::new()
        .add_plugins((
            DefaultPlugins.set(WindowPlugin {
                primary_window: Some(Window {
                    // Set scale_factor_override to 1.0 for consistent behavior on HiDPI displays
                    resolution: bevy::window::WindowResolution::new(
                        viewport_width as u32,
                        viewport_height as u32,
                    )
                    .with_scale_factor_override(1.0),
                    title: "Fightgame".into(),
                    resizable: true,
                    ..default()
                }),
                ..default()
            }),
            FrameTimeDiagnosticsPlugin::default(),
        ))
        .insert_resource(ClearColor(DEFAULT_BACKGROUND_COLOR))
        .insert_resource(current_settings)
        .insert_resource(viewport)
        .insert_resource(tuning)
        .insert_resource(logger)
        .insert_resource(GameSlot::new(session))
        .add_plugins(FightPlugin)
        .run();
}
