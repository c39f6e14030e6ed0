//! Headless match runner
//!
//! Every match runs in its own minimal Bevy app: two bots press keys, the
//! session advances by a fixed frame time, and the event bus is drained into
//! an [`EventBuffer`] together with periodic position/life samples.

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::warn;
use bevy::prelude::*;
use rand::Rng;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use crate::events::{EventBuffer, GameEvent, SqliteEventLogger};
use crate::session::{self, GameSlot, GameType, StartOptions};
use crate::tuning::{FightTuning, apply_global_tuning};

use super::bot::Bot;
use super::config::SimConfig;
use super::metrics::{MatchResult, SimSummary};
use super::parallel::{init_parallel, run_matches_parallel};

/// Both bots, indexed by fighter
#[derive(Resource)]
struct SimBots([Bot; 2]);

/// Resource to track simulation progress
#[derive(Resource)]
struct SimControl {
    frame_ms: u32,
    max_ms: u32,
    tick_sample_ms: u32,
    frame: u64,
    last_sample_ms: u32,
    should_exit: bool,
}

#[derive(Resource, Default)]
struct SimEventBuffer(EventBuffer);

/// Full JSON report of a run
#[derive(Debug, serde::Serialize)]
pub struct SimReport {
    pub config: SimConfig,
    pub summary: SimSummary,
    pub matches: Vec<MatchResult>,
}

/// Run one bot match to completion or to the time cap.
///
/// With `minimal_threads` the app uses a single task-pool thread, which keeps
/// many apps running side by side under the OS thread limit.
pub fn run_match(config: &SimConfig, tuning: FightTuning, seed: u64, minimal_threads: bool) -> Result<MatchResult, String> {
    let options = StartOptions {
        arena: config.arena,
        fighters: config.fighters.to_vec(),
        game_type: GameType::Multiplayer,
        tuning,
        ..Default::default()
    };
    let session = session::start(options, None).map_err(|e| e.to_string())?;

    let mut app = App::new();
    let frame = Duration::from_millis(config.frame_ms as u64);
    if minimal_threads {
        app.add_plugins(
            MinimalPlugins
                .set(ScheduleRunnerPlugin::run_loop(frame))
                .set(TaskPoolPlugin {
                    task_pool_options: TaskPoolOptions::with_num_threads(1),
                }),
        );
    } else {
        app.add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(frame)));
    }

    let mut buffer = EventBuffer::new();
    buffer.start_session(&chrono::Utc::now().to_rfc3339());
    buffer.log_config(tuning);

    app.insert_resource(GameSlot::new(session));
    app.insert_resource(SimBots([
        Bot::new(config.bots[0], seed),
        Bot::new(config.bots[1], seed.rotate_left(32) ^ 0x9E37_79B9),
    ]));
    app.insert_resource(SimControl {
        frame_ms: config.frame_ms,
        max_ms: (config.max_match_seconds.max(0.0) * 1000.0) as u32,
        tick_sample_ms: config.tick_sample_ms,
        frame: 0,
        last_sample_ms: 0,
        should_exit: false,
    });
    app.insert_resource(SimEventBuffer(buffer));

    app.add_systems(
        Update,
        (bot_input, step_session, collect_events, check_end).chain(),
    );

    loop {
        app.update();
        if app.world().resource::<SimControl>().should_exit {
            break;
        }
    }

    let events = app.world_mut().resource_mut::<SimEventBuffer>().0.events().to_vec();
    Ok(MatchResult::from_events(config.fighters.clone(), config.bots, seed, events))
}

fn bot_input(control: Res<SimControl>, mut bots: ResMut<SimBots>, mut slot: ResMut<GameSlot>) {
    let Some(session) = slot.get_game_mut() else {
        return;
    };
    let range = session.controller().tuning().attack_range;
    for idx in 0..2 {
        let controller = session.controller();
        let opponent = controller.opponent(idx);
        let keys = bots.0[idx].update(
            control.frame_ms,
            controller.fighter(idx),
            controller.fighter(opponent),
            range,
        );
        if let Some(keys) = keys {
            session.handle_input(idx, keys);
        }
    }
}

fn step_session(control: Res<SimControl>, mut slot: ResMut<GameSlot>) {
    if let Some(session) = slot.get_game_mut() {
        session.tick(control.frame_ms);
    }
}

fn collect_events(mut control: ResMut<SimControl>, mut slot: ResMut<GameSlot>, mut buffer: ResMut<SimEventBuffer>) {
    let Some(session) = slot.get_game_mut() else {
        return;
    };
    control.frame += 1;
    let drained = session.events_mut().export_events();
    buffer.0.import_events(drained);

    let now = session.elapsed_ms();
    if control.tick_sample_ms > 0 && now - control.last_sample_ms >= control.tick_sample_ms {
        control.last_sample_ms = now;
        let [left, right] = session.controller().fighters();
        buffer.0.log(
            now,
            GameEvent::Tick {
                frame: control.frame,
                left_pos: (left.x(), left.y()),
                right_pos: (right.x(), right.y()),
                left_life: left.life(),
                right_life: right.life(),
            },
        );
    }
}

fn check_end(mut control: ResMut<SimControl>, slot: Res<GameSlot>) {
    match slot.get_game() {
        Some(session) => {
            if session.is_match_over() || session.elapsed_ms() >= control.max_ms {
                control.should_exit = true;
            }
        }
        None => control.should_exit = true,
    }
}

/// Run every match the config asks for and write the report
pub fn run_simulation(config: SimConfig) -> Result<(), String> {
    let mut tuning = FightTuning::default();
    if let Err(e) = apply_global_tuning(&mut tuning) {
        warn!("Using default tuning: {}", e);
    }

    let base_seed = config.seed.unwrap_or_else(|| rand::thread_rng().r#gen());
    let seeds: Vec<u64> = (0..config.matches as u64)
        .map(|i| base_seed.wrapping_add(i))
        .collect();

    if !config.quiet {
        eprintln!(
            "Running {} match(es): {} ({:?}) vs {} ({:?}), seed {}",
            config.matches, config.fighters[0], config.bots[0], config.fighters[1], config.bots[1], base_seed
        );
    }

    let results = if config.parallel > 0 {
        init_parallel(config.parallel);
        run_matches_parallel(&config, tuning, &seeds)?
    } else {
        let mut results = Vec::with_capacity(seeds.len());
        for (i, &seed) in seeds.iter().enumerate() {
            if !config.quiet {
                eprint!("\rMatch {}/{}...", i + 1, seeds.len());
                std::io::stderr().flush().ok();
            }
            results.push(run_match(&config, tuning, seed, false)?);
        }
        if !config.quiet {
            eprintln!("\rCompleted {} matches.", results.len());
        }
        results
    };

    if let Some(db_path) = &config.db_path {
        store_results(Path::new(db_path), &results)?;
        if !config.quiet {
            eprintln!("Events stored in {}", db_path);
        }
    }

    let summary = SimSummary::from_results(&results);
    if !config.quiet {
        eprintln!("{}", summary.format_table(&config.fighters));
    }

    let report = SimReport {
        config,
        summary,
        matches: results,
    };
    output_report(&report)
}

fn store_results(db_path: &Path, results: &[MatchResult]) -> Result<(), String> {
    let logger = SqliteEventLogger::new(db_path, "simulation")
        .map_err(|e| format!("Failed to open {}: {}", db_path.display(), e))?;
    for result in results {
        logger.record(&result.events);
    }
    Ok(())
}

fn output_report(report: &SimReport) -> Result<(), String> {
    let json = serde_json::to_string_pretty(report).map_err(|e| format!("Failed to encode report: {}", e))?;
    match &report.config.output_file {
        Some(path) => {
            std::fs::write(path, &json).map_err(|e| format!("Failed to write {}: {}", path, e))?;
            if !report.config.quiet {
                eprintln!("Results written to {}", path);
            }
        }
        None => println!("{}", json),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_tuning() -> FightTuning {
        FightTuning {
            ready_ms: 100,
            countdown_start: 1,
            countdown_step_ms: 100,
            round_seconds: 2,
            round_end_delay_ms: 200,
            ..Default::default()
        }
    }

    #[test]
    fn test_match_runs_to_a_final_result() {
        let config = SimConfig {
            frame_ms: 20,
            ..Default::default()
        };
        let result = run_match(&config, quick_tuning(), 5, true).unwrap();
        assert!(!result.timed_out, "{:?}", result);
        assert!(result.rounds_played >= 2 && result.rounds_played <= 3);
        assert!(result.events.iter().any(|(_, e)| e.type_code() == "T"));
        assert!(result.events.first().is_some_and(|(_, e)| e.type_code() == "SE"));
    }

    #[test]
    fn test_same_seed_same_match() {
        let config = SimConfig {
            frame_ms: 20,
            bots: [super::super::bot::BotStyle::Aggressive; 2],
            ..Default::default()
        };
        let a = run_match(&config, quick_tuning(), 99, true).unwrap();
        let b = run_match(&config, quick_tuning(), 99, true).unwrap();
        assert_eq!(a.winner, b.winner);
        assert_eq!(a.left, b.left);
        assert_eq!(a.right, b.right);
    }

    #[test]
    fn test_time_cap_stops_the_match() {
        let config = SimConfig {
            frame_ms: 20,
            max_match_seconds: 0.5,
            ..Default::default()
        };
        let result = run_match(&config, FightTuning::default(), 1, true).unwrap();
        assert!(result.timed_out);
        assert_eq!(result.rounds_played, 0);
    }

    #[test]
    fn test_bad_fighter_names_fail() {
        let config = SimConfig {
            fighters: ["".to_string(), "kano".to_string()],
            ..Default::default()
        };
        assert!(run_match(&config, FightTuning::default(), 1, true).is_err());
    }
}
