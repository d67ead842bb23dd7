use std::fs;
use std::path::PathBuf;

use tracing::{error, info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use gauntlet::game::config::{load_initial_config, InitialConfig};
use gauntlet::game::replay::{DivergencePolicy, RecordOptions, ReplayLog, ReplayPlayer};
use gauntlet::game::simulation::lookups::Lookups;
use gauntlet::game::simulation::EntityId;
use gauntlet::{Command, EventKind, FixedVec2, SimConfig, Simulation, UpgradeKind};

const DEMO_TICKS: u64 = 1800;
const REPLAY_DIR: &str = "replays";

fn setup_file_logging() -> String {
    // Create logs directory if it doesn't exist
    let log_dir = PathBuf::from("logs");
    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("Failed to create logs directory: {}", e);
    }

    // Clean up old log files, keeping only the last 25
    cleanup_old_logs(&log_dir, 25);

    let now = chrono::Local::now();
    let log_filename = format!("gauntlet_{}.log", now.format("%Y%m%d_%H%M%S"));
    let log_path_str = log_dir.join(&log_filename).to_string_lossy().to_string();

    let file_appender = RollingFileAppender::new(
        Rotation::NEVER, // Don't rotate during a single run
        &log_dir,
        &log_filename,
    );

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false);

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("gauntlet=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    log_path_str
}

fn cleanup_old_logs(log_dir: &PathBuf, keep_count: usize) {
    if let Ok(entries) = fs::read_dir(log_dir) {
        let mut log_files: Vec<_> = entries
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(|s| s.starts_with("gauntlet") && s.ends_with(".log"))
                    .unwrap_or(false)
            })
            .collect();

        // Sort by modified time (oldest first)
        log_files.sort_by_key(|e| e.metadata().ok().and_then(|m| m.modified().ok()));

        if log_files.len() > keep_count {
            for file in log_files.iter().take(log_files.len() - keep_count) {
                let _ = fs::remove_file(file.path());
            }
        }
    }
}

fn play_back(config: SimConfig, path: &str) -> bool {
    let log = match ReplayLog::load_ron(path) {
        Ok(log) => log,
        Err(e) => {
            error!("Failed to load replay {}: {}", path, e);
            return false;
        }
    };
    info!("Replaying {} ({} ticks, {} commands, {} hashes)", path, log.ticks, log.commands.len(), log.hashes.len());

    let mut player = ReplayPlayer::new(config, Lookups::default(), log).with_policy(DivergencePolicy::Report);
    match player.run_to_end() {
        Ok(summary) if summary.divergences == 0 => {
            info!("Replay matched: {} ticks, {} events, final state {}", summary.ticks, summary.events, summary.final_hash);
            true
        }
        Ok(summary) => {
            error!("Replay diverged on {} ticks; first at {:?}", summary.divergences, player.divergences().first());
            false
        }
        Err(e) => {
            error!("Replay failed: {}", e);
            false
        }
    }
}

/// A short scripted match: two heroes, a few waves, some upgrades.
fn demo_commands(tick: u64) -> Vec<Command> {
    let (ranger, tank) = (EntityId(1), EntityId(2));
    match tick {
        0 => vec![
            Command::spawn_hero("IceArcher", FixedVec2::from_int(-1, 0)),
            Command::spawn_hero("Tank", FixedVec2::from_int(1, 0)),
            Command::start_wave(1, 1),
        ],
        150 => vec![Command::choose_upgrade(ranger, UpgradeKind::Star, 1)],
        300 => vec![Command::choose_upgrade(tank, UpgradeKind::Health, 2)],
        450 => vec![
            Command::choose_upgrade(ranger, UpgradeKind::Star, 1),
            Command::choose_weapon(tank, "Minigun"),
        ],
        900 => vec![Command::choose_upgrade(ranger, UpgradeKind::AttackSpeed, 1)],
        _ => Vec::new(),
    }
}

fn run_demo(config: SimConfig) -> bool {
    let mut sim = Simulation::new(config);
    sim.start_recording(RecordOptions::from_config(sim.config()));

    let (mut kills, mut waves) = (0u32, 0u32);
    for tick in 0..DEMO_TICKS {
        for event in sim.tick_with(demo_commands(tick)) {
            match event.kind {
                EventKind::EnemyKilled { .. } => kills += 1,
                EventKind::WaveCompleted { .. } => waves += 1,
                EventKind::GameOver { victory } => info!("Match over at tick {}: victory = {}", event.tick, victory),
                _ => {}
            }
        }
        if sim.world().is_game_over() {
            break;
        }
    }

    let final_hash = sim.state_hash().map(|h| h.to_string()).unwrap_or_else(|e| e.to_string());
    info!(
        "Demo finished at tick {}: {} kills, {} waves cleared, final state {}",
        sim.current_tick(),
        kills,
        waves,
        final_hash
    );

    let Some(log) = sim.stop_recording() else {
        warn!("Recorder missing at end of demo");
        return false;
    };
    if let Err(e) = fs::create_dir_all(REPLAY_DIR) {
        error!("Failed to create {} directory: {}", REPLAY_DIR, e);
        return false;
    }
    match log.save_ron(PathBuf::from(REPLAY_DIR).join("last_match.ron")) {
        Ok(()) => true,
        Err(e) => {
            error!("Failed to save replay: {}", e);
            false
        }
    }
}

fn main() {
    let log_file = setup_file_logging();
    println!("Gauntlet - logging to {}", log_file);

    let mut args = std::env::args().skip(1);
    let initial = match args.next() {
        Some(path) => load_initial_config(path),
        None => InitialConfig::default(),
    };
    let config = SimConfig::from_initial(&initial);

    let ok = match args.next() {
        Some(replay) => play_back(config, &replay),
        None => run_demo(config),
    };
    if !ok {
        std::process::exit(1);
    }
}
