use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::{info, warn};

use arena_rl::bridge::{ControlCommand, LogSink, NullRender};
use arena_rl::modes::{EvaluateMode, TrainConfig, TrainMode, tick_stream};
use arena_rl::rl::load_snapshot;
use arena_rl::telemetry;

#[derive(Parser)]
#[command(name = "arena_rl")]
#[command(version, about = "Online reinforcement learning in a 2D combat arena")]
struct Cli {
    /// Run mode
    #[arg(long, default_value = "train")]
    mode: Mode,

    /// JSON training config; command-line flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Episodes to run (0 trains until Ctrl+C)
    #[arg(long)]
    episodes: Option<usize>,

    /// Milliseconds between ticks (0 runs unthrottled)
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Where to write the trained snapshot
    #[arg(long)]
    save_path: Option<PathBuf>,

    /// Snapshot to resume training from, or to evaluate
    #[arg(long)]
    load_path: Option<PathBuf>,

    /// Default log level when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Clone, ValueEnum)]
enum Mode {
    /// Train the learner online
    Train,
    /// Play greedy episodes with a saved learner
    Evaluate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(&cli.log_level)?;

    let mut config = match &cli.config {
        Some(path) => TrainConfig::from_file(path)?,
        None => TrainConfig::default(),
    };

    if let Some(episodes) = cli.episodes {
        config.max_episodes = episodes;
    }
    if let Some(tick_ms) = cli.tick_ms {
        config.tick_interval_ms = tick_ms;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if cli.save_path.is_some() {
        config.save_path = cli.save_path;
    }
    if cli.load_path.is_some() {
        config.load_path = cli.load_path;
    }

    match cli.mode {
        Mode::Train => train(config).await,
        Mode::Evaluate => evaluate(config),
    }
}

async fn train(config: TrainConfig) -> Result<()> {
    let ticks = tick_stream(config.tick_interval());
    let mut train_mode = TrainMode::new(config, Box::new(LogSink), Box::new(NullRender))?;

    let handle = train_mode.control_handle();
    handle.send(ControlCommand::Start)?;

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl+C received, shutting down");
            if handle.send(ControlCommand::Shutdown).is_err() {
                warn!("Training loop already exited");
            }
        }
    });

    train_mode.run(ticks).await;
    Ok(())
}

fn evaluate(config: TrainConfig) -> Result<()> {
    let path = config
        .load_path
        .context("--load-path is required in evaluate mode")?;
    let snapshot = load_snapshot(&path)?;

    let episodes = match config.max_episodes {
        0 => 100,
        n => n,
    };

    let mut eval_mode = EvaluateMode::new(&snapshot, config.arena, config.seed)
        .with_context(|| format!("Snapshot {:?} does not fit this agent", path))?;
    let report = eval_mode.run(episodes);

    println!(
        "Learner won {} of {} episodes ({:.1}%), lost {}, unfinished {}; \
         avg reward {:.2}, avg length {:.1}",
        report.learner_wins,
        report.episodes,
        report.win_rate() * 100.0,
        report.opponent_wins,
        report.unfinished,
        report.mean_reward,
        report.mean_length
    );

    Ok(())
}
