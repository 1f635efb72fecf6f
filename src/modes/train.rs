//! Training mode for the arena learner
//!
//! [`TrainMode`] drives a [`Simulation`] from a stream of ticks while
//! listening on a control channel. One tick is one training cycle. Completed
//! episodes are published as `training_update` notifications, progress is
//! logged every `log_frequency` episodes, and checkpoints are written every
//! `checkpoint_frequency` episodes.
//!
//! The runner starts idle. `start` begins ticking, `stop` halts it again
//! while commands keep being served, and only `shutdown`, the end of the tick
//! stream or the episode limit leave [`TrainMode::run`].
//!
//! # Example
//!
//! ```rust,ignore
//! use arena_rl::bridge::{ControlCommand, LogSink, NullRender};
//! use arena_rl::modes::{TrainConfig, TrainMode, tick_stream};
//! use std::time::Duration;
//!
//! let config = TrainConfig {
//!     max_episodes: 500,
//!     save_path: Some("models/arena_agent.mpk".into()),
//!     ..Default::default()
//! };
//!
//! let mut train_mode = TrainMode::new(config, Box::new(LogSink), Box::new(NullRender))?;
//! train_mode.control_handle().send(ControlCommand::Start)?;
//! train_mode.run(tick_stream(Duration::from_millis(16))).await;
//! ```

use anyhow::{Context, Result};
use futures::stream::{self, BoxStream, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, info, warn};

use super::simulation::{Simulation, TickOutcome};
use crate::bridge::{
    BridgeError, ControlCommand, Notification, RenderSink, TelemetrySink, parse_command,
};
use crate::game::ArenaConfig;
use crate::rl::{AgentConfig, load_snapshot, save_snapshot};

/// Snapshot location used when neither the command nor the config names one
pub const DEFAULT_SNAPSHOT_PATH: &str = "models/arena_agent.mpk";

/// Configuration for training mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// Stop after this many episodes in this session; 0 runs until stopped
    pub max_episodes: usize,

    /// Delay between ticks in milliseconds; 0 runs unthrottled
    pub tick_interval_ms: u64,

    /// Log training progress every N episodes
    pub log_frequency: usize,

    /// Save a checkpoint every N episodes; 0 disables checkpoints
    pub checkpoint_frequency: usize,

    /// Where the final snapshot (and checkpoints) are written
    pub save_path: Option<PathBuf>,

    /// Snapshot to resume from
    pub load_path: Option<PathBuf>,

    /// Seed for a reproducible session
    pub seed: Option<u64>,

    pub arena: ArenaConfig,
    pub agent: AgentConfig,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            max_episodes: 0,
            tick_interval_ms: 16,
            log_frequency: 100,
            checkpoint_frequency: 0,
            save_path: None,
            load_path: None,
            seed: None,
            arena: ArenaConfig::default(),
            agent: AgentConfig::default(),
        }
    }
}

impl TrainConfig {
    /// Read a JSON config file; missing fields take their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let config = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config from {:?}", path))?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.log_frequency == 0 {
            return Err("log_frequency must be at least 1".to_string());
        }

        self.arena.validate()?;
        self.agent.validate()
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// Ticks at a fixed period, or as fast as possible for a zero period
///
/// Missed ticks are skipped rather than bunched up.
pub fn tick_stream(period: Duration) -> BoxStream<'static, ()> {
    if period.is_zero() {
        return stream::repeat(()).boxed();
    }

    let mut timer = interval(period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

    stream::unfold(timer, |mut timer| async move {
        timer.tick().await;
        Some(((), timer))
    })
    .boxed()
}

/// Sends commands into a running [`TrainMode`]
#[derive(Debug, Clone)]
pub struct ControlHandle {
    tx: UnboundedSender<ControlCommand>,
}

impl ControlHandle {
    pub fn send(&self, command: ControlCommand) -> Result<(), BridgeError> {
        self.tx.send(command).map_err(|_| BridgeError::Disconnected)
    }

    /// Parse and forward a raw JSON command
    ///
    /// Malformed input is logged and returned as an error; the training loop
    /// never sees it.
    pub fn send_raw(&self, raw: &str) -> Result<(), BridgeError> {
        let command = parse_command(raw).map_err(|e| {
            warn!("Ignoring control message: {}", e);
            e
        })?;
        self.send(command)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// Tick-driven training runner
pub struct TrainMode {
    simulation: Simulation,
    config: TrainConfig,
    telemetry: Box<dyn TelemetrySink + Send>,
    render: Box<dyn RenderSink + Send>,
    control_tx: UnboundedSender<ControlCommand>,
    control_rx: UnboundedReceiver<ControlCommand>,

    /// Ticks are ignored until a `start` command arrives
    running: bool,

    /// Episodes completed since this runner started
    session_episodes: usize,
}

impl TrainMode {
    /// Create a new training mode
    ///
    /// Resumes from `config.load_path` when one is set; failing to load it is
    /// an error here, unlike a `load` command at runtime.
    pub fn new(
        config: TrainConfig,
        telemetry: Box<dyn TelemetrySink + Send>,
        render: Box<dyn RenderSink + Send>,
    ) -> Result<Self> {
        config
            .validate()
            .map_err(anyhow::Error::msg)
            .context("Invalid training configuration")?;

        let mut simulation =
            Simulation::new(config.arena.clone(), config.agent.clone(), config.seed);

        if let Some(path) = &config.load_path {
            let snapshot = load_snapshot(path)?;
            simulation
                .restore(&snapshot)
                .with_context(|| format!("Snapshot {:?} does not fit this agent", path))?;
            info!(
                "Resumed from {:?} after {} episodes",
                path, snapshot.metadata.episodes_completed
            );
        }

        let (control_tx, control_rx) = unbounded_channel();

        Ok(Self {
            simulation,
            config,
            telemetry,
            render,
            control_tx,
            control_rx,
            running: false,
            session_episodes: 0,
        })
    }

    pub fn control_handle(&self) -> ControlHandle {
        ControlHandle {
            tx: self.control_tx.clone(),
        }
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn simulation_mut(&mut self) -> &mut Simulation {
        &mut self.simulation
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Serve commands and ticks until shutdown, the episode limit, or the end of `ticks`
    ///
    /// Control commands take priority over ticks. On exit the final snapshot
    /// is saved (if a save path is configured), and `training_stopped` is
    /// published if training was still running.
    pub async fn run<S>(&mut self, ticks: S)
    where
        S: Stream<Item = ()>,
    {
        tokio::pin!(ticks);
        self.log_header();

        loop {
            tokio::select! {
                biased;

                Some(command) = self.control_rx.recv() => {
                    if self.handle_command(command) == Flow::Exit {
                        break;
                    }
                }

                tick = ticks.next() => {
                    match tick {
                        Some(()) => {
                            if self.on_tick() == Flow::Exit {
                                break;
                            }
                        }
                        None => {
                            debug!("tick stream ended");
                            break;
                        }
                    }
                }
            }
        }

        if let Some(path) = self.config.save_path.clone() {
            self.save_to(path);
        }

        if self.running {
            self.stop_training();
        }
        info!("Training loop exited");
    }

    fn stop_training(&mut self) {
        self.running = false;

        info!("Training stopped");
        info!("{}", self.simulation.stats().format_summary());

        self.telemetry.publish(&Notification::TrainingStopped {
            episode: self.simulation.stats().total_episodes(),
        });
    }

    fn on_tick(&mut self) -> Flow {
        if !self.running {
            return Flow::Continue;
        }

        let outcome = self.simulation.tick();
        self.render.render(self.simulation.environment().state());

        let TickOutcome::EpisodeEnded { summary, .. } = outcome else {
            return Flow::Continue;
        };

        self.session_episodes += 1;
        self.telemetry.publish(&Notification::from(&summary));

        let episode = summary.episode_index;
        if episode % self.config.log_frequency == 0 {
            info!(
                "[Episode {}] {} | Eps: {:.3}",
                episode,
                self.simulation.stats().format_summary(),
                self.simulation.exploration_rate()
            );
        }

        let every = self.config.checkpoint_frequency;
        if every > 0 && episode % every == 0 {
            let path = self.checkpoint_path(episode);
            self.save_to(path);
        }

        let limit = self.config.max_episodes;
        if limit > 0 && self.session_episodes >= limit {
            return Flow::Exit;
        }

        Flow::Continue
    }

    fn handle_command(&mut self, command: ControlCommand) -> Flow {
        debug!(?command, "control command");

        match command {
            ControlCommand::Start => {
                if self.running {
                    self.publish_error("training already running".to_string());
                } else {
                    self.running = true;
                    info!("Training started");
                }
            }
            ControlCommand::Stop => {
                if self.running {
                    self.stop_training();
                } else {
                    self.publish_error("training not running".to_string());
                }
            }
            ControlCommand::Shutdown => return Flow::Exit,
            ControlCommand::Pause => {
                self.simulation.pause();
                info!("Training paused");
            }
            ControlCommand::Resume => {
                self.simulation.resume();
                info!("Training resumed");
            }
            ControlCommand::Save { path } => {
                let path = path
                    .or_else(|| self.config.save_path.clone())
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_SNAPSHOT_PATH));
                self.save_to(path);
            }
            ControlCommand::Load { path } => {
                let path = path
                    .or_else(|| self.config.load_path.clone())
                    .or_else(|| self.config.save_path.clone())
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_SNAPSHOT_PATH));
                self.load_from(path);
            }
            ControlCommand::Status => {
                let stats = self.simulation.stats();
                let status = Notification::Status {
                    running: self.running,
                    paused: self.simulation.is_paused(),
                    episode: stats.total_episodes(),
                    last_reward: stats.last_reward(),
                    avg_reward: stats.mean_episode_reward(),
                    exploration_rate: self.simulation.exploration_rate(),
                };
                self.telemetry.publish(&status);
            }
            ControlCommand::Ping => self.telemetry.publish(&Notification::Pong),
        }

        Flow::Continue
    }

    fn save_to(&mut self, path: PathBuf) {
        let result = self
            .simulation
            .snapshot()
            .context("Failed to record network")
            .and_then(|snapshot| save_snapshot(&snapshot, &path));

        match result {
            Ok(()) => {
                info!("Snapshot saved: {:?}", path);
                self.telemetry.publish(&Notification::Saved { path });
            }
            Err(e) => {
                error!("Save failed: {:#}", e);
                self.publish_error(format!("{:#}", e));
            }
        }
    }

    fn load_from(&mut self, path: PathBuf) {
        let simulation = &mut self.simulation;
        let result = load_snapshot(&path).and_then(|snapshot| {
            simulation
                .restore(&snapshot)
                .with_context(|| format!("Snapshot {:?} does not fit this agent", path))
        });

        match result {
            Ok(()) => {
                info!("Snapshot loaded: {:?}", path);
                self.telemetry.publish(&Notification::Loaded { path });
            }
            Err(e) => {
                error!("Load failed: {:#}", e);
                self.publish_error(format!("{:#}", e));
            }
        }
    }

    fn publish_error(&mut self, message: String) {
        self.telemetry.publish(&Notification::Error { message });
    }

    fn checkpoint_path(&self, episode: usize) -> PathBuf {
        let base = self
            .config
            .save_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SNAPSHOT_PATH));

        base.parent()
            .unwrap_or(Path::new("."))
            .join(format!("checkpoint_ep{}.mpk", episode))
    }

    fn log_header(&self) {
        let agent = &self.config.agent;
        info!("Arena training");
        info!(
            "Network: 8 -> {} -> 4, learning rate {}",
            agent.hidden_size, agent.learning_rate
        );
        info!(
            "Exploration: {} (floor {}, decay {})",
            self.simulation.exploration_rate(),
            agent.exploration_floor,
            agent.exploration_decay
        );
        match self.config.max_episodes {
            0 => info!("Episodes: until stopped"),
            n => info!("Episodes: {}", n),
        }
        info!("Tick interval: {:?}", self.config.tick_interval());
        if let Some(path) = &self.config.save_path {
            info!("Save path: {:?}", path);
        }
    }
}
