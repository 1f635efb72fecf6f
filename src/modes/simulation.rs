//! One learner, one arena, one tick at a time
//!
//! [`Simulation`] owns everything a training session mutates: the network,
//! the environment, the exploration schedule, and the statistics. Each call
//! to [`Simulation::tick`] runs exactly one observe → select → step → update
//! cycle, so a caller can drive it from a timer, a test loop, or a stream.

use rand::{Rng, SeedableRng, distributions::Standard, rngs::StdRng};
use tracing::debug;

use crate::bridge::EpisodeSummary;
use crate::game::{Action, ArenaConfig, Side};
use crate::metrics::TrainingStats;
use crate::rl::{
    AgentConfig, ArenaBackend, ArenaEnvironment, ExplorationSchedule, PersistenceError,
    PolicyNetwork, SnapshotMetadata, TrainingSnapshot, default_device, select_action,
};

/// What a single tick did
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Simulation is paused; nothing changed
    Paused,

    /// One step was taken and the episode continues
    Stepped { action: Action, reward: f32 },

    /// The step ended the episode; the arena has already been reset
    EpisodeEnded {
        action: Action,
        reward: f32,
        summary: EpisodeSummary,
    },
}

pub struct Simulation {
    network: PolicyNetwork<ArenaBackend>,
    env: ArenaEnvironment,
    exploration: ExplorationSchedule,
    stats: TrainingStats,
    agent_config: AgentConfig,

    /// Drives exploration draws only; the arena has its own generator
    rng: StdRng,

    paused: bool,
}

impl Simulation {
    /// Create a fresh learner in a fresh arena
    ///
    /// With `Some(seed)` the whole session is reproducible; with `None` the
    /// generators are seeded from system entropy.
    pub fn new(arena: ArenaConfig, agent: AgentConfig, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let env_rng = StdRng::seed_from_u64(rng.sample(Standard));
        let network = PolicyNetwork::new(&agent, &mut rng, &default_device());

        Self {
            network,
            env: ArenaEnvironment::new(arena, env_rng),
            exploration: ExplorationSchedule::from_config(&agent),
            stats: TrainingStats::new(agent.history_window),
            agent_config: agent,
            rng,
            paused: false,
        }
    }

    /// Run one training cycle
    pub fn tick(&mut self) -> TickOutcome {
        if self.paused {
            return TickOutcome::Paused;
        }

        let observation = self.env.observe();
        let action = select_action(
            &self.network,
            &observation,
            self.exploration.rate(),
            &mut self.rng,
        );
        let result = self.env.step(action);
        self.network.update(&observation, action, result.reward);

        match result.info.winner {
            Some(winner) if result.terminated => TickOutcome::EpisodeEnded {
                action,
                reward: result.reward,
                summary: self.finish_episode(winner),
            },
            _ => TickOutcome::Stepped {
                action,
                reward: result.reward,
            },
        }
    }

    fn finish_episode(&mut self, winner: Side) -> EpisodeSummary {
        let total = self.env.total_reward();
        let ticks = self.env.state().ticks as usize;

        self.stats.record_episode(total, ticks, winner);
        self.exploration.decay();

        let summary = EpisodeSummary {
            episode_index: self.stats.total_episodes(),
            episode_total_reward: total,
            moving_average_reward: self.stats.mean_episode_reward(),
            winner_tag: winner,
        };

        debug!(
            episode = summary.episode_index,
            total,
            ticks,
            winner = winner.as_str(),
            exploration = self.exploration.rate(),
            "episode finished"
        );

        self.env.reset();
        summary
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Abandon the current episode and start a new one
    ///
    /// The abandoned episode is not recorded.
    pub fn new_episode_reset(&mut self) {
        self.env.reset();
    }

    pub fn exploration_rate(&self) -> f32 {
        self.exploration.rate()
    }

    pub fn stats(&self) -> &TrainingStats {
        &self.stats
    }

    pub fn network(&self) -> &PolicyNetwork<ArenaBackend> {
        &self.network
    }

    pub fn environment(&self) -> &ArenaEnvironment {
        &self.env
    }

    pub fn environment_mut(&mut self) -> &mut ArenaEnvironment {
        &mut self.env
    }

    /// Capture the full learner state
    pub fn snapshot(&self) -> Result<TrainingSnapshot, PersistenceError> {
        let metadata = SnapshotMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            hidden_size: self.network.hidden_size(),
            exploration_rate: self.exploration.rate(),
            reward_history: self.stats.reward_history(),
            episodes_completed: self.stats.total_episodes(),
            total_steps: self.stats.total_steps(),
            learner_wins: self.stats.learner_wins(),
            opponent_wins: self.stats.opponent_wins(),
        };

        TrainingSnapshot::new(&self.network, metadata)
    }

    /// Replace the learner state with a snapshot
    ///
    /// The running episode is left as is. On error nothing is changed.
    pub fn restore(&mut self, snapshot: &TrainingSnapshot) -> Result<(), PersistenceError> {
        let learning_rate = self.agent_config.learning_rate;
        let network = snapshot.network(learning_rate, &default_device())?;
        let meta = &snapshot.metadata;

        self.network = network;
        self.exploration.set_rate(meta.exploration_rate);
        self.stats = TrainingStats::from_snapshot(
            self.agent_config.history_window,
            &meta.reward_history,
            meta.episodes_completed,
            meta.total_steps,
            meta.learner_wins,
            meta.opponent_wins,
        );

        Ok(())
    }
}
