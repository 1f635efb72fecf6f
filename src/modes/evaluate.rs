//! Headless evaluation of a saved learner
//!
//! Plays greedy episodes (no exploration, no weight updates) and reports how
//! the learner fares against the scripted opponent.

use rand::{Rng, SeedableRng, distributions::Standard, rngs::StdRng};
use tracing::{debug, info};

use crate::game::{ArenaConfig, Side};
use crate::rl::{
    ArenaBackend, ArenaEnvironment, PersistenceError, PolicyNetwork, TrainingSnapshot,
    default_device, select_action,
};

/// Episodes still running after this many ticks are cut off as draws
pub const DEFAULT_TICK_LIMIT: u32 = 10_000;

/// Aggregate results of an evaluation run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationReport {
    pub episodes: usize,
    pub learner_wins: usize,
    pub opponent_wins: usize,
    /// Episodes cut off by the tick limit
    pub unfinished: usize,
    pub mean_reward: f32,
    pub mean_length: f32,
}

impl EvaluationReport {
    pub fn win_rate(&self) -> f32 {
        if self.episodes == 0 {
            0.0
        } else {
            self.learner_wins as f32 / self.episodes as f32
        }
    }
}

pub struct EvaluateMode {
    network: PolicyNetwork<ArenaBackend>,
    env: ArenaEnvironment,
    rng: StdRng,
    tick_limit: u32,
}

impl EvaluateMode {
    /// Build an evaluator around the network stored in `snapshot`
    pub fn new(
        snapshot: &TrainingSnapshot,
        arena: ArenaConfig,
        seed: Option<u64>,
    ) -> Result<Self, PersistenceError> {
        // The learning rate is irrelevant here; the network is never updated
        let network = snapshot.network(0.0, &default_device())?;

        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let env = ArenaEnvironment::new(arena, StdRng::seed_from_u64(rng.sample(Standard)));

        Ok(Self {
            network,
            env,
            rng,
            tick_limit: DEFAULT_TICK_LIMIT,
        })
    }

    pub fn with_tick_limit(mut self, tick_limit: u32) -> Self {
        self.tick_limit = tick_limit;
        self
    }

    /// Play `episodes` greedy episodes
    pub fn run(&mut self, episodes: usize) -> EvaluationReport {
        let mut report = EvaluationReport {
            episodes,
            ..Default::default()
        };
        let mut total_reward = 0.0;
        let mut total_length = 0u64;

        for episode in 1..=episodes {
            let (winner, reward, length) = self.play_episode();
            total_reward += reward;
            total_length += u64::from(length);

            match winner {
                Some(Side::Learner) => report.learner_wins += 1,
                Some(Side::Opponent) => report.opponent_wins += 1,
                None => report.unfinished += 1,
            }

            debug!(episode, reward, length, winner = ?winner, "evaluation episode");
        }

        if episodes > 0 {
            report.mean_reward = total_reward / episodes as f32;
            report.mean_length = total_length as f32 / episodes as f32;
        }

        info!(
            "Evaluation: {} episodes | Wins: {} - {} | Unfinished: {} | Avg reward: {:.2}",
            report.episodes,
            report.learner_wins,
            report.opponent_wins,
            report.unfinished,
            report.mean_reward
        );

        report
    }

    fn play_episode(&mut self) -> (Option<Side>, f32, u32) {
        let mut observation = self.env.reset();

        while !self.env.is_done() && self.env.state().ticks < self.tick_limit {
            let action = select_action(&self.network, &observation, 0.0, &mut self.rng);
            self.env.step(action);
            observation = self.env.observe();
        }

        (
            self.env.winner(),
            self.env.total_reward(),
            self.env.state().ticks,
        )
    }
}
