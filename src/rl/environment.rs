use rand::rngs::StdRng;

use super::observation::{Observation, create_observation};
use crate::game::{Action, ArenaConfig, ArenaEngine, ArenaState, Side, StepResult};

/// Arena environment for reinforcement learning
///
/// Wraps the arena engine and its current state behind the classic
/// observe / step / reset interface:
/// - 8-value normalized observations
/// - Discrete action space (MoveUp, MoveDown, Approach, Attack)
/// - Per-episode reward total and winner tracking
pub struct ArenaEnvironment {
    engine: ArenaEngine,
    state: ArenaState,
}

impl ArenaEnvironment {
    /// Create a new environment whose opponent draws from `rng`
    pub fn new(config: ArenaConfig, rng: StdRng) -> Self {
        let engine = ArenaEngine::new(config, rng);
        let state = engine.reset();
        Self { engine, state }
    }

    /// Create an environment with a reproducible opponent
    pub fn with_seed(config: ArenaConfig, seed: u64) -> Self {
        let engine = ArenaEngine::with_seed(config, seed);
        let state = engine.reset();
        Self { engine, state }
    }

    /// Start a new episode and return its first observation
    pub fn reset(&mut self) -> Observation {
        self.state = self.engine.reset();
        self.observe()
    }

    /// Observation of the current state; free of side effects
    pub fn observe(&self) -> Observation {
        create_observation(&self.state, self.engine.config())
    }

    /// Advance one tick with the learner taking `action`
    ///
    /// Once the episode is done this is a no-op returning zero reward.
    pub fn step(&mut self, action: Action) -> StepResult {
        self.engine.step(&mut self.state, action)
    }

    pub fn is_done(&self) -> bool {
        self.state.is_done()
    }

    /// Reward accumulated over the current episode
    pub fn total_reward(&self) -> f32 {
        self.state.total_reward
    }

    pub fn winner(&self) -> Option<Side> {
        self.state.winner
    }

    /// Read-only snapshot for render sinks
    pub fn state(&self) -> &ArenaState {
        &self.state
    }

    /// Mutable state access for scripted scenarios
    pub fn state_mut(&mut self) -> &mut ArenaState {
        &mut self.state
    }

    pub fn config(&self) -> &ArenaConfig {
        self.engine.config()
    }
}
