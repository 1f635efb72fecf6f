//! Epsilon-greedy action selection and the exploration schedule

use burn::tensor::backend::Backend;
use rand::{Rng, distributions::Standard};
use serde::{Deserialize, Serialize};

use super::config::AgentConfig;
use super::network::PolicyNetwork;
use super::observation::Observation;
use crate::game::{Action, NUM_ACTIONS};

/// Pick an action: uniformly random with probability `epsilon`, otherwise greedy
pub fn select_action<B: Backend, R: Rng>(
    network: &PolicyNetwork<B>,
    observation: &Observation,
    epsilon: f32,
    rng: &mut R,
) -> Action {
    let roll: f32 = rng.sample(Standard);
    if roll < epsilon {
        return Action::ALL[rng.gen_range(0..NUM_ACTIONS)];
    }

    let values = network.forward(observation).action_values();
    Action::ALL[argmax(&values)]
}

/// Index of the largest value; ties resolve to the first occurrence
///
/// Returns 0 for an empty slice.
pub fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// Multiplicatively decaying exploration rate
///
/// The rate always stays within `[floor, initial]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExplorationSchedule {
    rate: f32,
    initial: f32,
    floor: f32,
    decay: f32,
}

impl ExplorationSchedule {
    /// Create a schedule; an `initial` below `floor` is raised to it
    pub fn new(initial: f32, floor: f32, decay: f32) -> Self {
        let initial = initial.max(floor);
        Self {
            rate: initial,
            initial,
            floor,
            decay,
        }
    }

    pub fn from_config(config: &AgentConfig) -> Self {
        Self::new(
            config.exploration_initial,
            config.exploration_floor,
            config.exploration_decay,
        )
    }

    /// Current probability of taking a random action
    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn initial(&self) -> f32 {
        self.initial
    }

    pub fn floor(&self) -> f32 {
        self.floor
    }

    /// Apply one episode's worth of decay
    pub fn decay(&mut self) {
        self.rate = (self.rate * self.decay).max(self.floor);
    }

    /// Replace the current rate, e.g. when restoring a snapshot
    pub fn set_rate(&mut self, rate: f32) {
        self.rate = rate.clamp(self.floor, self.initial);
    }
}

impl Default for ExplorationSchedule {
    fn default() -> Self {
        Self::from_config(&AgentConfig::default())
    }
}
