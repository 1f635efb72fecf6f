//! Agent hyperparameter configuration

use serde::{Deserialize, Serialize};

/// Configuration for the policy network and its exploration schedule
///
/// # Example
///
/// ```rust
/// use arena_rl::rl::AgentConfig;
///
/// let config = AgentConfig {
///     exploration_initial: 0.5,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Width of the single hidden layer
    ///
    /// Default: 16
    pub hidden_size: usize,

    /// Step size of the output-layer reward credit update
    ///
    /// Default: 0.01
    pub learning_rate: f32,

    /// Initial weights and biases are drawn from `[-init_range, init_range)`
    ///
    /// Default: 0.25
    pub init_range: f32,

    /// Exploration rate at the start of training
    ///
    /// Default: 0.3
    pub exploration_initial: f32,

    /// Exploration rate never decays below this floor
    ///
    /// Default: 0.05
    pub exploration_floor: f32,

    /// Multiplicative decay applied after every completed episode
    ///
    /// Default: 0.995
    pub exploration_decay: f32,

    /// Number of recent episodes used for the moving average
    ///
    /// Default: 100
    pub history_window: usize,
}

impl AgentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), String> {
        if self.hidden_size == 0 {
            return Err("hidden_size must be at least 1".to_string());
        }

        if self.learning_rate <= 0.0 {
            return Err(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            ));
        }

        if self.init_range <= 0.0 {
            return Err(format!(
                "init_range must be positive, got {}",
                self.init_range
            ));
        }

        if !(0.0..=1.0).contains(&self.exploration_floor) {
            return Err(format!(
                "exploration_floor must be in [0, 1], got {}",
                self.exploration_floor
            ));
        }

        if !(self.exploration_floor..=1.0).contains(&self.exploration_initial) {
            return Err(format!(
                "exploration_initial must be in [{}, 1], got {}",
                self.exploration_floor, self.exploration_initial
            ));
        }

        if self.exploration_decay <= 0.0 || self.exploration_decay > 1.0 {
            return Err(format!(
                "exploration_decay must be in (0, 1], got {}",
                self.exploration_decay
            ));
        }

        if self.history_window == 0 {
            return Err("history_window must be at least 1".to_string());
        }

        Ok(())
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            hidden_size: 16,
            learning_rate: 0.01,
            init_range: 0.25,
            exploration_initial: 0.3,
            exploration_floor: 0.05,
            exploration_decay: 0.995,
            history_window: 100,
        }
    }
}
