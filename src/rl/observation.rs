use burn::tensor::{Tensor, TensorData, backend::Backend};

use crate::game::{ArenaConfig, ArenaState};

/// Number of features in an observation
pub const OBSERVATION_SIZE: usize = 8;

/// Normalized snapshot of the arena from the learner's point of view
///
/// Features, in order:
/// - 0: horizontal offset to the opponent / arena width
/// - 1: vertical offset to the opponent / arena height
/// - 2: distance to the opponent / distance scale
/// - 3: learner health ratio
/// - 4: opponent health ratio
/// - 5: learner cooldown ratio
/// - 6: 1.0 if the opponent is above the learner
/// - 7: 1.0 if the opponent is within attack range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation(pub [f32; OBSERVATION_SIZE]);

impl Observation {
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Convert into a `[1, 8]` row tensor
    pub fn to_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 2> {
        let data = TensorData::new(self.0.to_vec(), [1, OBSERVATION_SIZE]);
        Tensor::<B, 2>::from_data(data, device)
    }
}

/// Build the observation for the current arena state
pub fn create_observation(state: &ArenaState, config: &ArenaConfig) -> Observation {
    let learner = &state.learner;
    let opponent = &state.opponent;

    let dx = opponent.position.x - learner.position.x;
    let dy = opponent.position.y - learner.position.y;
    let distance = dx.hypot(dy);

    Observation([
        dx / config.width,
        dy / config.height,
        distance / config.distance_scale,
        learner.health / config.max_health,
        opponent.health / config.max_health,
        learner.cooldown as f32 / config.attack_cooldown as f32,
        flag(opponent.position.y < learner.position.y),
        flag(distance < learner.attack_range),
    ])
}

fn flag(condition: bool) -> f32 {
    if condition {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{ArenaEngine, Position};
    use crate::rl::backend::{ArenaBackend, default_device};

    fn start_state() -> (ArenaState, ArenaConfig) {
        let config = ArenaConfig::default();
        let engine = ArenaEngine::with_seed(config.clone(), 0);
        (engine.reset(), config)
    }

    #[test]
    fn test_start_observation() {
        let (state, config) = start_state();
        let obs = create_observation(&state, &config);

        let expected = [-400.0 / 600.0, 0.0, 0.8, 1.0, 1.0, 0.0, 0.0, 0.0];
        for (got, want) in obs.as_slice().iter().zip(expected) {
            assert!((got - want).abs() < 1e-6, "got {got}, want {want}");
        }
    }

    #[test]
    fn test_flags() {
        let (mut state, config) = start_state();
        state.learner.position = Position::new(130.0, 250.0);

        let obs = create_observation(&state, &config);
        assert_eq!(obs.0[6], 1.0); // opponent is above
        assert_eq!(obs.0[7], 1.0); // 58.3 < 60
    }

    #[test]
    fn test_health_and_cooldown_ratios() {
        let (mut state, config) = start_state();
        state.learner.health = 40.0;
        state.opponent.health = 60.0;
        state.learner.cooldown = 15;

        let obs = create_observation(&state, &config);
        assert!((obs.0[3] - 0.4).abs() < 1e-6);
        assert!((obs.0[4] - 0.6).abs() < 1e-6);
        assert!((obs.0[5] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_tensor_shape() {
        let (state, config) = start_state();
        let obs = create_observation(&state, &config);

        let tensor = obs.to_tensor::<ArenaBackend>(&default_device());
        assert_eq!(tensor.dims(), [1, OBSERVATION_SIZE]);
    }
}
