//! Two-layer policy network with an output-layer-only learning rule
//!
//! # Architecture
//!
//! ```text
//! Input: [1, 8] observation
//!   ↓ Linear(8 → H) + ReLU      (frozen after initialisation)
//!   ↓ Linear(H → 4)             (updated by reward credit)
//! Output: [1, 4] action values
//! ```
//!
//! The update rule is deliberately *not* backpropagation: the reward of the
//! chosen action is credited to that action's output unit only, and the
//! hidden layer never changes. Training is slow and partial as a result; the
//! rest of the system is tuned around that behaviour.
//!
//! # Example
//!
//! ```rust
//! use arena_rl::game::Action;
//! use arena_rl::rl::{AgentConfig, ArenaBackend, Observation, PolicyNetwork, default_device};
//! use rand::{SeedableRng, rngs::StdRng};
//!
//! let mut rng = StdRng::seed_from_u64(0);
//! let mut network =
//!     PolicyNetwork::<ArenaBackend>::new(&AgentConfig::default(), &mut rng, &default_device());
//!
//! let obs = Observation([0.1; 8]);
//! let activations = network.forward(&obs);
//! assert_eq!(activations.action_values().len(), 4);
//!
//! network.update(&obs, Action::Attack, 1.0);
//! ```

use burn::{
    module::{Module, Param},
    nn::{Linear, LinearConfig},
    tensor::{Tensor, TensorData, activation::relu, backend::Backend},
};
use rand::{Rng, distributions::Standard};

use super::config::AgentConfig;
use super::observation::{OBSERVATION_SIZE, Observation};
use crate::game::{Action, NUM_ACTIONS};

/// Intermediate values of one forward pass
///
/// Returned to the caller instead of being cached on the network, so an
/// update always credits exactly the pass it was given.
#[derive(Debug, Clone)]
pub struct Activations<B: Backend> {
    /// Post-ReLU hidden layer, shape `[1, hidden_size]`
    pub hidden: Tensor<B, 2>,
    /// Action values, shape `[1, 4]`
    pub output: Tensor<B, 2>,
}

impl<B: Backend> Activations<B> {
    /// Action values as a plain vector, indexed by [`Action::index`]
    pub fn action_values(&self) -> Vec<f32> {
        to_vec(self.output.clone())
    }

    pub fn hidden_values(&self) -> Vec<f32> {
        to_vec(self.hidden.clone())
    }
}

/// `(hidden weight, hidden bias, output weight, output bias)` dimensions
pub(crate) type LayerShapes = ([usize; 2], Option<[usize; 1]>, [usize; 2], Option<[usize; 1]>);

/// Policy network mapping an observation to one value per action
#[derive(Module, Debug)]
pub struct PolicyNetwork<B: Backend> {
    /// Input → hidden, frozen after initialisation
    hidden: Linear<B>,
    /// Hidden → action values
    output: Linear<B>,
    learning_rate: f32,
}

impl<B: Backend> PolicyNetwork<B> {
    /// Create a network with weights drawn uniformly from `[-init_range, init_range)`
    pub fn new<R: Rng>(config: &AgentConfig, rng: &mut R, device: &B::Device) -> Self {
        let h = config.hidden_size;
        let range = config.init_range;
        let w1: Tensor<B, 2> = uniform(rng, range, [OBSERVATION_SIZE, h], device);
        let b1: Tensor<B, 1> = uniform(rng, range, [h], device);
        let w2: Tensor<B, 2> = uniform(rng, range, [h, NUM_ACTIONS], device);
        let b2: Tensor<B, 1> = uniform(rng, range, [NUM_ACTIONS], device);

        let mut network = Self::init(h, config.learning_rate, device);
        network.hidden.weight = Param::from_tensor(w1);
        network.hidden.bias = Some(Param::from_tensor(b1));
        network.output.weight = Param::from_tensor(w2);
        network.output.bias = Some(Param::from_tensor(b2));

        network
    }

    /// Layer skeleton with burn's default initialisation
    ///
    /// Used as the template a saved record is loaded into.
    pub fn init(hidden_size: usize, learning_rate: f32, device: &B::Device) -> Self {
        Self {
            hidden: LinearConfig::new(OBSERVATION_SIZE, hidden_size).init(device),
            output: LinearConfig::new(hidden_size, NUM_ACTIONS).init(device),
            learning_rate,
        }
    }

    /// Forward pass: `relu(x·W1 + b1)·W2 + b2`
    pub fn forward(&self, observation: &Observation) -> Activations<B> {
        let input = observation.to_tensor::<B>(&self.device());

        let hidden = relu(self.hidden.forward(input));
        let output = self.output.forward(hidden.clone());

        Activations { hidden, output }
    }

    /// Re-run the forward pass on `observation` and credit `reward` to `action`
    pub fn update(&mut self, observation: &Observation, action: Action, reward: f32) {
        let activations = self.forward(observation);
        self.apply_reward_credit(&activations, action, reward);
    }

    /// Non-standard single-layer update
    ///
    /// Builds an error vector that is `reward` at `action` and zero elsewhere,
    /// then applies `W2 += lr * hiddenᵀ·error` and `b2 += lr * error`.
    /// The input→hidden layer is never touched.
    pub fn apply_reward_credit(
        &mut self,
        activations: &Activations<B>,
        action: Action,
        reward: f32,
    ) {
        let mut error = vec![0.0f32; NUM_ACTIONS];
        error[action.index()] = reward;
        let error =
            Tensor::<B, 1>::from_data(TensorData::new(error, [NUM_ACTIONS]), &self.device());

        let weight_step = activations
            .hidden
            .clone()
            .transpose()
            .matmul(error.clone().unsqueeze::<2>())
            .mul_scalar(self.learning_rate);

        self.output.weight = Param::from_tensor(self.output.weight.val() + weight_step);
        if let Some(bias) = self.output.bias.take() {
            let bias = bias.val() + error.mul_scalar(self.learning_rate);
            self.output.bias = Some(Param::from_tensor(bias));
        }
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden.weight.val().dims()[1]
    }

    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    pub fn device(&self) -> B::Device {
        self.output.weight.val().device()
    }

    /// `[8, hidden_size]`, row-major
    pub fn hidden_weights(&self) -> Vec<f32> {
        to_vec(self.hidden.weight.val())
    }

    pub fn hidden_bias(&self) -> Vec<f32> {
        bias_vec(&self.hidden)
    }

    /// `[hidden_size, 4]`, row-major
    pub fn output_weights(&self) -> Vec<f32> {
        to_vec(self.output.weight.val())
    }

    pub fn output_bias(&self) -> Vec<f32> {
        bias_vec(&self.output)
    }

    pub(crate) fn shapes(&self) -> LayerShapes {
        (
            self.hidden.weight.val().dims(),
            self.hidden.bias.as_ref().map(|b| b.val().dims()),
            self.output.weight.val().dims(),
            self.output.bias.as_ref().map(|b| b.val().dims()),
        )
    }
}

fn uniform<B: Backend, R: Rng, const D: usize>(
    rng: &mut R,
    range: f32,
    shape: [usize; D],
    device: &B::Device,
) -> Tensor<B, D> {
    let values: Vec<f32> = (0..shape.iter().product::<usize>())
        .map(|_| {
            let u: f32 = rng.sample(Standard);
            (u - 0.5) * 2.0 * range
        })
        .collect();
    Tensor::from_data(TensorData::new(values, shape), device)
}

fn bias_vec<B: Backend>(layer: &Linear<B>) -> Vec<f32> {
    layer
        .bias
        .as_ref()
        .map(|b| to_vec(b.val()))
        .unwrap_or_default()
}

fn to_vec<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Vec<f32> {
    tensor.into_data().iter::<f32>().collect()
}
