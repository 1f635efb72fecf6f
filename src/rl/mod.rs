//! Reinforcement learning core for the arena
//!
//! Provides:
//! - 8-value normalized observations
//! - A two-layer policy network with an output-layer-only update rule
//! - Epsilon-greedy action selection with a decaying exploration rate
//! - An observe / step / reset environment wrapper
//! - Snapshot persistence for the full learner state

pub mod backend;
pub mod config;
pub mod environment;
pub mod network;
pub mod observation;
pub mod persistence;
pub mod policy;

pub use backend::{ArenaBackend, ArenaDevice, default_device};
pub use config::AgentConfig;
pub use environment::ArenaEnvironment;
pub use network::{Activations, PolicyNetwork};
pub use observation::{OBSERVATION_SIZE, Observation, create_observation};
pub use persistence::{
    PersistenceError, SnapshotMetadata, TrainingSnapshot, load_snapshot, save_snapshot,
};
pub use policy::{ExplorationSchedule, argmax, select_action};
