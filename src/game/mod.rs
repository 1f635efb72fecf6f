//! Arena combat simulation
//!
//! This module contains the physics, scripted opponent, and reward shaping
//! without any learning, I/O, or rendering dependencies.

pub mod action;
pub mod config;
pub mod engine;
pub mod state;

// Re-export commonly used types
pub use action::{Action, NUM_ACTIONS};
pub use config::{ArenaConfig, RewardConfig};
pub use engine::{ArenaEngine, StepInfo, StepResult};
pub use state::{ArenaState, Combatant, Position, Projectile, Side};
