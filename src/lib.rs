//! Arena RL - an online learner fighting a scripted opponent
//!
//! This library provides:
//! - Arena simulation with reward shaping (game module)
//! - Policy network, epsilon-greedy selection, and snapshots (rl module)
//! - Rolling training statistics (metrics module)
//! - Control and telemetry boundary types (bridge module)
//! - Training and evaluation runners (modes module)

pub mod bridge;
pub mod game;
pub mod metrics;
pub mod modes;
pub mod rl;
pub mod telemetry;
