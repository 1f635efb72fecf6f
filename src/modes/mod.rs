pub mod evaluate;
pub mod simulation;
pub mod train;

pub use evaluate::{EvaluateMode, EvaluationReport};
pub use simulation::{Simulation, TickOutcome};
pub use train::{ControlHandle, DEFAULT_SNAPSHOT_PATH, TrainConfig, TrainMode, tick_stream};
