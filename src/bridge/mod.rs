//! Boundary types between the training core and its collaborators
//!
//! Provides:
//! - Control commands and outbound notifications (JSON, tagged by `type`)
//! - The per-episode telemetry record
//! - Sink traits for telemetry and rendering

pub mod messages;
pub mod sink;

pub use messages::{BridgeError, ControlCommand, EpisodeSummary, Notification, parse_command};
pub use sink::{ChannelSink, LogSink, NullRender, RenderSink, TelemetrySink};
