//! Data crossing the boundary to an external controller
//!
//! Commands arrive as JSON objects tagged by `type`; notifications leave the
//! same way. The transport itself is not part of this crate.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::game::Side;

/// Errors raised at the control boundary
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("malformed control message: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("notification could not be encoded: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("training loop is no longer listening")]
    Disconnected,
}

/// Record published once per completed episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeSummary {
    /// 1-based lifetime episode number
    pub episode_index: usize,
    pub episode_total_reward: f32,
    /// Mean over the rolling history, including this episode
    pub moving_average_reward: f32,
    pub winner_tag: Side,
}

/// Command accepted by the training loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlCommand {
    /// Begin ticking; the loop starts idle
    Start,
    /// Stop ticking but keep serving commands
    Stop,
    Pause,
    Resume,
    Save {
        #[serde(default)]
        path: Option<PathBuf>,
    },
    Load {
        #[serde(default)]
        path: Option<PathBuf>,
    },
    Status,
    Ping,
    /// Leave the training loop
    Shutdown,
}

/// Message pushed out of the training loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    TrainingUpdate {
        episode: usize,
        last_reward: f32,
        avg_reward: f32,
    },
    TrainingStopped {
        episode: usize,
    },
    Status {
        running: bool,
        paused: bool,
        episode: usize,
        last_reward: f32,
        avg_reward: f32,
        exploration_rate: f32,
    },
    Saved {
        path: PathBuf,
    },
    Loaded {
        path: PathBuf,
    },
    Pong,
    Error {
        message: String,
    },
}

impl Notification {
    pub fn to_json(&self) -> Result<String, BridgeError> {
        serde_json::to_string(self).map_err(BridgeError::Encode)
    }
}

impl From<&EpisodeSummary> for Notification {
    fn from(summary: &EpisodeSummary) -> Self {
        Notification::TrainingUpdate {
            episode: summary.episode_index,
            last_reward: summary.episode_total_reward,
            avg_reward: summary.moving_average_reward,
        }
    }
}

/// Parse a raw JSON control message
pub fn parse_command(raw: &str) -> Result<ControlCommand, BridgeError> {
    serde_json::from_str(raw).map_err(BridgeError::Malformed)
}
