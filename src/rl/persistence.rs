//! Snapshot persistence for saving and restoring a learner
//!
//! A [`TrainingSnapshot`] holds everything needed to continue training where
//! it stopped. The network weights are a burn record (named MessagePack,
//! full precision); the exploration rate, the rolling reward history and the
//! lifetime counters travel next to it as [`SnapshotMetadata`].
//!
//! On disk a snapshot is two files:
//! - `<path>` - network weights (burn record bytes)
//! - `<path>.meta.json` - metadata as JSON
//!
//! Across process boundaries the whole snapshot is one opaque blob.

use anyhow::{Context, Result};
use burn::{
    module::Module,
    record::{FullPrecisionSettings, NamedMpkBytesRecorder, Recorder, RecorderError},
    tensor::backend::Backend,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use super::network::PolicyNetwork;
use super::observation::OBSERVATION_SIZE;
use crate::game::NUM_ACTIONS;

/// Errors raised while decoding or applying a snapshot
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("snapshot could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("network record could not be read or written: {0}")]
    Record(#[from] RecorderError),

    #[error("snapshot does not fit this network: {0}")]
    ShapeMismatch(String),
}

/// Learner state saved alongside the network record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    /// Crate version that wrote the snapshot
    pub version: String,
    /// Width of the hidden layer the record was taken from
    pub hidden_size: usize,
    pub exploration_rate: f32,
    /// Episode totals, oldest first
    pub reward_history: Vec<f32>,
    pub episodes_completed: usize,
    pub total_steps: usize,
    pub learner_wins: usize,
    pub opponent_wins: usize,
}

/// Complete learner state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSnapshot {
    pub metadata: SnapshotMetadata,
    /// Burn record of the [`PolicyNetwork`]
    pub network_record: Vec<u8>,
}

fn recorder() -> NamedMpkBytesRecorder<FullPrecisionSettings> {
    NamedMpkBytesRecorder::<FullPrecisionSettings>::new()
}

impl TrainingSnapshot {
    /// Record `network` and pair it with `metadata`
    ///
    /// `metadata.hidden_size` is overwritten with the network's actual width.
    pub fn new<B: Backend>(
        network: &PolicyNetwork<B>,
        mut metadata: SnapshotMetadata,
    ) -> Result<Self, PersistenceError> {
        metadata.hidden_size = network.hidden_size();
        let network_record = recorder().record(network.clone().into_record(), ())?;

        Ok(Self {
            metadata,
            network_record,
        })
    }

    /// Rebuild the recorded network
    ///
    /// The learning rate is not part of the record; the caller supplies it.
    pub fn network<B: Backend>(
        &self,
        learning_rate: f32,
        device: &B::Device,
    ) -> Result<PolicyNetwork<B>, PersistenceError> {
        let h = self.metadata.hidden_size;
        let template = PolicyNetwork::<B>::init(h, learning_rate, device);
        let record = recorder().load(self.network_record.clone(), device)?;
        let network = template.load_record(record);

        let expected = (
            [OBSERVATION_SIZE, h],
            Some([h]),
            [h, NUM_ACTIONS],
            Some([NUM_ACTIONS]),
        );
        let actual = network.shapes();
        if actual != expected {
            return Err(PersistenceError::ShapeMismatch(format!(
                "expected layers {:?}, got {:?}",
                expected, actual
            )));
        }

        Ok(network)
    }

    /// Encode as an opaque blob
    pub fn to_blob(&self) -> Result<Vec<u8>, PersistenceError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode a blob produced by [`TrainingSnapshot::to_blob`]
    pub fn from_blob(blob: &[u8]) -> Result<Self, PersistenceError> {
        Ok(serde_json::from_slice(blob)?)
    }
}

/// Write a snapshot to `path`, creating parent directories if needed
pub fn save_snapshot(snapshot: &TrainingSnapshot, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
    }

    std::fs::write(path, &snapshot.network_record)
        .with_context(|| format!("Failed to write network weights to {:?}", path))?;

    let meta_path = path.with_extension("meta.json");
    let meta_json = serde_json::to_string_pretty(&snapshot.metadata)
        .context("Failed to serialize metadata")?;
    std::fs::write(&meta_path, meta_json)
        .with_context(|| format!("Failed to write metadata to {:?}", meta_path))?;

    Ok(())
}

/// Read a snapshot previously written by [`save_snapshot`]
pub fn load_snapshot(path: &Path) -> Result<TrainingSnapshot> {
    let meta_path = path.with_extension("meta.json");
    let meta_json = std::fs::read_to_string(&meta_path)
        .with_context(|| format!("Failed to read metadata from {:?}", meta_path))?;
    let metadata: SnapshotMetadata =
        serde_json::from_str(&meta_json).context("Failed to deserialize metadata")?;

    let network_record = std::fs::read(path)
        .with_context(|| format!("Failed to read network weights from {:?}", path))?;

    Ok(TrainingSnapshot {
        metadata,
        network_record,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rl::{AgentConfig, ArenaBackend, Observation, default_device};
    use rand::{SeedableRng, rngs::StdRng};
    use tempfile::TempDir;

    fn sample_network(hidden_size: usize) -> PolicyNetwork<ArenaBackend> {
        let config = AgentConfig {
            hidden_size,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(0);
        PolicyNetwork::new(&config, &mut rng, &default_device())
    }

    fn sample_metadata() -> SnapshotMetadata {
        SnapshotMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            hidden_size: 0,
            exploration_rate: 0.12,
            reward_history: vec![1.5, -2.0, 3.25],
            episodes_completed: 3,
            total_steps: 1200,
            learner_wins: 2,
            opponent_wins: 1,
        }
    }

    fn sample_snapshot() -> TrainingSnapshot {
        let network = sample_network(16);
        TrainingSnapshot::new(&network, sample_metadata()).unwrap()
    }

    #[test]
    fn test_new_records_hidden_size() {
        let snapshot = sample_snapshot();
        assert_eq!(snapshot.metadata.hidden_size, 16);
        assert!(!snapshot.network_record.is_empty());
    }

    #[test]
    fn test_network_round_trip() {
        let network = sample_network(16);
        let snapshot = TrainingSnapshot::new(&network, sample_metadata()).unwrap();

        let restored = snapshot
            .network::<ArenaBackend>(0.05, &default_device())
            .unwrap();
        assert_eq!(restored.hidden_weights(), network.hidden_weights());
        assert_eq!(restored.output_bias(), network.output_bias());
        assert_eq!(restored.learning_rate(), 0.05);

        let obs = Observation([0.3; 8]);
        assert_eq!(
            restored.forward(&obs).action_values(),
            network.forward(&obs).action_values()
        );
    }

    #[test]
    fn test_wrong_hidden_size_is_rejected() {
        let network = sample_network(8);
        let mut snapshot = TrainingSnapshot::new(&network, sample_metadata()).unwrap();
        snapshot.metadata.hidden_size = 16;

        let err = snapshot
            .network::<ArenaBackend>(0.01, &default_device())
            .unwrap_err();
        assert!(matches!(err, PersistenceError::ShapeMismatch(_)));
    }

    #[test]
    fn test_corrupt_record_is_rejected() {
        let mut snapshot = sample_snapshot();
        snapshot.network_record.truncate(10);

        let err = snapshot
            .network::<ArenaBackend>(0.01, &default_device())
            .unwrap_err();
        assert!(matches!(err, PersistenceError::Record(_)));
    }

    #[test]
    fn test_blob_round_trip() {
        let snapshot = sample_snapshot();
        let blob = snapshot.to_blob().unwrap();
        assert_eq!(TrainingSnapshot::from_blob(&blob).unwrap(), snapshot);
    }

    #[test]
    fn test_garbage_blob_is_rejected() {
        let err = TrainingSnapshot::from_blob(b"not a snapshot").unwrap_err();
        assert!(matches!(err, PersistenceError::Decode(_)));
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/dir/agent.mpk");
        let snapshot = sample_snapshot();

        save_snapshot(&snapshot, &path).unwrap();
        assert!(path.exists());
        assert!(temp_dir.path().join("nested/dir/agent.meta.json").exists());

        let loaded = load_snapshot(&path).unwrap();
        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = load_snapshot(&temp_dir.path().join("missing.mpk"));
        assert!(result.is_err());
    }
}
