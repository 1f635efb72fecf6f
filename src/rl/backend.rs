//! Backend type aliases and device management
//!
//! The policy network is tiny (8 → 16 → 4) and is updated with a hand-written
//! rule rather than autodiff, so a plain CPU NdArray backend is all it needs.

use burn::backend::ndarray::{NdArray, NdArrayDevice};

/// Backend used for both acting and learning
pub type ArenaBackend = NdArray<f32>;

/// Device type for [`ArenaBackend`]
pub type ArenaDevice = NdArrayDevice;

/// Get the default device for computation
pub fn default_device() -> ArenaDevice {
    NdArrayDevice::default()
}
