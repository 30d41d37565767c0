//! Engine state persistence
//!
//! The whole engine — tables, held total, id counters, configuration — is one
//! serde value. Snapshots are written as JSON so an operator can inspect the
//! state with ordinary tools. Loading validates nothing beyond the codec: a
//! snapshot is trusted to be a state the engine itself produced.

use crate::engine::EscrowEngine;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors from snapshot persistence.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem access failed.
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot (de)serialization failed.
    #[error("snapshot codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

impl EscrowEngine {
    /// Write a snapshot of the full engine state to `path`.
    pub fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(self)?;
        fs::write(path, bytes)?;
        tracing::debug!("engine snapshot written to {}", path.display());
        Ok(())
    }

    /// Restore an engine from a snapshot written by [`Self::save_to`].
    pub fn load_from(path: &Path) -> Result<Self, StoreError> {
        let bytes = fs::read(path)?;
        let engine = serde_json::from_slice(&bytes)?;
        tracing::debug!("engine snapshot loaded from {}", path.display());
        Ok(engine)
    }
}
