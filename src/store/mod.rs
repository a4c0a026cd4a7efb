pub mod keys;
pub mod memory;
pub mod persistent;
pub mod trees;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{StoreBackend, StoreConfig};
use crate::squat::types::Judgement;

pub use memory::MemoryJudgementStore;
pub use persistent::SledJudgementStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("judgement history lock poisoned")]
    LockPoisoned,
}

/// Append-only judgement history of one tracking session.
///
/// `save` and `last` must be safe to call from different threads; a reader
/// never observes a partially appended judgement.
pub trait JudgementStore: Send + Sync {
    fn save(&self, judgement: &Judgement) -> Result<(), StoreError>;

    /// Most recently saved judgement, `None` while the history is empty.
    fn last(&self) -> Result<Option<Judgement>, StoreError>;

    fn len(&self) -> Result<u64, StoreError>;

    fn rep_count(&self) -> Result<u64, StoreError>;

    fn flush(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub judgements: u64,
    pub reps: u64,
}

/// Open the history for one tracking session on the configured backend.
pub fn open_session_store(
    config: &StoreConfig,
    session_id: &str,
) -> Result<Arc<dyn JudgementStore>, StoreError> {
    match config.backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryJudgementStore::new())),
        StoreBackend::Sled => Ok(Arc::new(SledJudgementStore::open(
            &config.sled_path,
            session_id,
        )?)),
    }
}

pub(crate) fn serialize<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
    Ok(serde_json::to_vec(value)?)
}

pub(crate) fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
    Ok(serde_json::from_slice(bytes)?)
}
