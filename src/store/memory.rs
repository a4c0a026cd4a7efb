use std::sync::Mutex;

use crate::squat::types::Judgement;
use crate::store::{JudgementStore, SessionStats, StoreError};

#[derive(Debug, Default)]
struct History {
    judgements: Vec<Judgement>,
    reps: u64,
}

/// Unbounded in-memory history guarded by a single mutex.
#[derive(Debug, Default)]
pub struct MemoryJudgementStore {
    inner: Mutex<History>,
}

impl MemoryJudgementStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> Result<SessionStats, StoreError> {
        let history = self.inner.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(SessionStats {
            judgements: history.judgements.len() as u64,
            reps: history.reps,
        })
    }
}

impl JudgementStore for MemoryJudgementStore {
    fn save(&self, judgement: &Judgement) -> Result<(), StoreError> {
        let mut history = self.inner.lock().map_err(|_| StoreError::LockPoisoned)?;
        if judgement.is_rep_completed {
            history.reps += 1;
        }
        history.judgements.push(judgement.clone());
        Ok(())
    }

    fn last(&self) -> Result<Option<Judgement>, StoreError> {
        let history = self.inner.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(history.judgements.last().cloned())
    }

    fn len(&self) -> Result<u64, StoreError> {
        Ok(self.stats()?.judgements)
    }

    fn rep_count(&self) -> Result<u64, StoreError> {
        Ok(self.stats()?.reps)
    }
}
