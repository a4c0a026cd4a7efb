use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::{Db, Transactional};

use crate::squat::types::Judgement;
use crate::store::{deserialize, keys, serialize, trees};
use crate::store::{JudgementStore, SessionStats, StoreError};

/// sled-backed history. Every judgement of a session lives under the session
/// prefix in the `judgements` tree; running totals live in `session_stats`
/// and are updated in the same transaction as the append.
#[derive(Debug)]
pub struct SledJudgementStore {
    db: Db,
    session_id: String,
    judgements: sled::Tree,
    session_stats: sled::Tree,
}

impl SledJudgementStore {
    pub fn open(sled_path: &str, session_id: &str) -> Result<Self, StoreError> {
        let db = sled::open(sled_path)?;
        Self::with_db(db, session_id)
    }

    pub fn with_db(db: Db, session_id: &str) -> Result<Self, StoreError> {
        let judgements = db.open_tree(trees::JUDGEMENTS)?;
        let session_stats = db.open_tree(trees::SESSION_STATS)?;
        Ok(Self {
            db,
            session_id: session_id.to_string(),
            judgements,
            session_stats,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn stats(&self) -> Result<SessionStats, StoreError> {
        let key = keys::session_stats_key(&self.session_id);
        match self.session_stats.get(key.as_bytes())? {
            Some(raw) => deserialize(&raw),
            None => Ok(SessionStats::default()),
        }
    }
}

impl JudgementStore for SledJudgementStore {
    fn save(&self, judgement: &Judgement) -> Result<(), StoreError> {
        let sequence = self.db.generate_id()?;
        let key = keys::judgement_key(&self.session_id, sequence);
        let stats_key = keys::session_stats_key(&self.session_id);
        let bytes = serialize(judgement)?;
        let rep = judgement.is_rep_completed;

        (&self.judgements, &self.session_stats)
            .transaction(|(tx_judgements, tx_stats)| {
                tx_judgements.insert(key.as_bytes(), bytes.as_slice())?;

                let mut stats = match tx_stats.get(stats_key.as_bytes())? {
                    Some(raw) => serde_json::from_slice::<SessionStats>(&raw).map_err(|e| {
                        ConflictableTransactionError::Abort(StoreError::Serialization(e))
                    })?,
                    None => SessionStats::default(),
                };
                stats.judgements += 1;
                if rep {
                    stats.reps += 1;
                }
                let stats_bytes = serde_json::to_vec(&stats).map_err(|e| {
                    ConflictableTransactionError::Abort(StoreError::Serialization(e))
                })?;
                tx_stats.insert(stats_key.as_bytes(), stats_bytes)?;
                Ok(())
            })
            .map_err(|error: TransactionError<StoreError>| match error {
                TransactionError::Abort(store_error) => store_error,
                TransactionError::Storage(storage_error) => StoreError::Sled(storage_error),
            })?;

        Ok(())
    }

    fn last(&self) -> Result<Option<Judgement>, StoreError> {
        let prefix = keys::judgement_prefix(&self.session_id);
        match self.judgements.scan_prefix(prefix.as_bytes()).next_back() {
            Some(item) => {
                let (_, value) = item?;
                Ok(Some(deserialize(&value)?))
            }
            None => Ok(None),
        }
    }

    fn len(&self) -> Result<u64, StoreError> {
        Ok(self.stats()?.judgements)
    }

    fn rep_count(&self) -> Result<u64, StoreError> {
        Ok(self.stats()?.reps)
    }

    fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }
}
