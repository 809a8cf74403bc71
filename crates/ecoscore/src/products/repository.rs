use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;

use super::domain::{NewProduct, ProductId, ScoredProduct};

/// Append-only storage for scoring records.
///
/// `append` assigns the id and creation timestamp and commits the full record
/// or nothing at all.
pub trait ProductRepository: Send + Sync {
    fn append(&self, product: NewProduct) -> Result<ScoredProduct, RepositoryError>;
    /// Newest first, at most `limit` records.
    fn list_recent(&self, limit: usize) -> Result<Vec<ScoredProduct>, RepositoryError>;
    /// Every record in creation order.
    fn list_all(&self) -> Result<Vec<ScoredProduct>, RepositoryError>;
}

/// Error enumeration for record store failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record store unavailable: {0}")]
    Unavailable(String),
    #[error("record store io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("record encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

#[derive(Debug, Default)]
struct MemoryState {
    records: Vec<ScoredProduct>,
    last_id: u64,
}

/// Process-local store; records are lost when the process exits.
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryProductRepository {
    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl ProductRepository for InMemoryProductRepository {
    fn append(&self, product: NewProduct) -> Result<ScoredProduct, RepositoryError> {
        let mut guard = self.lock()?;
        guard.last_id += 1;
        let record = product.into_record(ProductId(guard.last_id), Utc::now());
        guard.records.push(record.clone());
        Ok(record)
    }

    fn list_recent(&self, limit: usize) -> Result<Vec<ScoredProduct>, RepositoryError> {
        let guard = self.lock()?;
        Ok(newest_first(&guard.records, limit))
    }

    fn list_all(&self) -> Result<Vec<ScoredProduct>, RepositoryError> {
        Ok(self.lock()?.records.clone())
    }
}

/// Expects `records` in creation order.
pub(crate) fn newest_first(records: &[ScoredProduct], limit: usize) -> Vec<ScoredProduct> {
    records.iter().rev().take(limit).cloned().collect()
}
