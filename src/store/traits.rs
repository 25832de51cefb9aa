//! Motion store trait abstraction.

use crate::motion::{Motion, MotionId};
use crate::serialization::SerializationError;
use async_trait::async_trait;
use std::any::Any;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    #[error("Corrupt store: {0}")]
    Corrupt(String),
}

/// Exclusive write access to a store, released on drop.
///
/// Held across every find-then-save sequence so that concurrent writers,
/// including other processes sharing the same backing file, never lose
/// each other's updates.
pub struct StoreLock {
    _held: Option<Box<dyn Any + Send + Sync>>,
}

impl StoreLock {
    /// Nothing beyond the caller's own locking is needed.
    pub fn noop() -> Self {
        Self { _held: None }
    }

    /// Keep `inner` alive until the lock is dropped.
    pub fn holding<T: Any + Send + Sync>(inner: T) -> Self {
        Self {
            _held: Some(Box::new(inner)),
        }
    }
}

/// Keyed collection of motions.
#[async_trait]
pub trait MotionStore: Send + Sync {
    /// Exclusive access for a find-then-save on `id`.
    ///
    /// Stores shared only within one process rely on the caller's
    /// per-motion lock and return a no-op.
    async fn lock(&self, _id: MotionId) -> StoreResult<StoreLock> {
        Ok(StoreLock::noop())
    }

    /// Insert or replace a motion by id. Returns the stored copy.
    async fn save(&self, motion: Motion) -> StoreResult<Motion>;

    async fn find_by_id(&self, id: MotionId) -> StoreResult<Option<Motion>>;

    /// All motions in creation order.
    async fn list_all(&self) -> StoreResult<Vec<Motion>>;
}
