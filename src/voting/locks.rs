//! Per-motion exclusive locks.
//!
//! Callers of the same motion serialize on that motion's mutex; different
//! motions never contend.

use crate::motion::MotionId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Idle entries are dropped once the registry grows past this size.
const PRUNE_THRESHOLD: usize = 1024;

#[derive(Default)]
pub struct MotionLocks {
    locks: Mutex<HashMap<MotionId, Arc<AsyncMutex<()>>>>,
}

impl MotionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `id`. Released when the guard drops.
    pub async fn acquire(&self, id: MotionId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            if locks.len() > PRUNE_THRESHOLD {
                // Nobody holds or waits on an entry whose only owner is the map
                locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            }
            locks.entry(id).or_default().clone()
        };

        lock.lock_owned().await
    }

    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_motion_is_exclusive() {
        let locks = Arc::new(MotionLocks::new());
        let id = MotionId::new();

        let guard = locks.acquire(id).await;

        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(id).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn test_different_motions_do_not_contend() {
        let locks = MotionLocks::new();
        let _a = locks.acquire(MotionId::new()).await;
        let b = tokio::time::timeout(Duration::from_millis(50), locks.acquire(MotionId::new())).await;
        assert!(b.is_ok());
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn test_idle_entries_pruned() {
        let locks = MotionLocks::new();
        for _ in 0..=PRUNE_THRESHOLD {
            drop(locks.acquire(MotionId::new()).await);
        }
        let held = MotionId::new();
        let _guard = locks.acquire(held).await;

        // The threshold was crossed on the last acquire, leaving only the held entry
        assert_eq!(locks.len(), 1);
    }
}
