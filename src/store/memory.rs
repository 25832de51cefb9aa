//! In-memory motion store.

use super::traits::{MotionStore, StoreResult};
use crate::motion::{Motion, MotionId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Default)]
struct MemoryState {
    motions: HashMap<MotionId, Motion>,
    /// Insertion order, for listing
    order: Vec<MotionId>,
}

/// Process-local store. Contents are lost on drop.
#[derive(Default)]
pub struct InMemoryMotionStore {
    state: RwLock<MemoryState>,
}

impl InMemoryMotionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .motions
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl MotionStore for InMemoryMotionStore {
    async fn save(&self, motion: Motion) -> StoreResult<Motion> {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        let id = motion.id();
        if state.motions.insert(id, motion.clone()).is_none() {
            state.order.push(id);
        }
        Ok(motion)
    }

    async fn find_by_id(&self, id: MotionId) -> StoreResult<Option<Motion>> {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        Ok(state.motions.get(&id).cloned())
    }

    async fn list_all(&self) -> StoreResult<Vec<Motion>> {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        Ok(state
            .order
            .iter()
            .filter_map(|id| state.motions.get(id).cloned())
            .collect())
    }
}
