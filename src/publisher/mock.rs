//! Recording publisher for testing.

use super::traits::{PublishError, PublishResult, ResultPublisher, ResultRecord};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Records every publish call. Can be switched to fail.
#[derive(Clone, Default)]
pub struct RecordingPublisher {
    state: Arc<Mutex<RecordingState>>,
}

#[derive(Default)]
struct RecordingState {
    published: Vec<ResultRecord>,
    attempts: usize,
    failing: bool,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the channel unreachable (or reachable again).
    pub fn set_failing(&self, failing: bool) {
        self.lock().failing = failing;
    }

    /// Records that were accepted.
    pub fn published(&self) -> Vec<ResultRecord> {
        self.lock().published.clone()
    }

    /// Publish calls, successful or not.
    pub fn attempts(&self) -> usize {
        self.lock().attempts
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RecordingState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ResultPublisher for RecordingPublisher {
    async fn publish(&self, record: &ResultRecord) -> PublishResult<()> {
        let mut state = self.lock();
        state.attempts += 1;
        if state.failing {
            return Err(PublishError::Transport("channel unreachable".to_string()));
        }
        state.published.push(record.clone());
        Ok(())
    }
}
