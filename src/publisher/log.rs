//! Publisher that only emits a structured log event.

use super::traits::{PublishResult, ResultPublisher, ResultRecord};
use async_trait::async_trait;
use tracing::info;

#[derive(Debug, Clone)]
pub struct LogPublisher {
    topic: String,
}

impl LogPublisher {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
        }
    }
}

#[async_trait]
impl ResultPublisher for LogPublisher {
    async fn publish(&self, record: &ResultRecord) -> PublishResult<()> {
        info!(
            topic = %self.topic,
            key = record.key(),
            value = %record.value(),
            "voting result"
        );
        Ok(())
    }
}
