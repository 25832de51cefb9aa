//! In-process topic backed by a tokio broadcast channel.

use super::traits::{PublishError, PublishResult, ResultPublisher, ResultRecord};
use async_trait::async_trait;
use tokio::sync::broadcast;

/// Fans result records out to every live subscriber.
#[derive(Debug, Clone)]
pub struct BroadcastPublisher {
    topic: String,
    sender: broadcast::Sender<ResultRecord>,
}

impl BroadcastPublisher {
    pub fn new(topic: impl Into<String>, capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            topic: topic.into(),
            sender,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ResultRecord> {
        self.sender.subscribe()
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}

#[async_trait]
impl ResultPublisher for BroadcastPublisher {
    async fn publish(&self, record: &ResultRecord) -> PublishResult<()> {
        self.sender
            .send(record.clone())
            .map(|_| ())
            .map_err(|_| PublishError::NoSubscribers(self.topic.clone()))
    }
}
