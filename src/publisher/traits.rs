//! Result publisher trait abstraction.

use crate::motion::{MotionClosed, MotionId, Outcome};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Default logical topic for closed-motion results.
pub const DEFAULT_TOPIC: &str = "NOVO_RESULTADO_VOTACAO";

/// Key schema sent with every record.
pub const RECORD_KEY: &str = "id,titulo,resultado";

/// Outcome notification for one closed motion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub motion_id: MotionId,
    pub title: String,
    pub outcome: Outcome,
}

impl ResultRecord {
    pub fn key(&self) -> &'static str {
        RECORD_KEY
    }

    /// `<id>,<title>,<outcome>`
    pub fn value(&self) -> String {
        format!("{},{},{}", self.motion_id, self.title, self.outcome.wire_token())
    }
}

impl From<&MotionClosed> for ResultRecord {
    fn from(event: &MotionClosed) -> Self {
        Self {
            motion_id: event.motion_id,
            title: event.title.clone(),
            outcome: event.outcome,
        }
    }
}

/// Result type for publish operations.
pub type PublishResult<T> = Result<T, PublishError>;

/// Publication errors
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Broker rejected record with status {status}")]
    Rejected { status: u16 },

    #[error("No subscribers on topic {0}")]
    NoSubscribers(String),
}

/// Channel notified once per motion when it closes.
#[async_trait]
pub trait ResultPublisher: Send + Sync {
    async fn publish(&self, record: &ResultRecord) -> PublishResult<()>;
}
