//! Result publication.
//!
//! When a motion closes, the voting service hands a `ResultRecord` to the
//! configured `ResultPublisher` exactly once. Failures are logged by the
//! service and never undo the close.

pub mod broadcast;
pub mod http;
pub mod log;
pub mod mock;
pub mod traits;

pub use broadcast::BroadcastPublisher;
pub use http::{HttpPublisherConfig, HttpResultPublisher};
pub use log::LogPublisher;
pub use mock::RecordingPublisher;
pub use traits::{PublishError, PublishResult, ResultPublisher, ResultRecord, DEFAULT_TOPIC};
