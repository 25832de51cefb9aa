//! Broker gateway publisher.
//!
//! Posts records to a broker REST gateway:
//! `POST {endpoint}/topics/{topic}` with
//! `{"records":[{"key":"id,titulo,resultado","value":"<id>,<title>,<outcome>"}]}`.

use super::traits::{PublishError, PublishResult, ResultPublisher, ResultRecord, DEFAULT_TOPIC};
use async_trait::async_trait;
use reqwest::Url;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Configuration for the gateway publisher
#[derive(Debug, Clone)]
pub struct HttpPublisherConfig {
    /// Gateway root, e.g. `http://127.0.0.1:8082`
    pub endpoint: String,
    /// Logical topic name
    pub topic: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for HttpPublisherConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8082".to_string(),
            topic: DEFAULT_TOPIC.to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Serialize)]
struct GatewayBatch<'a> {
    records: [GatewayRecord<'a>; 1],
}

#[derive(Serialize)]
struct GatewayRecord<'a> {
    key: &'a str,
    value: String,
}

/// Publishes result records through an HTTP broker gateway.
#[derive(Debug, Clone)]
pub struct HttpResultPublisher {
    client: reqwest::Client,
    url: Url,
}

impl HttpResultPublisher {
    pub fn new(config: HttpPublisherConfig) -> PublishResult<Self> {
        let mut url = Url::parse(&config.endpoint)
            .map_err(|e| PublishError::Transport(format!("{}: {}", config.endpoint, e)))?;
        url.path_segments_mut()
            .map_err(|_| PublishError::Transport(format!("{}: not a base URL", config.endpoint)))?
            .pop_if_empty()
            .push("topics")
            .push(&config.topic);

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PublishError::Transport(e.to_string()))?;

        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl ResultPublisher for HttpResultPublisher {
    async fn publish(&self, record: &ResultRecord) -> PublishResult<()> {
        let batch = GatewayBatch {
            records: [GatewayRecord {
                key: record.key(),
                value: record.value(),
            }],
        };

        let response = self
            .client
            .post(self.url.clone())
            .json(&batch)
            .send()
            .await
            .map_err(|e| PublishError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PublishError::Rejected {
                status: status.as_u16(),
            });
        }

        debug!(motion = %record.motion_id, url = %self.url, "result record accepted by gateway");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::{MotionId, Outcome};
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn record() -> ResultRecord {
        ResultRecord {
            motion_id: MotionId::nil(),
            title: "Budget 2025".to_string(),
            outcome: Outcome::Tie,
        }
    }

    fn publisher_for(server: &MockServer) -> HttpResultPublisher {
        HttpResultPublisher::new(HttpPublisherConfig {
            endpoint: server.uri(),
            topic: DEFAULT_TOPIC.to_string(),
            timeout: Duration::from_secs(2),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_publish_posts_keyed_record() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/topics/NOVO_RESULTADO_VOTACAO"))
            .and(body_json(serde_json::json!({
                "records": [{
                    "key": "id,titulo,resultado",
                    "value": "00000000-0000-0000-0000-000000000000,Budget 2025,EMPATE"
                }]
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        publisher_for(&server).publish(&record()).await.unwrap();
    }

    #[tokio::test]
    async fn test_gateway_rejection_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = publisher_for(&server).publish(&record()).await.unwrap_err();
        assert!(matches!(err, PublishError::Rejected { status: 503 }));
    }

    #[tokio::test]
    async fn test_unreachable_gateway_is_transport_error() {
        let publisher = HttpResultPublisher::new(HttpPublisherConfig {
            endpoint: "http://127.0.0.1:9".to_string(),
            topic: "results".to_string(),
            timeout: Duration::from_millis(200),
        })
        .unwrap();

        let err = publisher.publish(&record()).await.unwrap_err();
        assert!(matches!(err, PublishError::Transport(_)));
    }

    #[test]
    fn test_topic_url() {
        let publisher = HttpResultPublisher::new(HttpPublisherConfig {
            endpoint: "http://gateway.local/".to_string(),
            topic: "results".to_string(),
            timeout: Duration::from_secs(1),
        })
        .unwrap();

        assert_eq!(publisher.url().as_str(), "http://gateway.local/topics/results");
    }
}
