// Langfuse HTTP sink
//
// Posts each dispatched event to the ingestion API as a single-item batch.
// Per-item rejections in a 207 response are logged, not retried.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error, warn};

use crate::config::LangfuseConfig;
use crate::error::{DispatchError, Result};
use crate::ingestion::{BatchMetadata, IngestionBatch, IngestionEvent, IngestionResponse};
use crate::sink::IngestionSink;

const SDK_NAME: &str = "langfuse-dispatch";

/// Sink that sends events to Langfuse over HTTP
pub struct HttpSink {
    config: LangfuseConfig,
    client: Client,
}

impl HttpSink {
    /// Create a new HTTP sink from configuration
    pub fn new(config: LangfuseConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| DispatchError::config(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Create from environment configuration
    pub fn from_env() -> Result<Option<Self>> {
        match LangfuseConfig::from_env() {
            Some(config) => Ok(Some(Self::new(config)?)),
            None => Ok(None),
        }
    }

    fn batch_for(&self, event: IngestionEvent) -> IngestionBatch {
        IngestionBatch {
            batch: vec![event],
            metadata: Some(BatchMetadata {
                sdk_name: SDK_NAME.to_string(),
                sdk_version: env!("CARGO_PKG_VERSION").to_string(),
                public_key: self.config.public_key.clone(),
            }),
        }
    }
}

#[async_trait]
impl IngestionSink for HttpSink {
    fn name(&self) -> &'static str {
        "langfuse-http"
    }

    async fn send(&self, event: IngestionEvent) -> Result<()> {
        let envelope_id = event.id;
        let kind = event.body.kind();
        let batch = self.batch_for(event);
        let url = self.config.ingestion_url();

        debug!(url = %url, envelope_id = %envelope_id, kind = %kind, "Sending event to Langfuse");

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.config.auth_header())
            .json(&batch)
            .send()
            .await
            .map_err(|e| DispatchError::connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, body = %body, "Langfuse ingestion failed");
            return Err(DispatchError::export(format!("HTTP {}: {}", status, body)));
        }

        let result: IngestionResponse = response
            .json()
            .await
            .map_err(|e| DispatchError::export(e.to_string()))?;

        for err in &result.errors {
            warn!(
                id = %err.id,
                status = err.status,
                message = ?err.message,
                error = ?err.error,
                "Langfuse ingestion error"
            );
        }

        debug!(
            successes = result.successes.len(),
            errors = result.errors.len(),
            "Langfuse event sent"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use langfuse_events::{Event, ScoreEvent, TraceEvent};
    use serde_json::json;
    use uuid::Uuid;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_ingestion(response: ResponseTemplate) -> (MockServer, LangfuseConfig) {
        let server = MockServer::start().await;
        let config = LangfuseConfig::new("pk-lf-test", "sk-lf-test").with_host(server.uri());

        Mock::given(method("POST"))
            .and(path("/api/public/ingestion"))
            .and(header("Authorization", config.auth_header().as_str()))
            .respond_with(response)
            .expect(1)
            .mount(&server)
            .await;

        (server, config)
    }

    fn trace_event(id: Uuid) -> IngestionEvent {
        IngestionEvent::new(Event::from(
            TraceEvent::new("request").with_id(id).with_tags(["test"]),
        ))
    }

    fn test_config() -> LangfuseConfig {
        LangfuseConfig::new("pk-lf-test", "sk-lf-test").with_host("http://localhost:3000")
    }

    #[test]
    fn test_batch_wraps_single_event_with_sdk_metadata() {
        let sink = HttpSink::new(test_config()).unwrap();
        let event = IngestionEvent::new(Event::from(
            ScoreEvent::new("accuracy", 0.85).with_trace_id("trace-1"),
        ));
        let envelope_id = event.id;

        let json = serde_json::to_value(sink.batch_for(event)).unwrap();

        assert_eq!(json["batch"].as_array().map(Vec::len), Some(1));
        assert_eq!(json["batch"][0]["id"], json!(envelope_id.to_string()));
        assert_eq!(json["batch"][0]["type"], json!("score-create"));
        assert_eq!(json["batch"][0]["body"]["value"], json!(0.85));
        assert_eq!(json["metadata"]["sdk_name"], json!(SDK_NAME));
        assert_eq!(json["metadata"]["public_key"], json!("pk-lf-test"));
    }

    #[test]
    fn test_sink_name() {
        let sink = HttpSink::new(test_config()).unwrap();
        assert_eq!(sink.name(), "langfuse-http");
    }

    #[tokio::test]
    async fn test_send_posts_single_item_batch_with_auth() {
        let (server, config) = mock_ingestion(ResponseTemplate::new(200).set_body_json(json!({
            "successes": [{"id": "x", "status": 201}],
            "errors": []
        })))
        .await;
        let sink = HttpSink::new(config).unwrap();

        let trace_id = Uuid::now_v7();
        let event = trace_event(trace_id);
        let envelope_id = event.id;
        sink.send(event).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let body: serde_json::Value = requests[0].body_json().unwrap();
        let batch = body["batch"].as_array().unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0]["id"], json!(envelope_id.to_string()));
        assert_eq!(batch[0]["type"], json!("trace-create"));
        assert_eq!(batch[0]["body"]["id"], json!(trace_id.to_string()));
        assert_eq!(batch[0]["body"]["tags"], json!(["test"]));
        assert_eq!(body["metadata"]["sdk_name"], json!(SDK_NAME));
    }

    #[tokio::test]
    async fn test_send_accepts_multi_status_with_item_errors() {
        let (_server, config) = mock_ingestion(ResponseTemplate::new(207).set_body_json(json!({
            "successes": [],
            "errors": [{"id": "x", "status": 400, "message": "Invalid request data"}]
        })))
        .await;
        let sink = HttpSink::new(config).unwrap();

        let result = sink.send(trace_event(Uuid::now_v7())).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_send_maps_server_error_to_export() {
        let (_server, config) =
            mock_ingestion(ResponseTemplate::new(500).set_body_string("internal error")).await;
        let sink = HttpSink::new(config).unwrap();

        match sink.send(trace_event(Uuid::now_v7())).await {
            Err(DispatchError::Export(msg)) => {
                assert!(msg.contains("500"));
                assert!(msg.contains("internal error"));
            }
            other => panic!("Expected export error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_send_maps_unreachable_host_to_connection_error() {
        let mut config = LangfuseConfig::new("pk", "sk").with_host("http://127.0.0.1:1");
        config.request_timeout_ms = 2_000;
        let sink = HttpSink::new(config).unwrap();

        let result = sink.send(trace_event(Uuid::now_v7())).await;
        assert!(matches!(result, Err(DispatchError::Connection(_))));
    }
}
