// Langfuse ingestion wire format
//
// Each event travels as an envelope `{id, timestamp, type, body}` where
// `type` names the create operation and `body` is the event itself. The
// ingestion API accepts a `{batch: [...]}` request and answers with per-item
// successes and errors (HTTP 207).

use chrono::{DateTime, Utc};
use langfuse_events::{
    Event, EventKind, GenerationEvent, LangfuseEvent, ScoreEvent, SpanEvent, TraceEvent,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ingestion operation and its event body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "body", rename_all = "kebab-case")]
pub enum IngestionBody {
    TraceCreate(TraceEvent),
    GenerationCreate(GenerationEvent),
    SpanCreate(SpanEvent),
    ScoreCreate(ScoreEvent),
}

impl IngestionBody {
    pub fn kind(&self) -> EventKind {
        match self {
            IngestionBody::TraceCreate(_) => EventKind::Trace,
            IngestionBody::GenerationCreate(_) => EventKind::Generation,
            IngestionBody::SpanCreate(_) => EventKind::Span,
            IngestionBody::ScoreCreate(_) => EventKind::Score,
        }
    }

    /// Identity of the wrapped event
    pub fn event_id(&self) -> Option<Uuid> {
        match self {
            IngestionBody::TraceCreate(e) => e.id(),
            IngestionBody::GenerationCreate(e) => e.id(),
            IngestionBody::SpanCreate(e) => e.id(),
            IngestionBody::ScoreCreate(e) => e.id(),
        }
    }

    /// Wire name of the operation
    pub fn type_name(&self) -> &'static str {
        match self {
            IngestionBody::TraceCreate(_) => "trace-create",
            IngestionBody::GenerationCreate(_) => "generation-create",
            IngestionBody::SpanCreate(_) => "span-create",
            IngestionBody::ScoreCreate(_) => "score-create",
        }
    }
}

impl From<Event> for IngestionBody {
    fn from(event: Event) -> Self {
        match event {
            Event::Trace(e) => IngestionBody::TraceCreate(e),
            Event::Generation(e) => IngestionBody::GenerationCreate(e),
            Event::Span(e) => IngestionBody::SpanCreate(e),
            Event::Score(e) => IngestionBody::ScoreCreate(e),
        }
    }
}

/// One item of an ingestion batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestionEvent {
    /// Envelope id, distinct from the event id; used for per-item results
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub body: IngestionBody,
}

impl IngestionEvent {
    pub fn new(event: impl Into<IngestionBody>) -> Self {
        Self {
            id: Uuid::now_v7(),
            timestamp: Utc::now(),
            body: event.into(),
        }
    }
}

/// Batch request to Langfuse ingestion API
#[derive(Debug, Clone, Serialize)]
pub struct IngestionBatch {
    pub batch: Vec<IngestionEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BatchMetadata>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchMetadata {
    pub sdk_name: String,
    pub sdk_version: String,
    pub public_key: String,
}

/// Response from Langfuse ingestion API
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IngestionResponse {
    #[serde(default)]
    pub successes: Vec<SuccessItem>,
    #[serde(default)]
    pub errors: Vec<ErrorItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SuccessItem {
    pub id: String,
    pub status: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorItem {
    pub id: String,
    pub status: i32,
    pub message: Option<String>,
    pub error: Option<serde_json::Value>,
}
