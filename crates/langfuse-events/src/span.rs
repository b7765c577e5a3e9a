// Span events
//
// A span is a generic timed observation (a database query, a retrieval step,
// a tool call) nested under a trace and optionally under another observation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::copy::{deep_copy, deep_copy_map};
use crate::event::{EventKind, LangfuseEvent};
use crate::level::ObservationLevel;
use crate::value::{Map, Value};

/// Create or upsert a span
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_observation_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map>,
    #[serde(default)]
    pub level: ObservationLevel,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status_message: String,
    #[serde(default, skip_serializing_if = "Value::is_absent")]
    pub input: Value,
    #[serde(default, skip_serializing_if = "Value::is_absent")]
    pub output: Value,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub environment: String,
}

impl SpanEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_trace_id(mut self, trace_id: Uuid) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    pub fn with_parent_observation_id(mut self, parent_id: Uuid) -> Self {
        self.parent_observation_id = Some(parent_id);
        self
    }

    pub fn with_metadata(mut self, metadata: Map) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_input(mut self, input: impl Into<Value>) -> Self {
        self.input = input.into();
        self
    }

    pub fn with_output(mut self, output: impl Into<Value>) -> Self {
        self.output = output.into();
        self
    }

    pub fn started(mut self) -> Self {
        self.start_time = Some(Utc::now());
        self
    }

    /// Record a successful end with the given output
    pub fn finish(&mut self, output: impl Into<Value>) {
        self.output = output.into();
        self.end_time = Some(Utc::now());
    }

    /// Record a failed end; the span is raised to `ERROR`
    pub fn fail(&mut self, message: impl Into<String>) {
        self.level = ObservationLevel::Error;
        self.status_message = message.into();
        self.end_time = Some(Utc::now());
    }
}

impl LangfuseEvent for SpanEvent {
    fn kind(&self) -> EventKind {
        EventKind::Span
    }

    fn id(&self) -> Option<Uuid> {
        self.id
    }

    fn set_id(&mut self, id: Option<Uuid>) {
        self.id = id;
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn snapshot(&self) -> Self {
        Self {
            id: self.id,
            trace_id: self.trace_id,
            parent_observation_id: self.parent_observation_id,
            name: self.name.clone(),
            start_time: self.start_time,
            end_time: self.end_time,
            metadata: self.metadata.as_ref().map(deep_copy_map),
            level: self.level,
            status_message: self.status_message.clone(),
            input: deep_copy(&self.input),
            output: deep_copy(&self.output),
            version: self.version.clone(),
            environment: self.environment.clone(),
        }
    }
}

impl Clone for SpanEvent {
    fn clone(&self) -> Self {
        self.snapshot()
    }
}
