// Trace events
//
// A trace is the top-level container for one request or pipeline run.
// Observations (generations, spans) and scores attach to it by trace id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::copy::{deep_copy, deep_copy_map};
use crate::event::{EventKind, LangfuseEvent};
use crate::value::{Map, Value};

/// Create or upsert a trace
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceEvent {
    /// Traces are upserted on id; `None` lets the backend generate one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Identifier of the trace, used for sorting/filtering in the UI
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user_id: String,
    /// Traces sharing a session id are grouped into one session
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub session_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub release: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    /// Merged by the backend when the trace is updated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub public: bool,
    #[serde(default, skip_serializing_if = "Value::is_absent")]
    pub input: Value,
    #[serde(default, skip_serializing_if = "Value::is_absent")]
    pub output: Value,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub environment: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub external_id: String,
}

impl TraceEvent {
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

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    pub fn with_release(mut self, release: impl Into<String>) -> Self {
        self.release = release.into();
        self
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    pub fn with_metadata(mut self, metadata: Map) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_public(mut self, public: bool) -> Self {
        self.public = public;
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
}

impl LangfuseEvent for TraceEvent {
    fn kind(&self) -> EventKind {
        EventKind::Trace
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
            timestamp: self.timestamp,
            name: self.name.clone(),
            user_id: self.user_id.clone(),
            session_id: self.session_id.clone(),
            release: self.release.clone(),
            version: self.version.clone(),
            metadata: self.metadata.as_ref().map(deep_copy_map),
            tags: self.tags.as_ref().map(|tags| tags.to_vec()),
            public: self.public,
            input: deep_copy(&self.input),
            output: deep_copy(&self.output),
            environment: self.environment.clone(),
            external_id: self.external_id.clone(),
        }
    }
}

impl Clone for TraceEvent {
    fn clone(&self) -> Self {
        self.snapshot()
    }
}
