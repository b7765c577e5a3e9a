// Session read model
//
// The backend groups traces that share a session id. These types mirror the
// `GET /api/public/sessions/{id}` payload so callers can check how their
// traces were grouped. They are read-mostly projections, not ingestion events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::copy::{deep_copy, deep_copy_map};
use crate::trace::TraceEvent;
use crate::value::{Map, Value};

/// A trace as the backend reports it inside a session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trace {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Value::is_absent")]
    pub input: Value,
    #[serde(default, skip_serializing_if = "Value::is_absent")]
    pub output: Value,
    #[serde(default)]
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub project_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Trace {
    /// Project a trace event the way the backend will report it
    ///
    /// Events without an id project to an empty id.
    pub fn from_event(
        event: &TraceEvent,
        project_id: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            id: event.id.map(|id| id.to_string()).unwrap_or_default(),
            timestamp: event.timestamp,
            name: event.name.clone(),
            input: deep_copy(&event.input),
            output: deep_copy(&event.output),
            session_id: session_id.into(),
            release: non_empty(&event.release),
            version: non_empty(&event.version),
            user_id: event.user_id.clone(),
            metadata: event.metadata.as_ref().map(deep_copy_map),
            tags: event.tags.clone().unwrap_or_default(),
            public: event.public,
            project_id: project_id.into(),
            created_at: None,
            updated_at: None,
        }
    }

    /// Copy with the server-assigned timestamps cleared, for comparisons
    pub fn without_timestamps(&self) -> Self {
        Self {
            timestamp: None,
            created_at: None,
            updated_at: None,
            ..self.clone()
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Traces grouped under one session id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub project_id: String,
    #[serde(default)]
    pub traces: Vec<Trace>,
}

impl Session {
    /// Group trace events under the first event's session id
    ///
    /// Returns `None` when there are no events.
    pub fn from_traces(project_id: &str, events: &[TraceEvent]) -> Option<Self> {
        let first = events.first()?;
        let session_id = first.session_id.clone();
        let traces = events
            .iter()
            .map(|event| Trace::from_event(event, project_id, session_id.clone()))
            .collect();

        Some(Self {
            id: session_id,
            created_at: Utc::now(),
            project_id: project_id.to_string(),
            traces,
        })
    }

    pub fn trace_ids(&self) -> Vec<&str> {
        self.traces.iter().map(|t| t.id.as_str()).collect()
    }

    /// Compare two sessions ignoring server-assigned timestamps
    pub fn same_grouping(&self, other: &Session) -> bool {
        self.id == other.id
            && self.project_id == other.project_id
            && self.traces.len() == other.traces.len()
            && self
                .traces
                .iter()
                .zip(&other.traces)
                .all(|(a, b)| a.without_timestamps() == b.without_timestamps())
    }
}
