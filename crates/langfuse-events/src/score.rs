// Score events
//
// A score attaches an evaluation result to a trace, and optionally to one of
// its observations, a session or a dataset run.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::copy::deep_copy_map;
use crate::event::{EventKind, LangfuseEvent};
use crate::value::Map;

/// Create a score
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observation_id: Option<String>,
    /// Any number; often standardized to 0..1 but never clamped
    #[serde(default)]
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_run_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map>,
}

impl ScoreEvent {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    pub fn with_observation_id(mut self, observation_id: impl Into<String>) -> Self {
        self.observation_id = Some(observation_id.into());
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Map) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

impl LangfuseEvent for ScoreEvent {
    fn kind(&self) -> EventKind {
        EventKind::Score
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
            name: self.name.clone(),
            trace_id: self.trace_id.clone(),
            session_id: self.session_id.clone(),
            observation_id: self.observation_id.clone(),
            value: self.value,
            comment: self.comment.clone(),
            dataset_run_id: self.dataset_run_id.clone(),
            environment: self.environment.clone(),
            metadata: self.metadata.as_ref().map(deep_copy_map),
        }
    }
}

impl Clone for ScoreEvent {
    fn clone(&self) -> Self {
        self.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{map_from_json, Value};
    use serde_json::json;

    fn populated() -> ScoreEvent {
        ScoreEvent {
            id: Some(Uuid::now_v7()),
            name: "test-score".to_string(),
            trace_id: Some("trace-123".to_string()),
            session_id: Some("session-456".to_string()),
            observation_id: Some("obs-789".to_string()),
            value: 0.95,
            comment: Some("Excellent response".to_string()),
            dataset_run_id: Some("dataset-run-001".to_string()),
            environment: Some("production".to_string()),
            metadata: Some(map_from_json(json!({
                "evaluator": "human",
                "criteria": ["accuracy", "relevance", "completeness"]
            }))),
        }
    }

    #[test]
    fn test_empty_score_snapshot() {
        assert_eq!(ScoreEvent::default().snapshot(), ScoreEvent::default());
    }

    #[test]
    fn test_populated_score_snapshot_is_independent() {
        let mut original = populated();
        let snapshot = original.snapshot();
        assert_eq!(snapshot, original);

        original.trace_id = Some("modified".to_string());
        original.comment.as_mut().unwrap().push_str(" (edited)");
        original.value = 0.1;
        *original
            .metadata
            .as_mut()
            .unwrap()
            .get_mut("criteria")
            .and_then(|c| c.at_mut(0))
            .unwrap() = Value::from("modified");

        assert_eq!(snapshot.trace_id.as_deref(), Some("trace-123"));
        assert_eq!(snapshot.comment.as_deref(), Some("Excellent response"));
        assert_eq!(snapshot.value, 0.95);
        let criteria = &snapshot.metadata.as_ref().unwrap()["criteria"];
        assert_eq!(criteria.at(0).and_then(Value::as_str), Some("accuracy"));
    }

    #[test]
    fn test_score_with_absent_fields_stays_absent() {
        let snapshot = ScoreEvent::new("test-score", 0.5).snapshot();
        assert!(snapshot.id.is_none());
        assert!(snapshot.trace_id.is_none());
        assert!(snapshot.session_id.is_none());
        assert!(snapshot.observation_id.is_none());
        assert!(snapshot.comment.is_none());
        assert!(snapshot.dataset_run_id.is_none());
        assert!(snapshot.environment.is_none());
        assert!(snapshot.metadata.is_none());
    }

    #[test]
    fn test_score_value_is_not_rounded_or_clamped() {
        for value in [0.0, -1.5, 0.123_456_789_012_345, 42.0] {
            assert_eq!(ScoreEvent::new("s", value).snapshot().value, value);
        }
    }

    #[test]
    fn test_score_wire_format() {
        let event = ScoreEvent::new("TestScore", 0.85)
            .with_trace_id("trace-1")
            .with_comment("Test score comment");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            json!({
                "name": "TestScore",
                "traceId": "trace-1",
                "value": 0.85,
                "comment": "Test score comment"
            })
        );
        assert_eq!(json, serde_json::to_value(event.snapshot()).unwrap());
    }
}
