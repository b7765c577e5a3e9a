// Generation events
//
// A generation is an observation that records one model call: the prompt,
// the completion, the model parameters and the resource usage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::copy::{deep_copy, deep_copy_map};
use crate::event::{EventKind, LangfuseEvent};
use crate::level::ObservationLevel;
use crate::usage::Usage;
use crate::value::{Map, Value};

/// Create or upsert a generation
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_observation_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    /// When the first token arrived; set for streaming completions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_parameters: Option<Map>,
    #[serde(default, skip_serializing_if = "Value::is_absent")]
    pub input: Value,
    #[serde(default, skip_serializing_if = "Value::is_absent")]
    pub output: Value,
    #[serde(default)]
    pub level: ObservationLevel,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status_message: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(default, skip_serializing_if = "Usage::is_empty")]
    pub usage: Usage,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub prompt_name: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub prompt_version: i32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub environment: String,
}

fn is_zero(n: &i32) -> bool {
    *n == 0
}

impl GenerationEvent {
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

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_model_parameters(mut self, parameters: Map) -> Self {
        self.model_parameters = Some(parameters);
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

    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = usage;
        self
    }

    pub fn with_level(mut self, level: ObservationLevel) -> Self {
        self.level = level;
        self
    }

    /// Mark the generation as started now
    pub fn started(mut self) -> Self {
        self.start_time = Some(Utc::now());
        self
    }

    /// Record the arrival of the first streamed token
    pub fn mark_completion_start(&mut self) {
        self.completion_start_time = Some(Utc::now());
    }

    /// Record completion with the model output
    pub fn finish(&mut self, output: impl Into<Value>) {
        self.output = output.into();
        self.end_time = Some(Utc::now());
    }
}

impl LangfuseEvent for GenerationEvent {
    fn kind(&self) -> EventKind {
        EventKind::Generation
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
            trace_id: self.trace_id,
            parent_observation_id: self.parent_observation_id,
            start_time: self.start_time,
            completion_start_time: self.completion_start_time,
            end_time: self.end_time,
            metadata: self.metadata.as_ref().map(deep_copy_map),
            model: self.model.clone(),
            model_parameters: self.model_parameters.as_ref().map(deep_copy_map),
            input: deep_copy(&self.input),
            output: deep_copy(&self.output),
            level: self.level,
            status_message: self.status_message.clone(),
            version: self.version.clone(),
            usage: self.usage,
            prompt_name: self.prompt_name.clone(),
            prompt_version: self.prompt_version,
            environment: self.environment.clone(),
        }
    }
}

impl Clone for GenerationEvent {
    fn clone(&self) -> Self {
        self.snapshot()
    }
}
