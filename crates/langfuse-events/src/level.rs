// Observation severity level

use serde::{Deserialize, Serialize};

/// Severity of a span or generation, used for filtering in the UI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ObservationLevel {
    Debug,
    #[default]
    Default,
    Warning,
    Error,
}

impl std::fmt::Display for ObservationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObservationLevel::Debug => write!(f, "DEBUG"),
            ObservationLevel::Default => write!(f, "DEFAULT"),
            ObservationLevel::Warning => write!(f, "WARNING"),
            ObservationLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl From<&str> for ObservationLevel {
    fn from(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "DEBUG" => ObservationLevel::Debug,
            "WARNING" => ObservationLevel::Warning,
            "ERROR" => ObservationLevel::Error,
            _ => ObservationLevel::Default,
        }
    }
}
