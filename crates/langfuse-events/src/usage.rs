// Resource usage recorded on generations

use serde::{Deserialize, Serialize};

/// Unit the usage counters are expressed in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UsageUnit {
    #[default]
    #[serde(rename = "")]
    Unspecified,
    Characters,
    Tokens,
    Milliseconds,
    Seconds,
    Images,
    Requests,
}

impl UsageUnit {
    pub fn is_unspecified(&self) -> bool {
        matches!(self, UsageUnit::Unspecified)
    }
}

impl std::fmt::Display for UsageUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UsageUnit::Unspecified => write!(f, ""),
            UsageUnit::Characters => write!(f, "CHARACTERS"),
            UsageUnit::Tokens => write!(f, "TOKENS"),
            UsageUnit::Milliseconds => write!(f, "MILLISECONDS"),
            UsageUnit::Seconds => write!(f, "SECONDS"),
            UsageUnit::Images => write!(f, "IMAGES"),
            UsageUnit::Requests => write!(f, "REQUESTS"),
        }
    }
}

/// Input/output/total counters plus the token-specific breakdown
///
/// Holds no references, so copying it is a plain value copy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub input: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub output: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub total: i64,
    #[serde(default, skip_serializing_if = "UsageUnit::is_unspecified")]
    pub unit: UsageUnit,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub prompt_tokens: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub completion_tokens: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub total_tokens: i64,
}

fn is_zero(n: &i64) -> bool {
    *n == 0
}

impl Usage {
    /// Token usage with both the generic counters and the token breakdown filled
    pub fn tokens(input: i64, output: i64) -> Self {
        let total = input.saturating_add(output);
        Self {
            input,
            output,
            total,
            unit: UsageUnit::Tokens,
            prompt_tokens: input,
            completion_tokens: output,
            total_tokens: total,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Usage::default()
    }
}
