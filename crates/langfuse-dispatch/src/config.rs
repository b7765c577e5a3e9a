// Dispatch Configuration
//
// Configuration for the Langfuse sink and the dispatch queue, loaded from
// environment variables.

use std::env;

const DEFAULT_HOST: &str = "https://cloud.langfuse.com";
const DEFAULT_QUEUE_CAPACITY: usize = 1024;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Langfuse connection settings
#[derive(Debug, Clone)]
pub struct LangfuseConfig {
    /// Langfuse public key (pk-lf-...)
    pub public_key: String,

    /// Langfuse secret key (sk-lf-...)
    pub secret_key: String,

    /// Langfuse host (e.g., https://cloud.langfuse.com)
    pub host: String,

    /// Per-request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl LangfuseConfig {
    pub fn new(public_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            secret_key: secret_key.into(),
            host: DEFAULT_HOST.to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Create configuration from environment variables
    ///
    /// Environment variables:
    /// - `LANGFUSE_PUBLIC_KEY`: Langfuse public key (pk-lf-...)
    /// - `LANGFUSE_SECRET_KEY`: Langfuse secret key (sk-lf-...)
    /// - `LANGFUSE_HOST`: Langfuse host (default: https://cloud.langfuse.com)
    /// - `LANGFUSE_REQUEST_TIMEOUT_MS`: Request timeout (default: 30000)
    ///
    /// Returns None if either key is missing or empty.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let public_key = lookup("LANGFUSE_PUBLIC_KEY")?;
        let secret_key = lookup("LANGFUSE_SECRET_KEY")?;

        // Must have both keys
        if public_key.is_empty() || secret_key.is_empty() {
            return None;
        }

        let host = lookup("LANGFUSE_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let request_timeout_ms = lookup("LANGFUSE_REQUEST_TIMEOUT_MS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS);

        Some(Self {
            public_key,
            secret_key,
            host,
            request_timeout_ms,
        })
    }

    /// Ingestion endpoint for this host
    pub fn ingestion_url(&self) -> String {
        format!("{}/api/public/ingestion", self.host.trim_end_matches('/'))
    }

    /// Generate the Basic Auth header value
    pub fn auth_header(&self) -> String {
        use base64::Engine;
        let credentials = format!("{}:{}", self.public_key, self.secret_key);
        let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
        format!("Basic {}", encoded)
    }
}

/// Settings for the background dispatch queue
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// When false, `enqueue` rejects events with `NotEnabled`
    pub enabled: bool,

    /// Maximum number of events waiting for the sink
    pub queue_capacity: usize,

    /// Release tag filled into traces that do not set one
    pub release: Option<String>,

    /// Environment label filled into events that do not set one
    pub environment: Option<String>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            release: None,
            environment: None,
        }
    }
}

impl DispatchConfig {
    /// Create configuration from environment variables
    ///
    /// Environment variables:
    /// - `LANGFUSE_ENABLED`: Enable/disable dispatch (default: true)
    /// - `LANGFUSE_QUEUE_CAPACITY`: Queue size (default: 1024)
    /// - `LANGFUSE_RELEASE`: Application release/version tag
    /// - `LANGFUSE_ENVIRONMENT`: Environment label, e.g. "production"
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let enabled = lookup("LANGFUSE_ENABLED")
            .map(|v| v.to_lowercase() == "true" || v == "1")
            .unwrap_or(true);

        let queue_capacity = lookup("LANGFUSE_QUEUE_CAPACITY")
            .and_then(|v| v.parse().ok())
            .filter(|capacity| *capacity > 0)
            .unwrap_or(DEFAULT_QUEUE_CAPACITY);

        let release = lookup("LANGFUSE_RELEASE").filter(|v| !v.is_empty());
        let environment = lookup("LANGFUSE_ENVIRONMENT").filter(|v| !v.is_empty());

        Self {
            enabled,
            queue_capacity,
            release,
            environment,
        }
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    pub fn with_release(mut self, release: impl Into<String>) -> Self {
        self.release = Some(release.into());
        self
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }
}
