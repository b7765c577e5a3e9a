// Langfuse Event Dispatch
//
// This crate hands Langfuse events to a background worker that delivers them
// to an ingestion sink.
// Key design decisions:
// - The caller's event is snapshotted on enqueue; the worker owns the copy
// - Bounded queue with non-blocking enqueue; a full queue is an error, not a wait
// - Sinks are pluggable via the IngestionSink trait
// - One event per ingestion request, no retries

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod http;
pub mod ingestion;
pub mod sink;

// Re-exports
pub use config::{DispatchConfig, LangfuseConfig};
pub use dispatcher::Dispatcher;
pub use error::{DispatchError, Result};
pub use http::HttpSink;
pub use ingestion::{IngestionBatch, IngestionBody, IngestionEvent, IngestionResponse};
pub use sink::{InMemorySink, IngestionSink, NoopSink};
