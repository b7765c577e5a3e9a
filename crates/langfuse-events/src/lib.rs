// Langfuse Event Model
//
// This crate defines the observability events an LLM application sends to
// Langfuse and the deep copy engine that snapshots them.
//
// Key design decisions:
// - Payloads (metadata, model parameters, input, output) are `Value`, a closed
//   enum that keeps absent and empty containers apart
// - Each event variant hand-writes its snapshot: fixed-shape fields are copied
//   field by field, payload fields go through `copy::deep_copy`
// - `Clone` on events and values is a deep, alias-free copy
// - No I/O here; the dispatch crate owns queues and transport

pub mod copy;
pub mod event;
pub mod generation;
pub mod level;
pub mod score;
pub mod session;
pub mod span;
pub mod trace;
pub mod usage;
pub mod value;

// Re-exports for convenience
pub use copy::{deep_copy, deep_copy_map, deep_copy_with_report, CopyReport};
pub use event::{snapshot_of, Event, EventKind, LangfuseEvent};
pub use generation::GenerationEvent;
pub use level::ObservationLevel;
pub use score::ScoreEvent;
pub use session::{Session, Trace};
pub use span::SpanEvent;
pub use trace::TraceEvent;
pub use usage::{Usage, UsageUnit};
pub use value::{map_from_json, Map, Number, Opaque, Record, Value};
