// Shared event capability set
//
// Every Langfuse event (trace, generation, span, score) exposes its identity
// and can produce an alias-free snapshot of itself. The dispatch layer takes a
// snapshot before handing an event to a background sender, so the caller may
// keep mutating its original.

use std::fmt;

use uuid::Uuid;

use crate::generation::GenerationEvent;
use crate::score::ScoreEvent;
use crate::span::SpanEvent;
use crate::trace::TraceEvent;

/// Which event variant a value is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Trace,
    Generation,
    Span,
    Score,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Trace => "trace",
            EventKind::Generation => "generation",
            EventKind::Span => "span",
            EventKind::Score => "score",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capabilities shared by all Langfuse events
pub trait LangfuseEvent: Send + Sync + 'static {
    fn kind(&self) -> EventKind;

    /// Caller-assigned identity; `None` lets the backend assign one
    fn id(&self) -> Option<Uuid>;

    fn set_id(&mut self, id: Option<Uuid>);

    fn name(&self) -> &str;

    /// Independent copy, equal in value, sharing no mutable storage
    fn snapshot(&self) -> Self
    where
        Self: Sized;
}

/// Snapshot an optional event; no event yields no snapshot
pub fn snapshot_of<E: LangfuseEvent>(event: Option<&E>) -> Option<E> {
    event.map(LangfuseEvent::snapshot)
}

/// Any one of the four event variants
#[derive(Debug, PartialEq)]
pub enum Event {
    Trace(TraceEvent),
    Generation(GenerationEvent),
    Span(SpanEvent),
    Score(ScoreEvent),
}

impl Event {
    /// Fill the environment label when the event does not carry one
    pub fn fill_environment(&mut self, environment: &str) {
        match self {
            Event::Trace(e) if e.environment.is_empty() => {
                e.environment = environment.to_string()
            }
            Event::Generation(e) if e.environment.is_empty() => {
                e.environment = environment.to_string()
            }
            Event::Span(e) if e.environment.is_empty() => e.environment = environment.to_string(),
            Event::Score(e) if e.environment.is_none() => {
                e.environment = Some(environment.to_string())
            }
            _ => {}
        }
    }

    /// Fill the release tag on traces that do not carry one
    pub fn fill_release(&mut self, release: &str) {
        if let Event::Trace(e) = self {
            if e.release.is_empty() {
                e.release = release.to_string();
            }
        }
    }
}

impl LangfuseEvent for Event {
    fn kind(&self) -> EventKind {
        match self {
            Event::Trace(_) => EventKind::Trace,
            Event::Generation(_) => EventKind::Generation,
            Event::Span(_) => EventKind::Span,
            Event::Score(_) => EventKind::Score,
        }
    }

    fn id(&self) -> Option<Uuid> {
        match self {
            Event::Trace(e) => e.id(),
            Event::Generation(e) => e.id(),
            Event::Span(e) => e.id(),
            Event::Score(e) => e.id(),
        }
    }

    fn set_id(&mut self, id: Option<Uuid>) {
        match self {
            Event::Trace(e) => e.set_id(id),
            Event::Generation(e) => e.set_id(id),
            Event::Span(e) => e.set_id(id),
            Event::Score(e) => e.set_id(id),
        }
    }

    fn name(&self) -> &str {
        match self {
            Event::Trace(e) => e.name(),
            Event::Generation(e) => e.name(),
            Event::Span(e) => e.name(),
            Event::Score(e) => e.name(),
        }
    }

    fn snapshot(&self) -> Self {
        match self {
            Event::Trace(e) => Event::Trace(e.snapshot()),
            Event::Generation(e) => Event::Generation(e.snapshot()),
            Event::Span(e) => Event::Span(e.snapshot()),
            Event::Score(e) => Event::Score(e.snapshot()),
        }
    }
}

impl Clone for Event {
    fn clone(&self) -> Self {
        self.snapshot()
    }
}

impl From<TraceEvent> for Event {
    fn from(event: TraceEvent) -> Self {
        Event::Trace(event)
    }
}

impl From<GenerationEvent> for Event {
    fn from(event: GenerationEvent) -> Self {
        Event::Generation(event)
    }
}

impl From<SpanEvent> for Event {
    fn from(event: SpanEvent) -> Self {
        Event::Span(event)
    }
}

impl From<ScoreEvent> for Event {
    fn from(event: ScoreEvent) -> Self {
        Event::Score(event)
    }
}
