// Ingestion Sink Trait
//
// Defines where dispatched events end up. The HTTP sink posts them to
// Langfuse; the in-memory sink records them for tests and examples; the no-op
// sink drops them.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::ingestion::IngestionEvent;

/// Destination for dispatched events
#[async_trait]
pub trait IngestionSink: Send + Sync {
    /// Name of this sink (for logging)
    fn name(&self) -> &'static str;

    /// Deliver one event
    async fn send(&self, event: IngestionEvent) -> Result<()>;

    /// Flush anything buffered (called on shutdown)
    async fn flush(&self) -> Result<()> {
        Ok(())
    }
}

/// A sink that drops every event
pub struct NoopSink;

#[async_trait]
impl IngestionSink for NoopSink {
    fn name(&self) -> &'static str {
        "noop"
    }

    async fn send(&self, _event: IngestionEvent) -> Result<()> {
        Ok(())
    }
}

/// In-memory sink
///
/// Keeps every delivered event, in delivery order.
#[derive(Debug, Default, Clone)]
pub struct InMemorySink {
    events: Arc<RwLock<Vec<IngestionEvent>>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all delivered events
    pub async fn events(&self) -> Vec<IngestionEvent> {
        self.events.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.events.write().await.clear();
    }
}

#[async_trait]
impl IngestionSink for InMemorySink {
    fn name(&self) -> &'static str {
        "in-memory"
    }

    async fn send(&self, event: IngestionEvent) -> Result<()> {
        self.events.write().await.push(event);
        Ok(())
    }
}
