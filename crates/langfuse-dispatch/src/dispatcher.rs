// Background event dispatcher
//
// `enqueue` snapshots the caller's event, assigns an id when it has none,
// and hands the snapshot to a bounded channel. A single worker task drains
// the channel into the configured sink. The caller's event is never touched
// and never shared with the worker.

use std::sync::Arc;

use langfuse_events::{Event, LangfuseEvent};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::DispatchConfig;
use crate::error::{DispatchError, Result};
use crate::ingestion::IngestionEvent;
use crate::sink::IngestionSink;

/// Hands event snapshots to a sink on a background task
pub struct Dispatcher {
    sender: Option<mpsc::Sender<IngestionEvent>>,
    worker: Option<JoinHandle<()>>,
    sink: Arc<dyn IngestionSink>,
    config: DispatchConfig,
}

impl Dispatcher {
    /// Start the worker task. Must be called from within a tokio runtime.
    pub fn start(config: DispatchConfig, sink: Arc<dyn IngestionSink>) -> Self {
        if !config.enabled {
            info!(sink = sink.name(), "Langfuse dispatch disabled");
            return Self {
                sender: None,
                worker: None,
                sink,
                config,
            };
        }

        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
        let worker = tokio::spawn(run_worker(receiver, sink.clone()));

        info!(
            sink = sink.name(),
            queue_capacity = config.queue_capacity,
            "Langfuse dispatch started"
        );

        Self {
            sender: Some(sender),
            worker: Some(worker),
            sink,
            config,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.sender.is_some()
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Queue a snapshot of `event` for delivery and return its id
    ///
    /// The id is the event's own when set, otherwise a fresh one assigned to
    /// the snapshot only. Never blocks: a full queue is reported as
    /// `QueueFull` and the event is dropped.
    pub fn enqueue<E>(&self, event: &E) -> Result<Uuid>
    where
        E: LangfuseEvent + Into<Event>,
    {
        let sender = self.sender.as_ref().ok_or(DispatchError::NotEnabled)?;

        let mut snapshot = event.snapshot();
        let id = match snapshot.id() {
            Some(id) => id,
            None => {
                let id = Uuid::now_v7();
                snapshot.set_id(Some(id));
                id
            }
        };

        let mut snapshot: Event = snapshot.into();
        if let Some(environment) = &self.config.environment {
            snapshot.fill_environment(environment);
        }
        if let Some(release) = &self.config.release {
            snapshot.fill_release(release);
        }

        let kind = snapshot.kind();
        sender
            .try_send(IngestionEvent::new(snapshot))
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => {
                    warn!(event_id = %id, kind = %kind, "Langfuse dispatch queue full, dropping event");
                    DispatchError::QueueFull(self.config.queue_capacity)
                }
                mpsc::error::TrySendError::Closed(_) => DispatchError::Closed,
            })?;

        debug!(event_id = %id, kind = %kind, "Langfuse event queued");
        Ok(id)
    }

    /// Close the queue, deliver what is already queued, then flush the sink
    pub async fn shutdown(mut self) -> Result<()> {
        drop(self.sender.take());

        if let Some(worker) = self.worker.take() {
            if let Err(e) = worker.await {
                warn!(error = %e, "Langfuse dispatch worker ended abnormally");
            }
        }

        self.sink.flush().await?;
        info!(sink = self.sink.name(), "Langfuse dispatch stopped");
        Ok(())
    }
}

async fn run_worker(mut receiver: mpsc::Receiver<IngestionEvent>, sink: Arc<dyn IngestionSink>) {
    while let Some(event) = receiver.recv().await {
        let envelope_id = event.id;
        let kind = event.body.kind();
        if let Err(e) = sink.send(event).await {
            warn!(
                sink = sink.name(),
                envelope_id = %envelope_id,
                kind = %kind,
                error = %e,
                "Failed to deliver Langfuse event"
            );
        }
    }
}
