// Integration tests for the dispatcher
//
// Events are enqueued, the original is mutated, and the sink must still see
// the event as it was at enqueue time.

use std::sync::Arc;

use async_trait::async_trait;
use langfuse_dispatch::{
    DispatchConfig, DispatchError, Dispatcher, InMemorySink, IngestionBody, IngestionEvent,
    IngestionSink, Result,
};
use langfuse_events::{map_from_json, GenerationEvent, ScoreEvent, SpanEvent, TraceEvent, Value};
use serde_json::json;
use tokio::sync::Semaphore;

/// Sink that blocks every send until a permit is released
struct GatedSink {
    gate: Arc<Semaphore>,
    inner: InMemorySink,
}

#[async_trait]
impl IngestionSink for GatedSink {
    fn name(&self) -> &'static str {
        "gated"
    }

    async fn send(&self, event: IngestionEvent) -> Result<()> {
        let permit = self.gate.acquire().await.expect("gate closed");
        permit.forget();
        self.inner.send(event).await
    }
}

/// Sink that rejects everything
struct FailingSink;

#[async_trait]
impl IngestionSink for FailingSink {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn send(&self, _event: IngestionEvent) -> Result<()> {
        Err(DispatchError::export("HTTP 500: boom"))
    }
}

#[tokio::test]
async fn test_sink_sees_event_as_enqueued() {
    let sink = InMemorySink::new();
    let dispatcher = Dispatcher::start(DispatchConfig::default(), Arc::new(sink.clone()));

    let mut generation = GenerationEvent::new("chat")
        .with_model("gpt-4")
        .with_model_parameters(map_from_json(json!({"temperature": 0.7})))
        .with_input(json!([{"role": "user", "content": "hello"}]));
    let id = dispatcher.enqueue(&generation).unwrap();

    generation
        .model_parameters
        .as_mut()
        .unwrap()
        .insert("temperature".to_string(), Value::from(1.0));
    *generation
        .input
        .at_mut(0)
        .and_then(|m| m.get_mut("content"))
        .unwrap() = Value::from("modified");
    generation.model = "gpt-3.5".to_string();

    dispatcher.shutdown().await.unwrap();

    let events = sink.events().await;
    assert_eq!(events.len(), 1);
    match &events[0].body {
        IngestionBody::GenerationCreate(sent) => {
            assert_eq!(sent.id, Some(id));
            assert_eq!(sent.model, "gpt-4");
            let temperature = sent.model_parameters.as_ref().unwrap()["temperature"]
                .as_f64()
                .unwrap();
            assert!((temperature - 0.7).abs() < 1e-9);
            let content = sent.input.at(0).and_then(|m| m.get("content"));
            assert_eq!(content.and_then(Value::as_str), Some("hello"));
        }
        other => panic!("Expected generation-create, got {:?}", other),
    }
    assert!(generation.id.is_none());
}

#[tokio::test]
async fn test_events_delivered_in_enqueue_order() {
    let sink = InMemorySink::new();
    let dispatcher = Dispatcher::start(DispatchConfig::default(), Arc::new(sink.clone()));

    let trace = TraceEvent::new("request");
    let trace_id = dispatcher.enqueue(&trace).unwrap();
    let span_id = dispatcher
        .enqueue(&SpanEvent::new("retrieve").with_trace_id(trace_id))
        .unwrap();
    let score_id = dispatcher
        .enqueue(&ScoreEvent::new("relevance", 0.9).with_trace_id(trace_id.to_string()))
        .unwrap();

    dispatcher.shutdown().await.unwrap();

    let ids: Vec<_> = sink
        .events()
        .await
        .iter()
        .map(|e| e.body.event_id())
        .collect();
    assert_eq!(ids, vec![Some(trace_id), Some(span_id), Some(score_id)]);
}

#[tokio::test]
async fn test_full_queue_rejects_without_blocking() {
    let gate = Arc::new(Semaphore::new(0));
    let inner = InMemorySink::new();
    let sink = GatedSink {
        gate: gate.clone(),
        inner: inner.clone(),
    };
    let dispatcher = Dispatcher::start(
        DispatchConfig::default().with_queue_capacity(1),
        Arc::new(sink),
    );

    let results: Vec<_> = (0..5)
        .map(|i| dispatcher.enqueue(&TraceEvent::new(format!("trace-{i}"))))
        .collect();
    let accepted = results.iter().filter(|r| r.is_ok()).count();

    assert!(accepted >= 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(DispatchError::QueueFull(1)))));

    gate.add_permits(accepted);
    dispatcher.shutdown().await.unwrap();
    assert_eq!(inner.len().await, accepted);
}

#[tokio::test]
async fn test_sink_failure_does_not_stop_worker() {
    let dispatcher = Dispatcher::start(DispatchConfig::default(), Arc::new(FailingSink));

    for name in ["a", "b", "c"] {
        dispatcher.enqueue(&TraceEvent::new(name)).unwrap();
    }

    dispatcher.shutdown().await.unwrap();
}
