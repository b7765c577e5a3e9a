// Send a small trace to Langfuse
//
// Uses the HTTP sink when LANGFUSE_PUBLIC_KEY and LANGFUSE_SECRET_KEY are set,
// otherwise records into memory and prints what would have been sent.

use std::sync::Arc;

use anyhow::Result;
use langfuse_dispatch::{DispatchConfig, Dispatcher, HttpSink, InMemorySink, IngestionSink};
use langfuse_events::{map_from_json, GenerationEvent, ScoreEvent, SpanEvent, TraceEvent, Usage};
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "langfuse_dispatch=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let memory = InMemorySink::new();
    let sink: Arc<dyn IngestionSink> = match HttpSink::from_env()? {
        Some(http) => Arc::new(http),
        None => {
            tracing::info!("Langfuse keys not set, recording events in memory");
            Arc::new(memory.clone())
        }
    };

    let dispatcher = Dispatcher::start(DispatchConfig::from_env(), sink);

    let trace = TraceEvent::new("support-request")
        .with_user_id("user-42")
        .with_tags(["example"])
        .with_input(json!({"question": "How do I reset my password?"}));
    let trace_id = dispatcher.enqueue(&trace)?;

    let mut retrieval = SpanEvent::new("retrieve-docs")
        .with_trace_id(trace_id)
        .started();
    retrieval.finish(json!([{"doc": "reset-password.md", "score": 0.92}]));
    dispatcher.enqueue(&retrieval)?;

    let mut generation = GenerationEvent::new("answer")
        .with_trace_id(trace_id)
        .with_model("gpt-4")
        .with_model_parameters(map_from_json(json!({"temperature": 0.2})))
        .with_input(json!([{"role": "user", "content": "How do I reset my password?"}]))
        .started();
    generation.mark_completion_start();
    generation.usage = Usage::tokens(24, 38);
    generation.finish("Open Settings and choose Reset password.");
    dispatcher.enqueue(&generation)?;

    dispatcher.enqueue(&ScoreEvent::new("helpfulness", 0.8).with_trace_id(trace_id.to_string()))?;

    dispatcher.shutdown().await?;

    for event in memory.events().await {
        println!("{}", serde_json::to_string_pretty(&event)?);
    }

    Ok(())
}
