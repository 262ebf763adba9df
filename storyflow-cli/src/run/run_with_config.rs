//! Run one request with a given config; does not read .env.

use std::collections::HashSet;
use std::sync::Arc;

use storyflow::{AgentError, InMemoryDocumentStore, Services, StoryState, StreamEvent, StreamMode};
use tokio_stream::StreamExt;

use crate::config::RunConfig;
use crate::middleware::WithNodeLogging;

use super::{build_services, load_store, save_store, ConfigSummary, Error, Request};

/// Loads the store snapshot, builds services, runs `request` and saves the
/// snapshot again (also after a failed run, so partial progress is kept).
///
/// A failed run returns its own error; a snapshot that cannot be written is
/// then only logged. After a successful run the save error is returned.
pub async fn run_with_config(config: &RunConfig, request: Request) -> Result<StoryState, Error> {
    let store = Arc::new(InMemoryDocumentStore::default());
    if let Some(path) = &config.store_path {
        load_store(path, &store).await?;
    }
    let services = build_services(config, store.clone())?;
    if config.verbose {
        ConfigSummary::new(request.operation().name(), config, &services.truncator)
            .print_to_stderr();
    }

    let result = run_request(&services, config, &request).await;

    if let Some(path) = &config.store_path {
        if let Err(e) = save_store(path, &store).await {
            if result.is_ok() {
                return Err(e.into());
            }
            tracing::warn!(path = %path.display(), error = %e, "Could not save store snapshot");
        }
    }
    result
}

/// Assembles the request's graph (with node logging), seeds state and runs it.
///
/// With `config.stream`, node updates are printed to stderr as they complete.
/// Either way a failed run returns the graph's own `AgentError`.
pub async fn run_request(
    services: &Services,
    config: &RunConfig,
    request: &Request,
) -> Result<StoryState, Error> {
    let operation = request.operation();
    let compiled = operation.build(services)?.with_node_logging().compile()?;
    let state = request.seed(config.language);
    tracing::info!(
        operation = operation.name(),
        recursion_limit = config.recursion_limit,
        "Running workflow"
    );

    if !config.stream {
        return Ok(compiled.invoke(state, config.recursion_limit).await?);
    }

    let modes: HashSet<StreamMode> = [StreamMode::Updates].into_iter().collect();
    let (mut events, handle) = compiled.stream_with_result(state, config.recursion_limit, modes);
    while let Some(event) = events.next().await {
        match event {
            StreamEvent::Updates { node_id, .. } => eprintln!("[{}] done", node_id),
            StreamEvent::Values(_) => {}
            StreamEvent::Error { message } => eprintln!("[error] {}", message),
        }
    }
    let result = handle
        .await
        .map_err(|e| AgentError::ExecutionFailed(format!("graph task: {}", e)))?;
    Ok(result?)
}
