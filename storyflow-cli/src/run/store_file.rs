//! JSON snapshot of the in-memory document store, kept between CLI runs.

use std::path::Path;

use storyflow::store::CollectionDocument;
use storyflow::{InMemoryDocumentStore, StoreError};

/// Loads `path` into `store`. A missing file leaves the store empty.
pub async fn load_store(path: &Path, store: &InMemoryDocumentStore) -> Result<(), StoreError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(StoreError::Backend(format!("{}: {}", path.display(), e))),
    };
    let docs: Vec<CollectionDocument> = serde_json::from_slice(&bytes)?;
    tracing::debug!(path = %path.display(), documents = docs.len(), "Loaded store snapshot");
    store.import(docs)
}

/// Writes every document in `store` to `path` as pretty JSON.
pub async fn save_store(path: &Path, store: &InMemoryDocumentStore) -> Result<(), StoreError> {
    let docs = store.export();
    let json = serde_json::to_vec_pretty(&docs)?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| StoreError::Backend(format!("{}: {}", path.display(), e)))?;
    tracing::debug!(path = %path.display(), documents = docs.len(), "Saved store snapshot");
    Ok(())
}
