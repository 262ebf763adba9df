//! Document store seam: keyed documents with metadata and similarity search.
//!
//! Nodes read and write worlds, lores, characters and events through
//! `DocumentStore`. `InMemoryDocumentStore` is the bundled implementation;
//! remote stores plug in behind the same trait.

mod embedder;
mod error;
mod in_memory;

pub use embedder::{cosine_similarity, Embedder, HashingEmbedder};
pub use error::StoreError;
pub use in_memory::{CollectionDocument, InMemoryDocumentStore};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Document metadata: flat JSON object.
pub type Metadata = Map<String, Value>;

/// Collection names used by the story nodes.
pub mod collections {
    pub const WORLDS: &str = "worlds";
    pub const LORES: &str = "lores";
    pub const CHARACTERS: &str = "characters";
    pub const EVENTS: &str = "events";
    pub const MISC: &str = "misc";
}

/// One stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(alias = "page_content")]
    pub text: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Document {
    pub fn new(id: impl Into<String>, text: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            metadata,
        }
    }

    /// String metadata value for `key`, if present.
    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }
}

/// A document returned by `search` with its similarity score.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub document: Document,
    pub score: f32,
}

/// Metadata made of string pairs.
pub fn metadata(pairs: &[(&str, &str)]) -> Metadata {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
        .collect()
}

/// True when every `filter` entry equals the document's metadata entry.
pub fn matches_filter(metadata: &Metadata, filter: &Metadata) -> bool {
    filter.iter().all(|(k, v)| metadata.get(k) == Some(v))
}

/// Keyed document storage with metadata filters and similarity search.
///
/// **Interaction**: Injected into the existence, context, save and record
/// nodes through `workflows::Services`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Document `id` in `collection`, or `None`.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Every document whose metadata matches all `filter` entries, ordered by id.
    async fn find_by_metadata(
        &self,
        collection: &str,
        filter: &Metadata,
    ) -> Result<Vec<Document>, StoreError>;

    /// Up to `k` documents matching `filter`, most similar to `query` first.
    async fn search(
        &self,
        collection: &str,
        query: &str,
        filter: &Metadata,
        k: usize,
    ) -> Result<Vec<SearchHit>, StoreError>;

    /// Inserts or replaces `document` (keyed by its id).
    async fn add(&self, collection: &str, document: Document) -> Result<(), StoreError>;
}
