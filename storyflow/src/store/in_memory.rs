use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use super::embedder::{cosine_similarity, Embedder, HashingEmbedder};
use super::{matches_filter, Document, DocumentStore, Metadata, SearchHit, StoreError};

/// Pure in-memory document store with semantic search.
///
/// Collections are created on first write. Vectors are computed on `add`
/// with the configured `Embedder`.
///
/// **In-Memory**: All data stored in memory, lost when store is dropped.
pub struct InMemoryDocumentStore {
    data: DashMap<(String, String), Entry>,
    embedder: Arc<dyn Embedder>,
}

/// A document together with its collection; the unit of `export` / `import`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionDocument {
    pub collection: String,
    pub document: Document,
}

#[derive(Clone)]
struct Entry {
    vector: Vec<f32>,
    document: Document,
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new(Arc::new(HashingEmbedder::default()))
    }
}

impl InMemoryDocumentStore {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            data: DashMap::new(),
            embedder,
        }
    }

    /// Number of documents in `collection`.
    pub fn len(&self, collection: &str) -> usize {
        self.data.iter().filter(|e| e.key().0 == collection).count()
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    /// Every stored document, ordered by collection then id.
    pub fn export(&self) -> Vec<CollectionDocument> {
        let mut docs: Vec<CollectionDocument> = self
            .data
            .iter()
            .map(|e| CollectionDocument {
                collection: e.key().0.clone(),
                document: e.document.clone(),
            })
            .collect();
        docs.sort_by(|a, b| {
            a.collection
                .cmp(&b.collection)
                .then_with(|| a.document.id.cmp(&b.document.id))
        });
        docs
    }

    /// Inserts `docs`, re-embedding each one. Existing ids are replaced.
    pub fn import(&self, docs: Vec<CollectionDocument>) -> Result<(), StoreError> {
        for CollectionDocument {
            collection,
            document,
        } in docs
        {
            let vector = self.embed_one(&document.text)?;
            self.data
                .insert((collection, document.id.clone()), Entry { vector, document });
        }
        Ok(())
    }

    fn embed_one(&self, text: &str) -> Result<Vec<f32>, StoreError> {
        self.embedder
            .embed(&[text])?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Embedding("No vector returned".into()))
    }

    fn matching(&self, collection: &str, filter: &Metadata) -> Vec<Entry> {
        self.data
            .iter()
            .filter(|e| e.key().0 == collection && matches_filter(&e.document.metadata, filter))
            .map(|e| e.value().clone())
            .collect()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let key = (collection.to_string(), id.to_string());
        Ok(self.data.get(&key).map(|e| e.document.clone()))
    }

    async fn find_by_metadata(
        &self,
        collection: &str,
        filter: &Metadata,
    ) -> Result<Vec<Document>, StoreError> {
        let mut docs: Vec<Document> = self
            .matching(collection, filter)
            .into_iter()
            .map(|e| e.document)
            .collect();
        docs.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(docs)
    }

    async fn search(
        &self,
        collection: &str,
        query: &str,
        filter: &Metadata,
        k: usize,
    ) -> Result<Vec<SearchHit>, StoreError> {
        let query_vec = self.embed_one(query)?;
        let mut hits: Vec<SearchHit> = self
            .matching(collection, filter)
            .into_iter()
            .map(|e| SearchHit {
                score: cosine_similarity(&query_vec, &e.vector),
                document: e.document,
            })
            .collect();
        hits.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.document.id.cmp(&b.document.id))
        });
        hits.truncate(k);
        Ok(hits)
    }

    async fn add(&self, collection: &str, document: Document) -> Result<(), StoreError> {
        let vector = self.embed_one(&document.text)?;
        self.data.insert(
            (collection.to_string(), document.id.clone()),
            Entry { vector, document },
        );
        Ok(())
    }
}
