// SPDX-License-Identifier: BUSL-1.1
//! RAG vector store over the embedded knowledge base.
//!
//! Wraps an `hnsw_rs` cosine index the same way the teacher's
//! `vector::hnsw::HnswIndex` does, but built once from the knowledge base
//! rather than from externally supplied vectors.

use crate::embeddings::EmbeddingGenerator;
use crate::kb::{EntryKind, KnowledgeBase};
use anyhow::{anyhow, Result};
use hnsw_rs::hnsw::{Hnsw, Neighbour};
use hnsw_rs::prelude::*;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// A knowledge base entry as embedded text, ready for indexing.
#[derive(Debug, Clone)]
pub struct EmbeddedDocument {
    pub id: String,
    pub name: String,
    pub is_vegetarian: bool,
    pub category: String,
    pub kind: EntryKind,
    pub document: String,
}

/// A single RAG retrieval hit.
#[derive(Debug, Clone)]
pub struct RagHit {
    pub id: String,
    pub name: String,
    pub is_vegetarian: bool,
    pub category: String,
    pub kind: EntryKind,
    pub document: String,
    /// `1 - cosine distance`, clamped to `[0, 1]`.
    pub relevance: f32,
}

pub struct VectorStore {
    hnsw: Hnsw<'static, f32, DistCosine>,
    docs: HashMap<usize, EmbeddedDocument>,
    dimensions: usize,
}

impl VectorStore {
    /// Embed every KB entry and build the HNSW index. Entries without a
    /// vegetarian label are never indexed.
    pub fn build(kb: &KnowledgeBase, embedder: &EmbeddingGenerator) -> Result<Self> {
        let entries: Vec<_> = kb.entries().collect();
        let dimensions = embedder.dimension();

        if entries.is_empty() {
            return Ok(Self {
                hnsw: Hnsw::new(16, 0, 16, 200, DistCosine),
                docs: HashMap::new(),
                dimensions,
            });
        }

        let max_nb_connection = 12;
        let ef_construction = 48;
        let nb_layer = ((entries.len() as f32).log2().ceil() as usize).clamp(4, 16);

        let mut hnsw: Hnsw<f32, DistCosine> =
            Hnsw::new(max_nb_connection, nb_layer, ef_construction, entries.len(), DistCosine);
        let mut docs = HashMap::with_capacity(entries.len());

        for (hnsw_id, entry) in entries.into_iter().enumerate() {
            let document = entry.document();
            let embedding = embedder.generate(&document);
            if embedding.len() != dimensions {
                return Err(anyhow!(
                    "embedding dimension mismatch: expected {}, got {}",
                    dimensions,
                    embedding.len()
                ));
            }
            hnsw.insert((&embedding, hnsw_id));
            docs.insert(
                hnsw_id,
                EmbeddedDocument {
                    id: entry.id(),
                    name: entry.name.to_string(),
                    is_vegetarian: entry.is_vegetarian,
                    category: entry.category.to_string(),
                    kind: entry.kind,
                    document,
                },
            );
        }
        hnsw.set_searching_mode(true);

        Ok(Self { hnsw, docs, dimensions })
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Embed `query` and return up to `k` hits, sorted by descending relevance.
    pub fn search(&self, query: &str, k: usize, embedder: &EmbeddingGenerator) -> Vec<RagHit> {
        if self.docs.is_empty() || k == 0 {
            return Vec::new();
        }
        let embedding = embedder.generate(query);
        let ef_search = (k * 2).max(24);
        let neighbours: Vec<Neighbour> = self.hnsw.search(&embedding, k, ef_search);

        let mut hits: Vec<RagHit> = neighbours
            .into_iter()
            .filter_map(|n| {
                let doc = self.docs.get(&n.d_id)?;
                let relevance = (1.0 - n.distance).clamp(0.0, 1.0);
                Some(RagHit {
                    id: doc.id.clone(),
                    name: doc.name.clone(),
                    is_vegetarian: doc.is_vegetarian,
                    category: doc.category.clone(),
                    kind: doc.kind,
                    document: doc.document.clone(),
                    relevance,
                })
            })
            .collect();

        hits.sort_by(|a, b| b.relevance.partial_cmp(&a.relevance).unwrap_or(std::cmp::Ordering::Equal));
        hits
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}

static STORE: OnceLock<Arc<VectorStore>> = OnceLock::new();

/// Build (once) and return the process-wide vector store over the
/// knowledge base. Subsequent calls are a no-op lookup.
pub fn vector_store(kb: &KnowledgeBase, embedder: &EmbeddingGenerator) -> Result<Arc<VectorStore>> {
    if let Some(store) = STORE.get() {
        return Ok(store.clone());
    }
    let built = Arc::new(VectorStore::build(kb, embedder)?);
    Ok(STORE.get_or_init(|| built).clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::EmbeddingConfig;
    use crate::kb::knowledge_base;

    #[test]
    fn build_indexes_every_kb_entry() {
        let kb = knowledge_base();
        let embedder = EmbeddingGenerator::new(EmbeddingConfig::default());
        let store = VectorStore::build(kb, &embedder).unwrap();
        assert_eq!(store.len(), kb.ingredients.len() + kb.dishes.len());
    }

    #[test]
    fn search_returns_relevant_hits_for_known_term() {
        let kb = knowledge_base();
        let embedder = EmbeddingGenerator::new(EmbeddingConfig::default());
        let store = VectorStore::build(kb, &embedder).unwrap();
        let hits = store.search("tofu", 5, &embedder);
        assert!(!hits.is_empty());
        assert!(hits.iter().all(|h| h.relevance >= 0.0 && h.relevance <= 1.0));
    }

    #[test]
    fn search_on_empty_store_returns_empty() {
        let embedder = EmbeddingGenerator::new(EmbeddingConfig::default());
        let store = VectorStore {
            hnsw: Hnsw::new(16, 0, 16, 200, DistCosine),
            docs: HashMap::new(),
            dimensions: embedder.dimension(),
        };
        assert!(store.search("anything", 5, &embedder).is_empty());
    }
}
