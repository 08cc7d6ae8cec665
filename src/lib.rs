// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vegetarian menu item classifier: keyword matching, RAG retrieval, and an
//! LLM oracle combined into one verdict per dish, with a confidence-gated
//! human review cycle.

pub mod api;
pub mod calculator;
pub mod classifier;
pub mod config;
pub mod embeddings;
pub mod kb;
pub mod review;
pub mod types;
pub mod vector;

use crate::classifier::LlmProvider;
use crate::config::Settings;
use crate::embeddings::EmbeddingGenerator;
use crate::kb::KnowledgeBase;
use crate::review::{FeedbackLog, ReviewStore};
use crate::vector::VectorStore;
use std::sync::Arc;

/// Everything a request handler needs, built once at startup and cloned
/// cheaply (an `Arc`) into every axum handler via `State`.
pub struct AppContext {
    pub settings: Settings,
    pub kb: &'static KnowledgeBase,
    pub embedder: &'static EmbeddingGenerator,
    pub vector_store: Arc<VectorStore>,
    pub llm_provider: Box<dyn LlmProvider>,
    pub review_store: ReviewStore,
    pub feedback_log: FeedbackLog,
}

impl AppContext {
    pub async fn build(settings: Settings) -> anyhow::Result<Self> {
        let kb = kb::knowledge_base();
        let embedder = embeddings::embedder();
        let vector_store = vector::vector_store(kb, embedder)?;
        let llm_provider = classifier::select_provider(&settings).await?;
        let feedback_log = FeedbackLog::new(settings.feedback_log_path.clone());

        Ok(Self {
            settings,
            kb,
            embedder,
            vector_store,
            llm_provider,
            review_store: ReviewStore::new(),
            feedback_log,
        })
    }
}
