// SPDX-License-Identifier: BUSL-1.1
//! The tiered classifier: keyword matching, RAG retrieval, and an LLM
//! oracle, combined into one verdict per dish.

pub mod engine;
pub mod keyword;
pub mod llm;
pub mod tool;

pub use engine::{classify_single, combine_results, EngineOutcome};
pub use llm::{select_provider, LlmProvider};
pub use tool::{execute, ExecuteOutcome};
