// SPDX-License-Identifier: BUSL-1.1
//! Shared data-model types threaded between the classifier, calculator,
//! review, and api modules.

use serde::{Deserialize, Serialize};

/// A raw menu item as handed to the classifier (post OCR/parse, out of
/// scope here).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    pub name: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_image: Option<u32>,
}

/// Which classification method ultimately decided an item, and what the
/// other tiers said along the way.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    Keyword,
    Rag,
    Llm,
    Combined,
    Error,
}

/// The outcome of a single tier (keyword, RAG, or LLM) for one item.
/// `is_vegetarian: None` means "this tier has no opinion", never
/// "non-vegetarian".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierResult {
    pub is_vegetarian: Option<bool>,
    pub confidence: f32,
    pub reasoning: String,
    #[serde(default)]
    pub evidence: Vec<String>,
}

impl TierResult {
    pub fn none() -> Self {
        Self {
            is_vegetarian: None,
            confidence: 0.0,
            reasoning: String::new(),
            evidence: Vec::new(),
        }
    }

    pub fn error(reason: impl Into<String>) -> Self {
        Self {
            is_vegetarian: None,
            confidence: 0.0,
            reasoning: reason.into(),
            evidence: Vec::new(),
        }
    }
}

/// A fully classified item: the final verdict plus enough provenance to
/// explain it and to drive the HITL review UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedItem {
    pub name: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_image: Option<u32>,
    pub is_vegetarian: Option<bool>,
    pub confidence: f32,
    pub method: Method,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub evidence: Vec<String>,
    #[serde(default)]
    pub related_ingredients: Vec<String>,
    #[serde(default)]
    pub fallback_chain: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub currency: String,
}

/// An item too uncertain to auto-bucket, surfaced for human review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UncertainItem {
    pub name: String,
    pub price: f64,
    pub confidence: f32,
    #[serde(default)]
    pub evidence: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_classification: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_image: Option<u32>,
}

/// A human correction submitted against a pending review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Correction {
    pub name: String,
    pub is_vegetarian: bool,
}

/// A pending review, keyed by request id, held in the `ReviewStore` until
/// corrections are submitted or it is cleared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub request_id: String,
    pub all_items: Vec<ClassifiedItem>,
}

/// One line of the append-only feedback log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub timestamp: String,
    pub request_id: String,
    pub dish_name: String,
    pub human_label: bool,
    pub feedback_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DishFeedbackStats {
    pub veg_count: usize,
    pub non_veg_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackStats {
    pub total_corrections: usize,
    pub unique_dishes: usize,
    pub dish_stats: std::collections::HashMap<String, DishFeedbackStats>,
    pub recent_feedback: Vec<FeedbackRecord>,
}
