// SPDX-License-Identifier: BUSL-1.1
//! Request/response DTOs and their validation. Grounded on the teacher's
//! `api::handlers::InferenceRequest::validate` pattern and the original
//! `api/schemas/menu.py` Pydantic models.

use crate::api::errors::ApiError;
use crate::types::{ClassifiedItem, Correction, MenuItem, UncertainItem};
use crate::vector::RagHit;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    pub items: Vec<MenuItem>,
}

impl ClassifyRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.items.is_empty() {
            return Err(ApiError::ValidationError {
                field: "items".to_string(),
                message: "at least one menu item is required".to_string(),
            });
        }
        for (idx, item) in self.items.iter().enumerate() {
            if item.name.trim().is_empty() {
                return Err(ApiError::ValidationError {
                    field: format!("items[{idx}].name"),
                    message: "dish name must not be empty".to_string(),
                });
            }
            if !item.price.is_finite() {
                return Err(ApiError::ValidationError {
                    field: format!("items[{idx}].price"),
                    message: "price must be a finite number".to_string(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "status")]
pub enum ClassifyResponse {
    #[serde(rename = "success")]
    Success {
        request_id: String,
        vegetarian_items: Vec<ClassifiedItem>,
        total_sum: f64,
        all_items: Vec<ClassifiedItem>,
    },
    #[serde(rename = "needs_review")]
    NeedsReview {
        request_id: String,
        message: String,
        uncertain_items: Vec<UncertainItem>,
        confident_items: Vec<ClassifiedItem>,
        partial_sum: f64,
        all_items: Vec<ClassifiedItem>,
    },
}

#[derive(Debug, Deserialize)]
pub struct CorrectionsRequest {
    pub request_id: String,
    pub corrections: Vec<Correction>,
}

impl CorrectionsRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.request_id.trim().is_empty() {
            return Err(ApiError::ValidationError {
                field: "request_id".to_string(),
                message: "request_id must not be empty".to_string(),
            });
        }
        if self.corrections.is_empty() {
            return Err(ApiError::ValidationError {
                field: "corrections".to_string(),
                message: "at least one correction is required".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct CorrectionsResponse {
    pub request_id: String,
    pub vegetarian_items: Vec<ClassifiedItem>,
    pub total_sum: f64,
    pub applied_corrections: usize,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: String,
    pub top_k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchHitDto {
    pub name: String,
    pub is_vegetarian: bool,
    pub category: String,
    pub relevance: f32,
}

impl From<&RagHit> for SearchHitDto {
    fn from(hit: &RagHit) -> Self {
        Self {
            name: hit.name.clone(),
            is_vegetarian: hit.is_vegetarian,
            category: hit.category.clone(),
            relevance: hit.relevance,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchHitDto>,
}

#[derive(Debug, Deserialize)]
pub struct ParseAssistRequest {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct ParseAssistResponse {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub kb_ingredient_count: usize,
    pub kb_dish_count: usize,
    pub vector_store_size: usize,
    pub llm_provider: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_item_list() {
        let req = ClassifyRequest { items: vec![] };
        assert!(req.validate().is_err());
    }

    #[test]
    fn rejects_blank_item_name() {
        let req = ClassifyRequest {
            items: vec![MenuItem { name: "  ".into(), price: 5.0, source_image: None }],
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn accepts_well_formed_request() {
        let req = ClassifyRequest {
            items: vec![MenuItem { name: "Margherita Pizza".into(), price: 12.0, source_image: None }],
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn corrections_request_requires_nonempty_list() {
        let req = CorrectionsRequest { request_id: "r1".into(), corrections: vec![] };
        assert!(req.validate().is_err());
    }
}
