// SPDX-License-Identifier: BUSL-1.1
//! The axum router. Grounded on the teacher's `api::handlers` wiring and
//! the original FastAPI routes in `mcp/main.py`.

use crate::api::errors::ApiError;
use crate::api::handlers::{
    ClassifyRequest, ClassifyResponse, CorrectionsRequest, CorrectionsResponse, HealthResponse,
    ParseAssistRequest, ParseAssistResponse, SearchHitDto, SearchQuery, SearchResponse,
};
use crate::calculator;
use crate::classifier;
use crate::classifier::LlmProvider;
use crate::types::FeedbackRecord;
use crate::AppContext;
use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn build_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/classify", post(classify))
        .route("/corrections", post(corrections))
        .route("/search", get(search))
        .route("/parse-assist", post(parse_assist))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn classify(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<ClassifyRequest>,
) -> Result<Json<ClassifyResponse>, ApiError> {
    body.validate()?;

    let outcome = classifier::execute(
        &body.items,
        ctx.kb,
        &ctx.vector_store,
        ctx.embedder,
        ctx.llm_provider.as_ref(),
        &ctx.settings,
    )
    .await;

    let request_id = uuid::Uuid::new_v4().to_string();

    if outcome.uncertain_items.is_empty() {
        let calc = calculator::total(&outcome.all_items);
        tracing::info!(request_id = %request_id, item_count = calc.item_count, "classification complete");
        Ok(Json(ClassifyResponse::Success {
            request_id,
            vegetarian_items: outcome.all_items.iter().filter(|i| i.is_vegetarian == Some(true)).cloned().collect(),
            total_sum: calc.total_sum,
            all_items: outcome.all_items,
        }))
    } else {
        let partial = calculator::total(&outcome.confident_items);
        ctx.review_store.store(request_id.clone(), outcome.all_items.clone());
        tracing::info!(request_id = %request_id, uncertain_count = outcome.uncertain_items.len(), "classification needs review");
        Ok(Json(ClassifyResponse::NeedsReview {
            request_id,
            message: "Some items could not be confidently classified; human review required".to_string(),
            uncertain_items: outcome.uncertain_items,
            confident_items: outcome.confident_items,
            partial_sum: partial.total_sum,
            all_items: outcome.all_items,
        }))
    }
}

async fn corrections(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<CorrectionsRequest>,
) -> Result<Json<CorrectionsResponse>, ApiError> {
    body.validate()?;

    let record = ctx
        .review_store
        .get(&body.request_id)
        .ok_or_else(|| ApiError::NotFound(format!("no pending review for request_id {}", body.request_id)))?;

    let recomputed = calculator::recompute_with_corrections(&record.all_items, &body.corrections);

    let timestamp = chrono::Utc::now().to_rfc3339();
    for correction in &body.corrections {
        ctx.feedback_log
            .append(FeedbackRecord {
                timestamp: timestamp.clone(),
                request_id: body.request_id.clone(),
                dish_name: correction.name.clone(),
                human_label: correction.is_vegetarian,
                feedback_type: "hitl_correction".to_string(),
            })
            .await;
    }

    ctx.review_store.clear(&body.request_id);

    Ok(Json(CorrectionsResponse {
        request_id: body.request_id,
        vegetarian_items: recomputed.vegetarian_items,
        total_sum: recomputed.total_sum,
        applied_corrections: recomputed.corrections_applied,
    }))
}

async fn search(State(ctx): State<Arc<AppContext>>, Query(q): Query<SearchQuery>) -> Json<SearchResponse> {
    let k = q.top_k.unwrap_or(ctx.settings.rag_top_k);
    let hits = ctx.vector_store.search(&q.query, k, ctx.embedder);
    Json(SearchResponse { results: hits.iter().map(SearchHitDto::from).collect() })
}

async fn parse_assist(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<ParseAssistRequest>,
) -> Result<Json<ParseAssistResponse>, ApiError> {
    let content = ctx
        .llm_provider
        .generate("You are a helpful assistant for menu parsing.", &body.prompt)
        .await
        .map_err(|e| ApiError::InternalError(e.to_string()))?;
    Ok(Json(ParseAssistResponse { content }))
}

async fn health(State(ctx): State<Arc<AppContext>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        kb_ingredient_count: ctx.kb.ingredients.len(),
        kb_dish_count: ctx.kb.dishes.len(),
        vector_store_size: ctx.vector_store.len(),
        llm_provider: ctx.llm_provider.name(),
    })
}
