// SPDX-License-Identifier: BUSL-1.1
//! Black-box tests against the axum router, in the teacher's
//! `tests/api_tests.rs` style: build a request, drive it through the
//! router with `tower::ServiceExt::oneshot`, assert on the response.

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use veggie_menu_classifier::classifier::LlmProvider;
use veggie_menu_classifier::config::Settings;
use veggie_menu_classifier::review::{FeedbackLog, ReviewStore};
use veggie_menu_classifier::types::ClassifiedItem;
use veggie_menu_classifier::{api, embeddings, kb, vector, AppContext};

struct MockProvider;

#[async_trait]
impl LlmProvider for MockProvider {
    async fn generate(&self, _system_prompt: &str, _user_prompt: &str) -> anyhow::Result<String> {
        Ok(r#"{"is_vegetarian": true, "confidence": 0.5, "reasoning": "mock verdict"}"#.to_string())
    }

    async fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

async fn test_ctx() -> Arc<AppContext> {
    let settings = Settings::default();
    let kb = kb::knowledge_base();
    let embedder = embeddings::embedder();
    let vector_store = vector::vector_store(kb, embedder).unwrap();

    Arc::new(AppContext {
        settings,
        kb,
        embedder,
        vector_store,
        llm_provider: Box::new(MockProvider),
        review_store: ReviewStore::new(),
        feedback_log: FeedbackLog::new(std::env::temp_dir().join("test_hitl_feedback.jsonl").to_string_lossy().to_string()),
    })
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_kb_and_store_sizes() {
    let ctx = test_ctx().await;
    let app = api::build_router(ctx);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert!(body["kb_ingredient_count"].as_u64().unwrap() > 0);
    assert!(body["kb_dish_count"].as_u64().unwrap() > 0);
    assert_eq!(body["llm_provider"], "mock");
}

#[tokio::test]
async fn classify_rejects_empty_item_list() {
    let ctx = test_ctx().await;
    let app = api::build_router(ctx);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/classify")
                .header("content-type", "application/json")
                .body(Body::from(json!({"items": []}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn classify_marker_item_is_confidently_vegetarian() {
    let ctx = test_ctx().await;
    let app = api::build_router(ctx);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/classify")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({"items": [{"name": "Vegetable Curry (v)", "price": 11.5}]}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["total_sum"], 11.5);
    assert_eq!(body["all_items"][0]["is_vegetarian"], true);
    assert_eq!(body["all_items"][0]["method"], "keyword");
}

#[tokio::test]
async fn search_returns_bounded_relevant_hits() {
    let ctx = test_ctx().await;
    let app = api::build_router(ctx);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/search?query=tofu&top_k=3")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let results = body["results"].as_array().unwrap();
    assert!(results.len() <= 3);
    for hit in results {
        let relevance = hit["relevance"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&relevance));
    }
}

#[tokio::test]
async fn corrections_round_trip_recomputes_total_and_clears_review() {
    let ctx = test_ctx().await;

    let pending = vec![ClassifiedItem {
        name: "Chef's Surprise".to_string(),
        price: 14.0,
        source_image: None,
        is_vegetarian: None,
        confidence: 0.2,
        method: veggie_menu_classifier::types::Method::Error,
        reasoning: None,
        evidence: vec![],
        related_ingredients: vec![],
        fallback_chain: vec![],
        category: None,
        currency: "USD".into(),
    }];
    ctx.review_store.store("req-test-1", pending);

    let app = api::build_router(ctx.clone());
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/corrections")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({
                        "request_id": "req-test-1",
                        "corrections": [{"name": "chef's surprise", "is_vegetarian": true}]
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["request_id"], "req-test-1");
    assert_eq!(body["total_sum"], 14.0);
    assert_eq!(body["applied_corrections"], 1);
    assert!(ctx.review_store.get("req-test-1").is_none());
}

#[tokio::test]
async fn corrections_on_unknown_request_id_is_not_found() {
    let ctx = test_ctx().await;
    let app = api::build_router(ctx);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/corrections")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({"request_id": "does-not-exist", "corrections": [{"name": "x", "is_vegetarian": true}]}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
