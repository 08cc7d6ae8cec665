// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use std::sync::Arc;
use tokio::signal;
use veggie_menu_classifier::classifier::LlmProvider;
use veggie_menu_classifier::config::get_settings;
use veggie_menu_classifier::{api, AppContext};

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let settings = get_settings().clone();
    tracing::info!(
        provider = ?settings.llm_provider,
        confidence_threshold = settings.confidence_threshold,
        hitl_threshold = settings.hitl_threshold,
        batch_enabled = settings.llm_batch_enabled,
        "resolved settings"
    );

    let ctx = AppContext::build(settings).await?;
    tracing::info!(
        ingredients = ctx.kb.ingredients.len(),
        dishes = ctx.kb.dishes.len(),
        vector_store_size = ctx.vector_store.len(),
        llm_provider = ctx.llm_provider.name(),
        "application context ready"
    );

    let addr = format!("{}:{}", ctx.settings.api_host, ctx.settings.api_port);
    let ctx = Arc::new(ctx);
    let app = api::build_router(ctx);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    tracing::info!("ctrl-c received, shutting down");
}
