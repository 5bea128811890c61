//! Axum route handlers for the Layout API.

use std::collections::BTreeMap;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;
use crate::layout::adapter::normalize_items;
use crate::layout::composer::{self, Composition, CompositionConfig};
use crate::layout::geometry::LayoutParams;
use crate::layout::packer::Page;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LayoutRequest {
    /// List, id-keyed map, or single record. Anything else composes to nothing.
    #[serde(default)]
    pub items: Value,
    pub page_budget: Option<u32>,
    pub split_limit_chars: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct PaginateResponse {
    pub pages: Vec<Page>,
    pub skipped: usize,
}

#[derive(Debug, Serialize)]
pub struct LayoutParamsResponse {
    pub layout_params: BTreeMap<String, LayoutParams>,
    pub skipped: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/layout/compose
///
/// Splits, paginates and computes placement for every displayed item.
pub async fn handle_compose(
    State(state): State<AppState>,
    Json(request): Json<LayoutRequest>,
) -> Result<Json<Composition>, AppError> {
    let config = resolve_config(&state.composition, &request)?;
    let items = request.items;

    let composition = run_blocking(move || composer::compose_value(&items, &config)).await?;
    Ok(Json(composition))
}

/// POST /api/v1/layout/paginate
///
/// Pages only: split over-length items, then pack in order.
pub async fn handle_paginate(
    State(state): State<AppState>,
    Json(request): Json<LayoutRequest>,
) -> Result<Json<PaginateResponse>, AppError> {
    let config = resolve_config(&state.composition, &request)?;
    let items = request.items;

    let response = run_blocking(move || {
        let normalized = normalize_items(&items);
        PaginateResponse {
            pages: composer::paginate(&normalized.items, &config),
            skipped: normalized.skipped,
        }
    })
    .await?;
    Ok(Json(response))
}

/// POST /api/v1/layout/params
///
/// Split/overlay placement for each displayed item, keyed by (post-split) id.
pub async fn handle_layout_params(
    State(state): State<AppState>,
    Json(request): Json<LayoutRequest>,
) -> Result<Json<LayoutParamsResponse>, AppError> {
    let config = resolve_config(&state.composition, &request)?;
    let items = request.items;

    let response = run_blocking(move || {
        let normalized = normalize_items(&items);
        LayoutParamsResponse {
            layout_params: composer::layout_params(&normalized.items, &config),
            skipped: normalized.skipped,
        }
    })
    .await?;
    Ok(Json(response))
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

/// Applies per-request overrides on top of the service defaults.
fn resolve_config(
    base: &CompositionConfig,
    request: &LayoutRequest,
) -> Result<CompositionConfig, AppError> {
    let page_budget = request.page_budget.unwrap_or(base.page_budget);
    if page_budget == 0 {
        return Err(AppError::Validation(
            "page_budget must be greater than 0".to_string(),
        ));
    }

    let split_limit_chars = request.split_limit_chars.unwrap_or(base.split_limit_chars);
    if split_limit_chars == 0 {
        return Err(AppError::Validation(
            "split_limit_chars must be greater than 0".to_string(),
        ));
    }

    Ok(CompositionConfig {
        page_budget,
        split_limit_chars,
    })
}

/// Composition is CPU-bound; keep it off the async executor.
async fn run_blocking<T, F>(work: F) -> Result<T, AppError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in layout: {e}")))
}
