//! Layout Composer — top-level entry tying splitter, packer and geometry together.
//!
//! Page assembly is strictly sequential (split in order, then pack in order). Geometry
//! is computed per displayed item and keyed by id; it does not depend on page order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::layout::adapter::normalize_items;
use crate::layout::geometry::{compute_overlay_params, compute_split_params, LayoutParams};
use crate::layout::packer::{pack_pages, Page, DEFAULT_PAGE_BUDGET};
use crate::layout::splitter::split_items;
use crate::models::ContentItem;

/// Longest body that still fits on one page, with or without an image.
pub const DEFAULT_SPLIT_LIMIT_CHARS: usize = 2800;

/// Type-label fragments that select a split (separated) layout.
const SPLIT_TYPE_MARKERS: &[&str] = &["SPLIT", "PRODUCT", "SEPARATED"];

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

/// Per-run composition limits, passed explicitly into every operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionConfig {
    /// Weight budget of a single page.
    pub page_budget: u32,
    /// Bodies longer than this (in chars) are split into continuation parts.
    pub split_limit_chars: usize,
}

impl Default for CompositionConfig {
    fn default() -> Self {
        Self {
            page_budget: DEFAULT_PAGE_BUDGET,
            split_limit_chars: DEFAULT_SPLIT_LIMIT_CHARS,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Output
// ────────────────────────────────────────────────────────────────────────────

/// Full composition result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    pub pages: Vec<Page>,
    /// Placement for every displayed item that carries an image, keyed by item id.
    pub layout_params: BTreeMap<String, LayoutParams>,
    /// Input entries dropped as malformed.
    pub skipped: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Public API
// ────────────────────────────────────────────────────────────────────────────

/// Splits over-length items, then packs the result into pages.
pub fn paginate(items: &[ContentItem], config: &CompositionConfig) -> Vec<Page> {
    let expanded = split_items(items, config.split_limit_chars);
    pack_pages(&expanded, config.page_budget)
}

/// Placement for one displayed item, or `None` when it renders text-only.
///
/// Items go to a split layout when their layout mode is `separated` or their type label
/// names a split/product/separated layout; everything else overlays text on the image.
pub fn compute_layout_params(item: &ContentItem) -> Option<LayoutParams> {
    if !item.has_image || item.is_continuation() {
        return None;
    }

    let params = if wants_split_layout(item) {
        LayoutParams::Split(compute_split_params(
            &item.layout_type,
            &item.visual_weight_hint,
            item.image_meta.resolved_aspect_ratio(),
        ))
    } else {
        LayoutParams::Overlay(compute_overlay_params(
            &item.bounding_boxes,
            item.image_meta.width,
            item.image_meta.height,
        ))
    };
    Some(params)
}

/// Placement for every displayed (post-split) item.
pub fn layout_params(
    items: &[ContentItem],
    config: &CompositionConfig,
) -> BTreeMap<String, LayoutParams> {
    params_by_id(&split_items(items, config.split_limit_chars))
}

/// Pages plus per-item placement from one split pass.
pub fn compose(items: &[ContentItem], config: &CompositionConfig) -> Composition {
    let expanded = split_items(items, config.split_limit_chars);
    let layout_params = params_by_id(&expanded);
    let pages = pack_pages(&expanded, config.page_budget);

    Composition {
        pages,
        layout_params,
        skipped: 0,
    }
}

/// [`compose`] over a raw JSON payload. Non-collections compose to nothing.
pub fn compose_value(raw: &Value, config: &CompositionConfig) -> Composition {
    let normalized = normalize_items(raw);
    Composition {
        skipped: normalized.skipped,
        ..compose(&normalized.items, config)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

fn wants_split_layout(item: &ContentItem) -> bool {
    let separated = item
        .layout_mode
        .as_deref()
        .is_some_and(|mode| mode.trim().eq_ignore_ascii_case("separated"));
    let label = item.layout_type.to_uppercase();

    separated || SPLIT_TYPE_MARKERS.iter().any(|m| label.contains(m))
}

fn params_by_id(items: &[ContentItem]) -> BTreeMap<String, LayoutParams> {
    items
        .iter()
        .filter_map(|item| compute_layout_params(item).map(|p| (item.id.clone(), p)))
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
