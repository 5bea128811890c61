//! Page Bin Packer — groups items into pages under a per-page weight budget.
//!
//! # Weight
//! `weight = (image ? 50 : 0) + min(80, ceil(chars / 20))`, clamped to the page budget so
//! an oversized item still lands on a page of its own.
//!
//! # Packing
//! First-fit in input order: items are never reordered, because continuation parts must
//! stay adjacent to the part before them. Minimal page count is not a goal.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::ContentItem;

pub const DEFAULT_PAGE_BUDGET: u32 = 100;

const IMAGE_WEIGHT: u32 = 50;
const TEXT_WEIGHT_CAP: u32 = 80;
const CHARS_PER_WEIGHT_POINT: usize = 20;

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// Page template hint, chosen purely by item count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutHint {
    #[serde(rename = "hero_single")]
    HeroSingle,
    #[serde(rename = "split_half")]
    SplitHalf,
    #[serde(rename = "magazine_grid_3")]
    MagazineGrid3,
    #[serde(rename = "multi_column_list")]
    MultiColumnList,
}

impl LayoutHint {
    pub fn for_count(count: usize) -> Self {
        match count {
            0 | 1 => LayoutHint::HeroSingle,
            2 => LayoutHint::SplitHalf,
            3 => LayoutHint::MagazineGrid3,
            _ => LayoutHint::MultiColumnList,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutHint::HeroSingle => "hero_single",
            LayoutHint::SplitHalf => "split_half",
            LayoutHint::MagazineGrid3 => "magazine_grid_3",
            LayoutHint::MultiColumnList => "multi_column_list",
        }
    }
}

/// One finished page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub items: Vec<ContentItem>,
    pub item_count: usize,
    pub layout_hint: LayoutHint,
    /// Sum of (clamped) item weights on this page.
    pub total_weight: u32,
}

impl Page {
    fn from_items(items: Vec<ContentItem>, total_weight: u32) -> Self {
        let item_count = items.len();
        Self {
            items,
            item_count,
            layout_hint: LayoutHint::for_count(item_count),
            total_weight,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Core functions
// ────────────────────────────────────────────────────────────────────────────

/// Weight of a single item, clamped to `page_budget`.
pub fn item_weight(item: &ContentItem, page_budget: u32) -> u32 {
    let image_score = if item.has_image { IMAGE_WEIGHT } else { 0 };
    let text_points = item.text_len().div_ceil(CHARS_PER_WEIGHT_POINT);
    let text_score = u32::try_from(text_points)
        .unwrap_or(u32::MAX)
        .min(TEXT_WEIGHT_CAP);

    (image_score + text_score).min(page_budget)
}

/// Packs items first-fit in order. An empty input yields no pages.
pub fn pack_pages(items: &[ContentItem], page_budget: u32) -> Vec<Page> {
    let mut pages = Vec::new();
    let mut current: Vec<ContentItem> = Vec::new();
    let mut current_weight = 0u32;

    for item in items {
        let weight = item_weight(item, page_budget);

        if current_weight + weight > page_budget {
            if !current.is_empty() {
                let page = Page::from_items(std::mem::take(&mut current), current_weight);
                debug!(
                    page = pages.len() + 1,
                    items = page.item_count,
                    weight = page.total_weight,
                    hint = page.layout_hint.as_str(),
                    "Closing page"
                );
                pages.push(page);
            }
            current.push(item.clone());
            current_weight = weight;
        } else {
            current.push(item.clone());
            current_weight += weight;
        }
    }

    if !current.is_empty() {
        pages.push(Page::from_items(current, current_weight));
    }

    pages
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
