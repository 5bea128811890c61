//! Text Splitter — breaks over-length articles into balanced continuation parts.
//!
//! # Balancing
//! An article of `len` characters over the limit is cut into
//! `parts = ceil(len / limit)` chunks of roughly `ceil(len / parts)` characters, so the
//! last page is not left with a sliver of text. Each cut snaps to the last `.` within
//! 100 characters past the tentative end, but only if that full stop lies beyond 70% of
//! the ideal chunk (otherwise the cut is hard).
//!
//! # Continuation parts
//! The first part keeps masthead and image. Later parts drop image, vision metadata,
//! headline and subhead, get " (Continued)" appended to the title and are forced to a
//! text-only layout.

use std::collections::HashSet;

use tracing::info;

use crate::layout::adapter::claim_unique_id;
use crate::models::{ContentItem, ImageMeta, SplitSegment};

pub const CONTINUED_SUFFIX: &str = " (Continued)";

/// Layout override the renderer uses for continuation parts.
pub const TEXT_ONLY_OVERRIDE: &str = "editorial_text_only";

/// How far past the tentative cut to look for a sentence end.
const SENTENCE_SEARCH_WINDOW: usize = 100;

/// A full stop must lie beyond this fraction of the ideal chunk to be snapped to.
const SENTENCE_SNAP_MIN_FRACTION: f64 = 0.7;

// ────────────────────────────────────────────────────────────────────────────
// Public API
// ────────────────────────────────────────────────────────────────────────────

/// Splits one item. Returns the item unchanged (as a single-element vec) when its body
/// fits within `limit_chars`; otherwise one item per part with ids `{id}_part{n}`.
///
/// A `limit_chars` of 0 is treated as 1.
pub fn split_item(item: &ContentItem, limit_chars: usize) -> Vec<ContentItem> {
    let limit = limit_chars.max(1);
    let text_len = item.text_len();
    if text_len <= limit {
        return vec![item.clone()];
    }

    let chunks = chunk_body(&item.body, limit);
    info!(
        id = %item.id,
        chars = text_len,
        parts = chunks.len(),
        "Splitting over-length article into balanced parts"
    );

    chunks
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| make_part(item, i + 1, chunk))
        .collect()
}

/// Splits every item in order, keeping each item's parts adjacent.
///
/// Ids stay unique across the expanded list: a part name that clashes with an id
/// already emitted (e.g. an input item literally named `a_part1`) is renamed.
pub fn split_items(items: &[ContentItem], limit_chars: usize) -> Vec<ContentItem> {
    let mut seen: HashSet<String> = HashSet::new();
    items
        .iter()
        .flat_map(|item| split_item(item, limit_chars))
        .enumerate()
        .map(|(idx, mut part)| {
            part.id = claim_unique_id(&mut seen, &part.id, idx);
            part
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

/// Cuts `body` into balanced, sentence-aligned, trimmed chunks. Operates on chars.
pub(crate) fn chunk_body(body: &str, limit: usize) -> Vec<String> {
    let chars: Vec<char> = body.chars().collect();
    let len = chars.len();
    let limit = limit.max(1);

    let num_parts = len.div_ceil(limit).max(1);
    let ideal = len.div_ceil(num_parts).max(1);

    let mut chunks = Vec::with_capacity(num_parts);
    let mut start = 0;

    while start < len {
        let mut end = (start + ideal).min(len);

        if end < len {
            let search_end = (end + SENTENCE_SEARCH_WINDOW).min(len);
            if let Some(offset) = chars[start..search_end].iter().rposition(|&c| c == '.') {
                let last_period = start + offset;
                let min_snap = start as f64 + ideal as f64 * SENTENCE_SNAP_MIN_FRACTION;
                if last_period as f64 > min_snap {
                    end = last_period + 1;
                }
            }
        }

        let chunk: String = chars[start..end].iter().collect();
        chunks.push(chunk.trim().to_string());
        start = end;
    }

    chunks
}

/// Builds part `part_index` (1-based) as a fresh record; the parent is never mutated.
fn make_part(parent: &ContentItem, part_index: usize, body: String) -> ContentItem {
    let mut part = parent.clone();
    part.id = format!("{}_part{}", parent.id, part_index);
    part.body = body;

    let continuation = part_index > 1;
    if continuation {
        part.title = format!("{}{}", parent.title, CONTINUED_SUFFIX);
        part.headline = String::new();
        part.subhead = String::new();
        part.has_image = false;
        part.image_path = None;
        part.caption = None;
        part.bounding_boxes = Vec::new();
        part.visual_weight_hint = String::new();
        part.image_meta = ImageMeta::default();
        part.layout_override = Some(TEXT_ONLY_OVERRIDE.to_string());
    }

    part.segment = Some(SplitSegment {
        parent_id: parent.id.clone(),
        part_index,
        continuation,
    });
    part
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
