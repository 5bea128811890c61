//! Input adapter — turns loosely-shaped JSON into an ordered `Vec<ContentItem>`.
//!
//! Upstream stages hand over articles either as a list or as a map keyed by id, with
//! fields either flat or nested under `manuscript` / `plan` / `vision_analysis`. All of
//! that is resolved here so the splitter and packer only ever see one shape.
//!
//! Nothing in here fails: malformed entries are skipped with a warning and counted.

use std::collections::HashSet;

use serde_json::{Map, Value};
use tracing::warn;

use crate::models::{ContentItem, ImageMeta};

const DEFAULT_TITLE: &str = "Untitled";

const NESTED_SECTIONS: &[&str] = &[
    "manuscript",
    "plan",
    "vision_analysis",
    "vision_result",
    "image_meta",
    "imageMeta",
];

/// Result of normalizing a raw payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedItems {
    pub items: Vec<ContentItem>,
    /// Entries dropped because they were not JSON objects.
    pub skipped: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Public API
// ────────────────────────────────────────────────────────────────────────────

/// Normalizes a list, an id-keyed map, or a single record. Anything else is empty.
pub fn normalize_items(raw: &Value) -> NormalizedItems {
    let entries: Vec<(Option<String>, &Value)> = match raw {
        Value::Array(list) => list.iter().map(|v| (None, v)).collect(),
        Value::Object(map) if is_keyed_collection(map) => {
            map.iter().map(|(k, v)| (Some(k.clone()), v)).collect()
        }
        Value::Object(_) => vec![(None, raw)],
        other => {
            if !other.is_null() {
                warn!(kind = json_kind(other), "Expected a list of items, ignoring payload");
            }
            return NormalizedItems::default();
        }
    };

    let mut out = NormalizedItems::default();
    let mut seen: HashSet<String> = HashSet::new();

    for (idx, (key, entry)) in entries.into_iter().enumerate() {
        let Some(record) = entry.as_object() else {
            warn!(index = idx, kind = json_kind(entry), "Skipping non-object item");
            out.skipped += 1;
            continue;
        };

        let mut item = item_from_record(record, key.as_deref(), idx);
        item.id = claim_unique_id(&mut seen, &item.id, idx);
        out.items.push(item);
    }

    out
}

/// Returns `id` if unused, else the first free `{id}-{idx}`, `{id}-{idx}-1`, ...
/// The returned id is recorded in `seen`.
pub(crate) fn claim_unique_id(seen: &mut HashSet<String>, id: &str, idx: usize) -> String {
    if seen.insert(id.to_string()) {
        return id.to_string();
    }

    let base = format!("{id}-{idx}");
    let mut candidate = base.clone();
    let mut attempt = 0usize;
    while !seen.insert(candidate.clone()) {
        attempt += 1;
        candidate = format!("{base}-{attempt}");
    }
    warn!(id = %id, renamed = %candidate, "Duplicate item id");
    candidate
}

// ────────────────────────────────────────────────────────────────────────────
// Record mapping
// ────────────────────────────────────────────────────────────────────────────

fn item_from_record(record: &Map<String, Value>, key: Option<&str>, idx: usize) -> ContentItem {
    let manuscript = record.get("manuscript").and_then(Value::as_object);
    let plan = record.get("plan").and_then(Value::as_object);
    let vision = record
        .get("vision_analysis")
        .or_else(|| record.get("vision_result"))
        .and_then(Value::as_object);

    let id = resolve_id(record, key, idx);

    let title = text(record, &["title"])
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());
    let headline = text(record, &["headline"])
        .or_else(|| manuscript.and_then(|m| text(m, &["headline"])))
        .unwrap_or_else(|| title.clone());
    let subhead = text(record, &["subhead"])
        .or_else(|| manuscript.and_then(|m| text(m, &["subhead"])))
        .unwrap_or_default();
    let body = text(record, &["body"])
        .filter(|b| !b.is_empty())
        .or_else(|| manuscript.and_then(|m| text(m, &["body"])))
        .unwrap_or_default();
    let caption = text(record, &["caption"])
        .or_else(|| manuscript.and_then(|m| text(m, &["caption"])))
        .filter(|c| !c.is_empty());
    let image_path = text(record, &["image_path", "imagePath"]).filter(|p| !p.is_empty());

    let has_image = field(record, &["has_image", "hasImage"])
        .and_then(Value::as_bool)
        .unwrap_or(image_path.is_some() || caption.is_some());

    let layout_type = text(record, &["layout_type", "layoutType"])
        .or_else(|| plan.and_then(|p| text(p, &["selected_type"])))
        .unwrap_or_default();
    let layout_mode = text(record, &["layout_mode", "layoutMode"])
        .or_else(|| {
            vision
                .and_then(|v| v.get("layout_strategy"))
                .and_then(|s| s.get("recommendation"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .or_else(|| plan.and_then(|p| text(p, &["layout_mode"])));

    let boxes_value = field(record, &["bounding_boxes", "boundingBoxes"]).or_else(|| {
        vision.and_then(|v| v.get("space_analysis").or_else(|| v.get("safe_areas")))
    });
    let bounding_boxes = boxes_value.map(parse_boxes).unwrap_or_default();

    let visual_weight_hint = text(record, &["visual_weight_hint", "visualWeightHint"])
        .or_else(|| {
            vision
                .and_then(|v| v.get("metadata"))
                .and_then(|m| m.pointer("/composition_analysis/visual_weight"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_default();

    let image_meta = field(record, &["image_meta", "imageMeta"])
        .and_then(Value::as_object)
        .map(parse_image_meta)
        .unwrap_or_default();

    let layout_override = text(record, &["layout_override"]).filter(|o| !o.is_empty());

    ContentItem {
        id,
        title,
        headline,
        subhead,
        body,
        caption,
        has_image,
        image_path,
        layout_type,
        layout_mode,
        bounding_boxes,
        image_meta,
        visual_weight_hint,
        layout_override,
        segment: None,
    }
}

/// Record id, else map key, else the entry index. `"None"` counts as missing.
fn resolve_id(record: &Map<String, Value>, key: Option<&str>, idx: usize) -> String {
    let from_record = match record.get("id") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    from_record
        .or_else(|| key.map(str::to_string))
        .filter(|id| !id.is_empty() && id != "None")
        .unwrap_or_else(|| idx.to_string())
}

/// Keeps numeric sequences only. Wrong-length boxes are kept for geometry to skip.
fn parse_boxes(value: &Value) -> Vec<Vec<f64>> {
    let Some(list) = value.as_array() else {
        return Vec::new();
    };

    list.iter()
        .filter_map(|entry| {
            entry
                .as_array()?
                .iter()
                .map(Value::as_f64)
                .collect::<Option<Vec<f64>>>()
        })
        .collect()
}

fn parse_image_meta(meta: &Map<String, Value>) -> ImageMeta {
    let dimension = |key: &str| -> u32 {
        meta.get(key)
            .and_then(Value::as_f64)
            .filter(|v| v.is_finite() && *v > 0.0)
            .map(|v| v.min(u32::MAX as f64) as u32)
            .unwrap_or(0)
    };

    ImageMeta {
        aspect_ratio: field(meta, &["aspect_ratio", "aspectRatio"]).and_then(Value::as_f64),
        ..ImageMeta::new(dimension("width"), dimension("height"))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

/// A map whose values are all objects is an id-keyed collection, unless its keys are
/// the nested sections of a single record.
fn is_keyed_collection(map: &Map<String, Value>) -> bool {
    !map.is_empty()
        && map.values().all(Value::is_object)
        && !map.keys().any(|k| NESTED_SECTIONS.contains(&k.as_str()))
}

fn field<'a>(record: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| record.get(*k)).filter(|v| !v.is_null())
}

fn text(record: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    field(record, keys).and_then(Value::as_str).map(str::to_string)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
