use serde::{Deserialize, Serialize};

/// Pixel dimensions of the item's main image.
///
/// `aspect_ratio` is optional on input; [`ImageMeta::resolved_aspect_ratio`] derives it
/// from the dimensions when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageMeta {
    pub width: u32,
    pub height: u32,
    pub aspect_ratio: Option<f64>,
}

impl ImageMeta {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            aspect_ratio: None,
        }
    }

    /// Explicit ratio if usable, else `width / height`, else square.
    pub fn resolved_aspect_ratio(&self) -> f64 {
        match self.aspect_ratio {
            Some(ar) if ar.is_finite() && ar > 0.0 => ar,
            _ if self.width > 0 && self.height > 0 => self.width as f64 / self.height as f64,
            _ => 1.0,
        }
    }
}

/// Provenance of an item produced by splitting an over-length body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitSegment {
    pub parent_id: String,
    /// 1-based.
    pub part_index: usize,
    /// Parts after the first render text-only, without masthead or image.
    pub continuation: bool,
}

/// One article (or one split part of an article) headed for a page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentItem {
    pub id: String,
    pub title: String,
    pub headline: String,
    pub subhead: String,
    pub body: String,
    pub caption: Option<String>,
    pub has_image: bool,
    pub image_path: Option<String>,
    /// Free-form type label from planning, e.g. `TYPE_LUXURY_PRODUCT`.
    pub layout_type: String,
    /// Layout strategy recommendation, e.g. `separated`.
    pub layout_mode: Option<String>,
    /// `[y_min, x_min, y_max, x_max]`, either normalized or in pixels.
    pub bounding_boxes: Vec<Vec<f64>>,
    pub image_meta: ImageMeta,
    pub visual_weight_hint: String,
    pub layout_override: Option<String>,
    pub segment: Option<SplitSegment>,
}

impl ContentItem {
    /// Body length in characters (not bytes).
    pub fn text_len(&self) -> usize {
        self.body.chars().count()
    }

    pub fn is_continuation(&self) -> bool {
        self.segment.as_ref().is_some_and(|s| s.continuation)
    }
}
