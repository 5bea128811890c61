//! Box Geometry — placement parameters the renderer uses to put text next to or on an image.
//!
//! Two independent, pure computations:
//! - `compute_split_params`: image and text in adjacent panes (row or column).
//! - `compute_overlay_params`: text inside the largest safe area of the image.
//!
//! # Coordinate units
//! Bounding boxes arrive as `[y_min, x_min, y_max, x_max]` with no unit tag. A box whose
//! coordinates all have magnitude ≤ 1.2 is treated as normalized and scaled by the image
//! dimensions; anything larger is taken as pixels.

use serde::{Deserialize, Serialize};
use tracing::debug;

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitDirection {
    /// Image and text side by side.
    Row,
    /// Image stacked above text.
    Column,
}

/// Parameters for a split (separated) layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitParams {
    pub direction: SplitDirection,
    /// Fraction of the composition given to the image pane.
    pub ratio: f64,
    /// Reverse render order so the image sits on the right.
    pub reverse: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Right,
}

/// Safe text box for an overlay layout, in percent of the image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayBox {
    pub left_pct: f64,
    pub top_pct: f64,
    pub width_pct: f64,
    pub align: TextAlign,
}

impl OverlayBox {
    /// Used whenever no usable box or image size is available.
    pub fn fallback() -> Self {
        Self {
            left_pct: 8.0,
            top_pct: 10.0,
            width_pct: 60.0,
            align: TextAlign::Left,
        }
    }
}

/// Per-item placement handed to the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayoutParams {
    Split(SplitParams),
    Overlay(OverlayBox),
}

// ────────────────────────────────────────────────────────────────────────────
// Constants
// ────────────────────────────────────────────────────────────────────────────

/// Aspect ratio at or above which a split layout goes side by side.
const ROW_MIN_ASPECT_RATIO: f64 = 1.25;

const LUXURY_PRODUCT_RATIO: f64 = 0.45;
const EDITORIAL_SPLIT_RATIO: f64 = 0.55;
const STREET_VIBE_RATIO: f64 = 0.70;
const DEFAULT_RATIO: f64 = 0.55;

/// Stacked panes tolerate less imbalance before the text pane gets too short.
const COLUMN_RATIO_MIN: f64 = 0.50;
const COLUMN_RATIO_MAX: f64 = 0.65;

/// Magnitude tolerance for treating a box as normalized (allows estimator overshoot).
const NORMALIZED_MAX_MAGNITUDE: f64 = 1.2;

const OVERLAY_PADDING_PCT: f64 = 2.0;
const LEFT_PCT_MAX: f64 = 95.0;
const TOP_PCT_MAX: f64 = 90.0;
const WIDTH_PCT_MIN: f64 = 20.0;
const WIDTH_PCT_MAX: f64 = 85.0;

/// Box centers past this fraction of the width align right.
const RIGHT_ALIGN_CENTER_FRACTION: f64 = 0.55;

// ────────────────────────────────────────────────────────────────────────────
// Split layout
// ────────────────────────────────────────────────────────────────────────────

/// Computes split-pane parameters from the type label, visual-weight hint and aspect ratio.
///
/// A non-finite or non-positive `aspect_ratio` is treated as square.
pub fn compute_split_params(
    layout_type: &str,
    visual_weight_hint: &str,
    aspect_ratio: f64,
) -> SplitParams {
    let ar = if aspect_ratio.is_finite() && aspect_ratio > 0.0 {
        aspect_ratio
    } else {
        1.0
    };

    let direction = if ar >= ROW_MIN_ASPECT_RATIO {
        SplitDirection::Row
    } else {
        SplitDirection::Column
    };

    let hint = visual_weight_hint.to_lowercase();
    let reverse = hint.contains("right-heavy") || hint.trim() == "right";

    let mut ratio = image_ratio_for_type(layout_type);
    if direction == SplitDirection::Column {
        ratio = ratio.clamp(COLUMN_RATIO_MIN, COLUMN_RATIO_MAX);
    }

    SplitParams {
        direction,
        ratio,
        reverse,
    }
}

/// Image-pane share by type label. First matching family wins.
fn image_ratio_for_type(layout_type: &str) -> f64 {
    let label = layout_type.to_uppercase();
    if label.contains("LUXURY") || label.contains("PRODUCT") {
        LUXURY_PRODUCT_RATIO
    } else if label.contains("EDITORIAL") || label.contains("SPLIT") {
        EDITORIAL_SPLIT_RATIO
    } else if label.contains("STREET") || label.contains("VIBE") {
        STREET_VIBE_RATIO
    } else {
        DEFAULT_RATIO
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Overlay layout
// ────────────────────────────────────────────────────────────────────────────

/// Picks the box with the largest area. Boxes without exactly four finite coordinates
/// are skipped; negative extents count as zero area. Ties keep the earliest box.
pub fn pick_largest_box(boxes: &[Vec<f64>]) -> Option<[f64; 4]> {
    let mut best: Option<[f64; 4]> = None;
    let mut best_area = -1.0_f64;

    for candidate in boxes {
        let [y_min, x_min, y_max, x_max] = match candidate.as_slice() {
            &[a, b, c, d] => [a, b, c, d],
            _ => continue,
        };
        if ![y_min, x_min, y_max, x_max].iter().all(|v| v.is_finite()) {
            continue;
        }

        let area = (x_max - x_min).max(0.0) * (y_max - y_min).max(0.0);
        if area > best_area {
            best_area = area;
            best = Some([y_min, x_min, y_max, x_max]);
        }
    }

    best
}

/// Computes the overlay text box from safe-area boxes and image pixel dimensions.
///
/// Falls back to [`OverlayBox::fallback`] when there is no usable box or either
/// dimension is zero. Percentages are padded inward, clamped and rounded to 2 places.
pub fn compute_overlay_params(boxes: &[Vec<f64>], width: u32, height: u32) -> OverlayBox {
    if width == 0 || height == 0 {
        debug!(width, height, "Overlay: missing image dimensions, using fallback box");
        return OverlayBox::fallback();
    }

    let Some([mut y_min, mut x_min, mut y_max, mut x_max]) = pick_largest_box(boxes) else {
        debug!(boxes = boxes.len(), "Overlay: no usable safe area, using fallback box");
        return OverlayBox::fallback();
    };

    let w = width as f64;
    let h = height as f64;

    let is_normalized = [y_min, x_min, y_max, x_max]
        .iter()
        .all(|v| v.abs() <= NORMALIZED_MAX_MAGNITUDE);
    if is_normalized {
        y_min *= h;
        y_max *= h;
        x_min *= w;
        x_max *= w;
    }

    let left_pct = x_min / w * 100.0;
    let top_pct = y_min / h * 100.0;
    let width_pct = (x_max - x_min) / w * 100.0;

    let left_pct = (left_pct + OVERLAY_PADDING_PCT).clamp(0.0, LEFT_PCT_MAX);
    let top_pct = (top_pct + OVERLAY_PADDING_PCT).clamp(0.0, TOP_PCT_MAX);
    let width_pct = (width_pct - OVERLAY_PADDING_PCT * 2.0).clamp(WIDTH_PCT_MIN, WIDTH_PCT_MAX);

    let center_x = (x_min + x_max) / 2.0;
    let align = if center_x > RIGHT_ALIGN_CENTER_FRACTION * w {
        TextAlign::Right
    } else {
        TextAlign::Left
    };

    OverlayBox {
        left_pct: round2(left_pct),
        top_pct: round2(top_pct),
        width_pct: round2(width_pct),
        align,
    }
}

/// Two decimal places, ties to even.
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── compute_split_params ────────────────────────────────────────────────

    #[test]
    fn test_wide_image_right_heavy_is_reversed_row() {
        let params = compute_split_params("TYPE_LUXURY_PRODUCT", "Right-heavy (Watch)", 2.0);
        assert_eq!(params.direction, SplitDirection::Row);
        assert!(params.reverse);
        assert_eq!(params.ratio, 0.45);
    }

    #[test]
    fn test_exact_right_hint_reverses() {
        assert!(compute_split_params("", "  RIGHT ", 1.0).reverse);
        assert!(!compute_split_params("", "rightmost", 1.0).reverse);
        assert!(!compute_split_params("", "left-heavy", 1.0).reverse);
    }

    #[test]
    fn test_row_threshold_is_inclusive() {
        assert_eq!(
            compute_split_params("", "", 1.25).direction,
            SplitDirection::Row
        );
        assert_eq!(
            compute_split_params("", "", 1.24).direction,
            SplitDirection::Column
        );
    }

    #[test]
    fn test_ratio_table_for_row_layouts() {
        assert_eq!(compute_split_params("TYPE_EDITORIAL_SPLIT", "", 1.5).ratio, 0.55);
        assert_eq!(compute_split_params("type_street_vibe", "", 1.5).ratio, 0.70);
        assert_eq!(compute_split_params("SOMETHING_ELSE", "", 1.5).ratio, 0.55);
    }

    #[test]
    fn test_column_ratio_is_clamped() {
        // Street/vibe wants 0.70, but stacked panes cap at 0.65.
        let street = compute_split_params("TYPE_STREET_VIBE", "", 0.8);
        assert_eq!(street.direction, SplitDirection::Column);
        assert_eq!(street.ratio, 0.65);

        // Luxury wants 0.45, stacked panes floor at 0.50.
        let luxury = compute_split_params("TYPE_LUXURY_PRODUCT", "", 0.8);
        assert_eq!(luxury.ratio, 0.50);
    }

    #[test]
    fn test_invalid_aspect_ratio_treated_as_square() {
        let params = compute_split_params("", "", f64::NAN);
        assert_eq!(params.direction, SplitDirection::Column);
        let params = compute_split_params("", "", -3.0);
        assert_eq!(params.direction, SplitDirection::Column);
    }

    // ── pick_largest_box ────────────────────────────────────────────────────

    #[test]
    fn test_pick_largest_box_skips_malformed() {
        let boxes = vec![
            vec![0.0, 0.0, 0.1],
            vec![0.0, 0.0, 0.2, 0.2],
            vec![0.0, 0.0, 0.5, 0.5, 0.9],
            vec![0.1, 0.1, 0.6, 0.7],
        ];
        assert_eq!(pick_largest_box(&boxes), Some([0.1, 0.1, 0.6, 0.7]));
    }

    #[test]
    fn test_pick_largest_box_inverted_box_has_zero_area() {
        let boxes = vec![vec![0.5, 0.5, 0.1, 0.1], vec![0.0, 0.0, 0.1, 0.1]];
        assert_eq!(pick_largest_box(&boxes), Some([0.0, 0.0, 0.1, 0.1]));

        // A lone zero-area box is still selected.
        let boxes = vec![vec![0.5, 0.5, 0.1, 0.1]];
        assert_eq!(pick_largest_box(&boxes), Some([0.5, 0.5, 0.1, 0.1]));
    }

    #[test]
    fn test_pick_largest_box_empty() {
        assert_eq!(pick_largest_box(&[]), None);
        assert_eq!(pick_largest_box(&[vec![f64::NAN, 0.0, 1.0, 1.0]]), None);
    }

    // ── compute_overlay_params ──────────────────────────────────────────────

    #[test]
    fn test_full_normalized_box_caps_width() {
        let overlay = compute_overlay_params(&[vec![0.0, 0.0, 1.0, 1.0]], 1000, 1000);
        assert_eq!(overlay.left_pct, 2.0);
        assert_eq!(overlay.top_pct, 2.0);
        assert_eq!(overlay.width_pct, 85.0);
        assert_eq!(overlay.align, TextAlign::Left);
    }

    #[test]
    fn test_pixel_box_on_right_side() {
        // x 600..900 on a 1000px wide image: center 750 > 550.
        let overlay = compute_overlay_params(&[vec![100.0, 600.0, 400.0, 900.0]], 1000, 500);
        assert_eq!(overlay.left_pct, 62.0);
        assert_eq!(overlay.top_pct, 22.0);
        assert_eq!(overlay.width_pct, 26.0);
        assert_eq!(overlay.align, TextAlign::Right);
    }

    #[test]
    fn test_overshoot_up_to_tolerance_is_normalized() {
        let overlay = compute_overlay_params(&[vec![0.0, 0.5, 0.5, 1.15]], 1000, 1000);
        // Scaled: x 500..1150 → center 825 → right.
        assert_eq!(overlay.align, TextAlign::Right);
        assert_eq!(overlay.left_pct, 52.0);
        assert_eq!(overlay.width_pct, 61.0);
    }

    #[test]
    fn test_narrow_box_width_floor_and_position_ceiling() {
        let overlay = compute_overlay_params(&[vec![990.0, 990.0, 1000.0, 1000.0]], 1000, 1000);
        assert_eq!(overlay.left_pct, 95.0);
        assert_eq!(overlay.top_pct, 90.0);
        assert_eq!(overlay.width_pct, 20.0);
    }

    #[test]
    fn test_center_exactly_at_threshold_aligns_left() {
        let overlay = compute_overlay_params(&[vec![0.0, 500.0, 100.0, 600.0]], 1000, 1000);
        assert_eq!(overlay.align, TextAlign::Left);
    }

    #[test]
    fn test_overlay_fallbacks() {
        assert_eq!(compute_overlay_params(&[], 1000, 1000), OverlayBox::fallback());
        assert_eq!(
            compute_overlay_params(&[vec![0.0, 0.0, 1.0, 1.0]], 0, 1000),
            OverlayBox::fallback()
        );
        assert_eq!(
            compute_overlay_params(&[vec![0.0, 0.0, 1.0]], 800, 600),
            OverlayBox::fallback()
        );
    }

    #[test]
    fn test_percentages_rounded_to_two_places() {
        let overlay = compute_overlay_params(&[vec![0.0, 100.0, 50.0, 700.0]], 3000, 3000);
        // left = 100/3000*100 + 2 = 5.333.. → 5.33
        assert_eq!(overlay.left_pct, 5.33);
        // width = 600/3000*100 - 4 = 16 → floor 20
        assert_eq!(overlay.width_pct, 20.0);
    }

    #[test]
    fn test_round2_breaks_ties_to_even() {
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(0.625), 0.62);
        assert_eq!(round2(5.333), 5.33);
    }

    #[test]
    fn test_layout_params_serialization_is_tagged() {
        let params = LayoutParams::Overlay(OverlayBox::fallback());
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["kind"], "overlay");
        assert_eq!(json["align"], "left");

        let params = LayoutParams::Split(compute_split_params("", "", 2.0));
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["kind"], "split");
        assert_eq!(json["direction"], "row");
    }
}
