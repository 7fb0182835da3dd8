use std::str::FromStr;

use crate::foundation::{
    core::{Canvas, Rect, Size},
    error::OverlayError,
};

const STACKED_CANVAS: Canvas = Canvas {
    width: 500,
    height: 500,
};

const SIDE_BY_SIDE_CANVAS: Canvas = Canvas {
    width: 800,
    height: 500,
};

/// Primaries wider than this aspect ratio are fit to the full canvas width in [`LayoutVariant::Stacked`].
const STACKED_WIDE_ASPECT: f64 = 2.0;

/// Arrangement of the primary (base) and secondary (fabric) image on the output canvas.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum LayoutVariant {
    /// 500x500 canvas. The primary is aspect-fit and centered in the top half; the secondary is
    /// stretched to fill the bottom half exactly.
    #[default]
    Stacked,
    /// 800x500 canvas split into two 400x500 zones. Each image is aspect-fit and centered in its
    /// own zone, primary on the left.
    SideBySide,
}

impl LayoutVariant {
    /// Fixed output canvas for this variant.
    pub fn canvas(self) -> Canvas {
        match self {
            Self::Stacked => STACKED_CANVAS,
            Self::SideBySide => SIDE_BY_SIDE_CANVAS,
        }
    }

    /// Compute destination rectangles for both images given their intrinsic sizes.
    ///
    /// Sizes and offsets are left unrounded; the renderer places images with sub-pixel precision.
    pub fn plan(self, primary: Size, secondary: Size) -> LayoutPlan {
        let canvas = self.canvas();
        match self {
            Self::Stacked => LayoutPlan {
                canvas,
                primary: stacked_primary_rect(canvas, primary),
                secondary: stacked_secondary_rect(canvas),
            },
            Self::SideBySide => {
                let (left, right) = side_by_side_zones(canvas);
                LayoutPlan {
                    canvas,
                    primary: fit_into_zone(primary, left),
                    secondary: fit_into_zone(secondary, right),
                }
            }
        }
    }
}

impl std::fmt::Display for LayoutVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Stacked => "stacked",
            Self::SideBySide => "side-by-side",
        })
    }
}

impl FromStr for LayoutVariant {
    type Err = OverlayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stacked" => Ok(Self::Stacked),
            "side-by-side" | "side_by_side" | "sidebyside" => Ok(Self::SideBySide),
            other => Err(OverlayError::validation(format!(
                "unknown layout variant '{other}' (expected 'stacked' or 'side-by-side')"
            ))),
        }
    }
}

/// Canvas and destination rectangles for one composite.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutPlan {
    /// Output canvas size.
    pub canvas: Canvas,
    /// Where the primary (base) image is drawn.
    pub primary: Rect,
    /// Where the secondary (fabric) image is drawn.
    pub secondary: Rect,
}

fn stacked_primary_rect(canvas: Canvas, image: Size) -> Rect {
    let canvas_w = f64::from(canvas.width);
    let band_h = f64::from(canvas.height) / 2.0;
    let aspect = image.width / image.height;

    let (w, h) = if aspect > STACKED_WIDE_ASPECT {
        (canvas_w, canvas_w / aspect)
    } else {
        (aspect * band_h, band_h)
    };

    let x = (canvas_w - w) / 2.0;
    let y = (band_h - h) / 2.0;
    Rect::from_origin_size((x, y), (w, h))
}

fn stacked_secondary_rect(canvas: Canvas) -> Rect {
    let band_h = f64::from(canvas.height) / 2.0;
    Rect::new(0.0, band_h, f64::from(canvas.width), f64::from(canvas.height))
}

fn side_by_side_zones(canvas: Canvas) -> (Rect, Rect) {
    let half_w = f64::from(canvas.width) / 2.0;
    let h = f64::from(canvas.height);
    (
        Rect::new(0.0, 0.0, half_w, h),
        Rect::new(half_w, 0.0, f64::from(canvas.width), h),
    )
}

/// Aspect-fit `image` inside `zone` and center it on both axes.
pub fn fit_into_zone(image: Size, zone: Rect) -> Rect {
    let zone_w = zone.width();
    let zone_h = zone.height();
    let zone_aspect = zone_w / zone_h;
    let image_aspect = image.width / image.height;

    let (w, h) = if image_aspect > zone_aspect {
        (zone_w, zone_w / image_aspect)
    } else {
        (zone_h * image_aspect, zone_h)
    };

    let x = zone.x0 + (zone_w - w) / 2.0;
    let y = zone.y0 + (zone_h - h) / 2.0;
    Rect::from_origin_size((x, y), (w, h))
}

#[cfg(test)]
#[path = "../../tests/unit/layout/variant.rs"]
mod tests;
