//! The narrow capability set the pipeline needs from a font.
//!
//! Outline lookup, hinting and metrics are left to a backend. All metrics are in font design
//! units unless a scale is passed in.

mod swash_font;
mod synthetic_font;

pub use swash_font::*;
pub use synthetic_font::*;

use crate::decoder::Codepoint;

pub type GlyphIndex = u32;

/// Pixel bounds of a scaled glyph relative to its origin on the baseline. `y` points down, so
/// `y0` is negative for glyphs that extend above the baseline.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct BitmapBox {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl BitmapBox {
    pub fn width(&self) -> i32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> i32 {
        self.y1 - self.y0
    }

    /// `true` if the glyph covers no pixel at all.
    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct HMetrics {
    pub advance_width: i32,
    pub left_side_bearing: i32,
}

/// Vertical font metrics. `descent` is negative for descenders below the baseline.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct VMetrics {
    pub ascent: i32,
    pub descent: i32,
    pub line_gap: i32,
}

impl VMetrics {
    pub fn line_height(&self, scale: f32) -> f32 {
        (self.ascent - self.descent + self.line_gap) as f32 * scale
    }

    pub fn baseline(&self, scale: f32) -> f32 {
        self.ascent as f32 * scale
    }
}

/// A strided 8 bit coverage buffer a backend rasterizes into.
#[derive(Debug)]
pub struct BitmapTarget<'a> {
    pub data: &'a mut [u8],
    pub width: usize,
    pub height: usize,
    pub stride: usize,
}

pub trait FontBackend {
    fn units_per_em(&self) -> u16;

    /// The scale that maps the em square to `pixels`.
    fn scale_for_em_to_pixels(&self, pixels: f32) -> f32 {
        pixels / self.units_per_em() as f32
    }

    /// The glyph for a codepoint. `0` if the font has none.
    fn glyph_index(&self, codepoint: Codepoint) -> GlyphIndex;

    fn bitmap_box(&mut self, glyph: GlyphIndex, scale_x: f32, scale_y: f32) -> BitmapBox;

    /// Rasterize the glyph with its bitmap box's top left corner at the target's origin.
    /// Coverage outside of the target's width and height is clipped.
    fn fill_bitmap(
        &mut self,
        glyph: GlyphIndex,
        scale_x: f32,
        scale_y: f32,
        target: BitmapTarget<'_>,
    );

    fn h_metrics(&self, glyph: GlyphIndex) -> HMetrics;

    fn v_metrics(&self) -> VMetrics;

    /// Additional advance to apply between two consecutive codepoints.
    fn kern_advance(&mut self, first: Codepoint, second: Codepoint) -> i32;
}

/// Computes the pixel bounds of design space bounds (`y` up) the same way for all backends.
pub(crate) fn scaled_bitmap_box(
    (min_x, min_y): (f32, f32),
    (max_x, max_y): (f32, f32),
    scale_x: f32,
    scale_y: f32,
) -> BitmapBox {
    BitmapBox {
        x0: (min_x * scale_x).floor() as i32,
        y0: (-max_y * scale_y).floor() as i32,
        x1: (max_x * scale_x).ceil() as i32,
        y1: (-min_y * scale_y).ceil() as i32,
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn bitmap_box_flips_y_and_rounds_outwards() {
        let scale = 1.0 / 64.0;
        let b = scaled_bitmap_box((10.0, -200.0), (510.0, 700.0), scale, scale);
        assert_eq!(
            b,
            BitmapBox {
                x0: 0,
                y0: -11,
                x1: 8,
                y1: 4
            }
        );
        assert_eq!(b.width(), 8);
        assert_eq!(b.height(), 15);
        assert!(!b.is_empty());
        assert!(BitmapBox::default().is_empty());
    }

    #[test]
    fn line_metrics_scale() {
        let v = VMetrics {
            ascent: 800,
            descent: -200,
            line_gap: 100,
        };
        assert_abs_diff_eq!(v.line_height(0.01), 11.0, epsilon = 1e-5);
        assert_abs_diff_eq!(v.baseline(0.01), 8.0, epsilon = 1e-5);
    }
}
