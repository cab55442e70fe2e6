use std::fmt;

use tracing::instrument;

use super::lcd_filter;
use crate::{
    font::{BitmapBox, BitmapTarget, FontBackend, GlyphIndex},
    geometry::SizePx,
};

/// Subpixels per pixel of an RGB stripe.
pub const HORIZONTAL_RESOLUTION: usize = 3;

/// Empty pixel column left of the glyph, so that shifting the glyph right by a fraction of a pixel
/// has a column to move into.
pub const SUBPIXEL_POSITIONING_PADDING: i32 = 1;

/// Room for the filter to spread coverage into, on both sides of the glyph.
pub const FILTER_PADDING: i32 = 1;

/// Pixels between the left edge of a rasterized glyph and its bitmap box.
pub const LEFT_PADDING: i32 = SUBPIXEL_POSITIONING_PADDING + FILTER_PADDING;

/// An RGB8 bitmap where each channel holds the filtered coverage of one subpixel.
#[derive(Clone, PartialEq, Eq)]
pub struct CoverageBitmap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl fmt::Debug for CoverageBitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoverageBitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl CoverageBitmap {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        assert_eq!(
            data.len(),
            width as usize * height as usize * HORIZONTAL_RESOLUTION
        );
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> SizePx {
        SizePx::new(self.width, self.height)
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.width as usize * HORIZONTAL_RESOLUTION
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.stride();
        let start = y as usize * stride;
        &self.data[start..start + stride]
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let offset = y as usize * self.stride() + x as usize * HORIZONTAL_RESOLUTION;
        [
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
        ]
    }
}

/// The padded size of the bitmap a glyph with the given bitmap box rasterizes into.
pub fn padded_glyph_size(bitmap_box: &BitmapBox) -> SizePx {
    SizePx::new(
        (LEFT_PADDING + bitmap_box.width() + FILTER_PADDING) as u32,
        bitmap_box.height() as u32,
    )
}

/// Rasterizes glyphs at three times the horizontal resolution and filters them into
/// [`CoverageBitmap`]s.
///
/// The subpixel scratch buffer is kept between glyphs.
#[derive(Debug, Default)]
pub struct GlyphRasterizer {
    scratch: Vec<u8>,
}

impl GlyphRasterizer {
    /// Returns `None` for glyphs without visible pixels.
    pub fn rasterize(
        &mut self,
        font: &mut impl FontBackend,
        glyph: GlyphIndex,
        scale: f32,
    ) -> Option<CoverageBitmap> {
        let bitmap_box = font.bitmap_box(glyph, scale, scale);
        if bitmap_box.is_empty() {
            return None;
        }
        Some(self.rasterize_in_box(font, glyph, scale, &bitmap_box))
    }

    /// Rasterizes a glyph with an already queried, non-empty bitmap box.
    #[instrument(skip_all)]
    pub fn rasterize_in_box(
        &mut self,
        font: &mut impl FontBackend,
        glyph: GlyphIndex,
        scale: f32,
        bitmap_box: &BitmapBox,
    ) -> CoverageBitmap {
        debug_assert!(!bitmap_box.is_empty());

        let size = padded_glyph_size(bitmap_box);
        let height = size.height as usize;
        let stride = size.width as usize * HORIZONTAL_RESOLUTION;

        self.scratch.clear();
        self.scratch.resize(stride * height, 0);

        let offset = LEFT_PADDING as usize * HORIZONTAL_RESOLUTION;
        font.fill_bitmap(
            glyph,
            scale * HORIZONTAL_RESOLUTION as f32,
            scale,
            BitmapTarget {
                data: &mut self.scratch[offset..],
                width: stride - offset,
                height,
                stride,
            },
        );

        let filtered = lcd_filter(&self.scratch, stride, height);
        CoverageBitmap::new(size.width, size.height, filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::{SyntheticFont, SyntheticGlyph, VMetrics};

    fn font() -> SyntheticFont {
        SyntheticFont::new(64, VMetrics::default())
            .with_glyph('I', SyntheticGlyph::rect(32, 8, 16.0, 48.0))
            .with_glyph(' ', SyntheticGlyph::blank(16))
    }

    #[test]
    fn blank_glyphs_are_not_rasterized() {
        let mut font = font();
        let space = font.glyph_index(' ' as u32);
        assert!(GlyphRasterizer::default().rasterize(&mut font, space, 0.25).is_none());
        assert_eq!(font.fill_count(), 0);
    }

    #[test]
    fn bitmap_is_padded_and_filtered() {
        let mut font = font();
        let glyph = font.glyph_index('I' as u32);
        let bitmap = GlyphRasterizer::default()
            .rasterize(&mut font, glyph, 0.25)
            .unwrap();

        // 4 glyph pixels, 2 left and 1 right padding.
        assert_eq!(bitmap.size(), SizePx::new(7, 12));

        // At 3x the glyph covers subpixels 6..18.
        let expected: [[u8; 3]; 7] = [
            [0, 0, 0],
            [0, 8, 85],
            [171, 248, 255],
            [255, 255, 255],
            [255, 255, 255],
            [255, 248, 171],
            [85, 8, 0],
        ];
        for y in 0..bitmap.height() {
            for (x, expected) in expected.iter().enumerate() {
                assert_eq!(bitmap.pixel(x as u32, y), *expected, "pixel {x},{y}");
            }
        }
    }

    #[test]
    fn scratch_buffer_is_reset_between_glyphs() {
        let mut font = font().with_glyph('.', SyntheticGlyph::rect(32, 0, 8.0, 8.0));
        let mut rasterizer = GlyphRasterizer::default();
        let big = font.glyph_index('I' as u32);
        let small = font.glyph_index('.' as u32);
        rasterizer.rasterize(&mut font, big, 0.25).unwrap();
        let dot = rasterizer.rasterize(&mut font, small, 0.25).unwrap();
        let fresh = GlyphRasterizer::default()
            .rasterize(&mut font, small, 0.25)
            .unwrap();
        assert_eq!(dot, fresh);
    }
}
