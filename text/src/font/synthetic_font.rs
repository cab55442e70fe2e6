use std::collections::HashMap;

use super::{
    BitmapBox, BitmapTarget, FontBackend, GlyphIndex, HMetrics, VMetrics, scaled_bitmap_box,
};
use crate::decoder::Codepoint;

/// A glyph of a [`SyntheticFont`]: a filled rectangle in design units, `y` up.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SyntheticGlyph {
    pub advance_width: i32,
    pub left_side_bearing: i32,
    pub min: (f32, f32),
    pub max: (f32, f32),
}

impl SyntheticGlyph {
    /// A box starting at the left side bearing on the baseline.
    pub fn rect(advance_width: i32, left_side_bearing: i32, width: f32, height: f32) -> Self {
        let lsb = left_side_bearing as f32;
        Self {
            advance_width,
            left_side_bearing,
            min: (lsb, 0.0),
            max: (lsb + width, height),
        }
    }

    /// A glyph without any outline, like a space.
    pub fn blank(advance_width: i32) -> Self {
        Self {
            advance_width,
            left_side_bearing: 0,
            min: (0.0, 0.0),
            max: (0.0, 0.0),
        }
    }
}

/// An in-memory font of rectangular glyphs with fully covered pixels.
///
/// Deterministic stand-in for real fonts, also counts how often glyphs are rasterized.
#[derive(Debug, Clone)]
pub struct SyntheticFont {
    units_per_em: u16,
    v_metrics: VMetrics,
    /// Index 0 is the missing glyph.
    glyphs: Vec<SyntheticGlyph>,
    cmap: HashMap<Codepoint, GlyphIndex>,
    kerning: HashMap<(Codepoint, Codepoint), i32>,
    fill_count: usize,
}

impl SyntheticFont {
    pub fn new(units_per_em: u16, v_metrics: VMetrics) -> Self {
        Self {
            units_per_em,
            v_metrics,
            glyphs: vec![SyntheticGlyph::blank(units_per_em as i32 / 2)],
            cmap: HashMap::new(),
            kerning: HashMap::new(),
            fill_count: 0,
        }
    }

    pub fn with_glyph(mut self, codepoint: impl Into<Codepoint>, glyph: SyntheticGlyph) -> Self {
        let index = self.glyphs.len() as GlyphIndex;
        self.glyphs.push(glyph);
        self.cmap.insert(codepoint.into(), index);
        self
    }

    pub fn with_kerning(
        mut self,
        first: impl Into<Codepoint>,
        second: impl Into<Codepoint>,
        kern: i32,
    ) -> Self {
        self.kerning.insert((first.into(), second.into()), kern);
        self
    }

    /// How many times a glyph was rasterized.
    pub fn fill_count(&self) -> usize {
        self.fill_count
    }

    fn glyph(&self, glyph: GlyphIndex) -> &SyntheticGlyph {
        self.glyphs.get(glyph as usize).unwrap_or(&self.glyphs[0])
    }
}

impl FontBackend for SyntheticFont {
    fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    fn glyph_index(&self, codepoint: Codepoint) -> GlyphIndex {
        self.cmap.get(&codepoint).copied().unwrap_or(0)
    }

    fn bitmap_box(&mut self, glyph: GlyphIndex, scale_x: f32, scale_y: f32) -> BitmapBox {
        let glyph = self.glyph(glyph);
        if glyph.min == glyph.max {
            return BitmapBox::default();
        }
        scaled_bitmap_box(glyph.min, glyph.max, scale_x, scale_y)
    }

    fn fill_bitmap(
        &mut self,
        glyph: GlyphIndex,
        scale_x: f32,
        scale_y: f32,
        target: BitmapTarget<'_>,
    ) {
        self.fill_count += 1;
        let bitmap_box = self.bitmap_box(glyph, scale_x, scale_y);
        if bitmap_box.is_empty() {
            return;
        }

        let rows = (bitmap_box.height() as usize).min(target.height);
        let columns = (bitmap_box.width() as usize).min(target.width);
        for y in 0..rows {
            let offset = y * target.stride;
            target.data[offset..offset + columns].fill(u8::MAX);
        }
    }

    fn h_metrics(&self, glyph: GlyphIndex) -> HMetrics {
        let glyph = self.glyph(glyph);
        HMetrics {
            advance_width: glyph.advance_width,
            left_side_bearing: glyph.left_side_bearing,
        }
    }

    fn v_metrics(&self) -> VMetrics {
        self.v_metrics
    }

    fn kern_advance(&mut self, first: Codepoint, second: Codepoint) -> i32 {
        self.kerning.get(&(first, second)).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn font() -> SyntheticFont {
        SyntheticFont::new(
            64,
            VMetrics {
                ascent: 48,
                descent: -16,
                line_gap: 0,
            },
        )
        .with_glyph('I', SyntheticGlyph::rect(32, 8, 16.0, 48.0))
        .with_glyph(' ', SyntheticGlyph::blank(16))
        .with_kerning('I', 'I', -4)
    }

    #[test]
    fn unknown_codepoints_map_to_the_missing_glyph() {
        let font = font();
        assert_eq!(font.glyph_index('x' as Codepoint), 0);
        assert_eq!(font.h_metrics(0).advance_width, 32);
    }

    #[test]
    fn box_and_fill_agree() {
        let mut font = font();
        let glyph = font.glyph_index('I' as Codepoint);
        let b = font.bitmap_box(glyph, 0.25, 0.25);
        assert_eq!(
            b,
            BitmapBox {
                x0: 2,
                y0: -12,
                x1: 6,
                y1: 0
            }
        );

        let mut data = vec![0u8; 6 * 12];
        font.fill_bitmap(
            glyph,
            0.25,
            0.25,
            BitmapTarget {
                data: &mut data,
                width: 5,
                height: 12,
                stride: 6,
            },
        );
        assert_eq!(font.fill_count(), 1);
        assert_eq!(&data[0..6], &[255, 255, 255, 255, 0, 0]);
        assert!(data.chunks(6).all(|row| row[..4].iter().all(|c| *c == 255)));
    }

    #[test]
    fn blank_glyphs_have_no_extent() {
        let mut font = font();
        let space = font.glyph_index(' ' as Codepoint);
        assert!(font.bitmap_box(space, 1.0, 1.0).is_empty());
        assert_eq!(font.kern_advance('I' as Codepoint, 'I' as Codepoint), -4);
        assert_eq!(font.kern_advance('I' as Codepoint, ' ' as Codepoint), 0);
    }
}
