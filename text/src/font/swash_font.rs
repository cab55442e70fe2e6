use std::{collections::HashMap, fs, path::Path, sync::Arc};

use anyhow::{Context, Result, bail};
use derive_more::Debug;
use swash::{
    CacheKey, FontRef, GlyphId,
    scale::{Render, ScaleContext, Source},
    shape::ShapeContext,
    zeno::{Format, Transform},
};

use super::{
    BitmapBox, BitmapTarget, FontBackend, GlyphIndex, HMetrics, VMetrics, scaled_bitmap_box,
};
use crate::decoder::Codepoint;

/// A [`FontBackend`] for TrueType / OpenType fonts, backed by swash.
#[derive(Debug)]
pub struct SwashFont {
    #[debug(skip)]
    data: Arc<Vec<u8>>,
    offset: u32,
    #[debug(skip)]
    key: CacheKey,
    units_per_em: u16,
    #[debug(skip)]
    scale_context: ScaleContext,
    #[debug(skip)]
    shape_context: ShapeContext,
    /// Kerning is derived by shaping, so remember every pair.
    kerning: HashMap<(Codepoint, Codepoint), i32>,
}

impl SwashFont {
    /// Parses the first font in `data`.
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Result<Self> {
        let data = data.into();
        let font = FontRef::from_index(&data, 0).context("Not a TrueType or OpenType font")?;
        let (offset, key) = (font.offset, font.key);
        let units_per_em = font.metrics(&[]).units_per_em;
        if units_per_em == 0 {
            bail!("Font has no units per em");
        }

        Ok(Self {
            data: Arc::new(data),
            offset,
            key,
            units_per_em,
            scale_context: ScaleContext::new(),
            shape_context: ShapeContext::new(),
            kerning: HashMap::new(),
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path).with_context(|| format!("Reading font {}", path.display()))?;
        Self::from_bytes(data).with_context(|| format!("Loading font {}", path.display()))
    }

    fn font(&self) -> FontRef<'_> {
        FontRef {
            data: &self.data,
            offset: self.offset,
            key: self.key,
        }
    }

    fn shape_kerning(&mut self, first: Codepoint, second: Codepoint) -> i32 {
        let (Some(a), Some(b)) = (char::from_u32(first), char::from_u32(second)) else {
            return 0;
        };

        let font = FontRef {
            data: &self.data,
            offset: self.offset,
            key: self.key,
        };

        // No size: the shaper produces advances in design units.
        let mut shaper = self.shape_context.builder(font).build();
        shaper.add_str(&String::from_iter([a, b]));
        let mut advances = Vec::with_capacity(2);
        shaper.shape_with(|cluster| advances.extend(cluster.glyphs.iter().map(|g| g.advance)));

        // Ligatures and the like are not kerning.
        if advances.len() != 2 {
            return 0;
        }

        let unshaped = font
            .glyph_metrics(&[])
            .advance_width(font.charmap().map(first));
        (advances[0] - unshaped).round() as i32
    }
}

impl FontBackend for SwashFont {
    fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    fn glyph_index(&self, codepoint: Codepoint) -> GlyphIndex {
        self.font().charmap().map(codepoint) as GlyphIndex
    }

    fn bitmap_box(&mut self, glyph: GlyphIndex, scale_x: f32, scale_y: f32) -> BitmapBox {
        let font = FontRef {
            data: &self.data,
            offset: self.offset,
            key: self.key,
        };

        let mut scaler = self
            .scale_context
            .builder(font)
            .size(scale_y * self.units_per_em as f32)
            .hint(false)
            .build();

        let Some(outline) = scaler.scale_outline(glyph as GlyphId) else {
            return BitmapBox::default();
        };
        if outline.points().is_empty() {
            return BitmapBox::default();
        }

        // The outline is already scaled vertically.
        let bounds = outline.bounds();
        scaled_bitmap_box(
            (bounds.min.x, bounds.min.y),
            (bounds.max.x, bounds.max.y),
            scale_x / scale_y,
            1.0,
        )
    }

    fn fill_bitmap(
        &mut self,
        glyph: GlyphIndex,
        scale_x: f32,
        scale_y: f32,
        target: BitmapTarget<'_>,
    ) {
        let font = FontRef {
            data: &self.data,
            offset: self.offset,
            key: self.key,
        };

        let mut scaler = self
            .scale_context
            .builder(font)
            .size(scale_y * self.units_per_em as f32)
            .hint(false)
            .build();

        let Some(image) = Render::new(&[Source::Outline])
            .format(Format::Alpha)
            .transform(Some(Transform::scale(scale_x / scale_y, 1.0)))
            .render(&mut scaler, glyph as GlyphId)
        else {
            log::warn!("Failed to render glyph {glyph}");
            return;
        };

        let image_width = image.placement.width as usize;
        let rows = (image.placement.height as usize).min(target.height);
        let columns = image_width.min(target.width);

        for y in 0..rows {
            let src = &image.data[y * image_width..y * image_width + columns];
            let dest_offset = y * target.stride;
            target.data[dest_offset..dest_offset + columns].copy_from_slice(src);
        }
    }

    fn h_metrics(&self, glyph: GlyphIndex) -> HMetrics {
        let metrics = self.font().glyph_metrics(&[]);
        let glyph = glyph as GlyphId;
        HMetrics {
            advance_width: metrics.advance_width(glyph).round() as i32,
            left_side_bearing: metrics.lsb(glyph).round() as i32,
        }
    }

    fn v_metrics(&self) -> VMetrics {
        let metrics = self.font().metrics(&[]);
        // swash reports the descent as a positive distance below the baseline.
        VMetrics {
            ascent: metrics.ascent.round() as i32,
            descent: -metrics.descent.round() as i32,
            line_gap: metrics.leading.round() as i32,
        }
    }

    fn kern_advance(&mut self, first: Codepoint, second: Codepoint) -> i32 {
        if let Some(kern) = self.kerning.get(&(first, second)) {
            return *kern;
        }
        let kern = self.shape_kerning(first, second);
        self.kerning.insert((first, second), kern);
        kern
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_is_not_a_font() {
        assert!(SwashFont::from_bytes(b"definitely not a font".to_vec()).is_err());
        assert!(SwashFont::from_bytes(Vec::new()).is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = SwashFont::load("does/not/exist.ttf").unwrap_err();
        assert!(format!("{err:#}").contains("does/not/exist.ttf"));
    }
}
