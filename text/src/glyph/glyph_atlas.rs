//! A glyph cache that rasterizes each glyph once and keeps it in a shared atlas surface.
use std::collections::{HashMap, hash_map};

use tracing::instrument;

use super::{
    AtlasAllocator, AtlasSurface, GlyphRasterizer, GridAllocator, atlas::atlas_full,
    padded_glyph_size,
};
use crate::{
    decoder::Codepoint,
    error::AtlasFull,
    font::{FontBackend, GlyphIndex},
    geometry::{BoxPx, SizePx},
};

/// A filled atlas entry.
///
/// Entries are immutable once stored.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AtlasEntry {
    /// The glyph's padded bitmap in the atlas. `None` for glyphs without visible pixels.
    pub texture_rect: Option<BoxPx>,
    pub glyph_index: GlyphIndex,
    /// Distance from the baseline up to the first row of the bitmap.
    pub baseline_to_top_px: i32,
}

impl AtlasEntry {
    pub fn is_visible(&self) -> bool {
        self.texture_rect.is_some()
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct AtlasStats {
    pub hits: usize,
    pub misses: usize,
    pub uploads: usize,
}

/// Maps codepoints to rasterized glyphs in an atlas surface.
///
/// Entries are keyed by codepoint only, so one atlas serves one font at one scale. Entries are
/// never evicted.
#[derive(Debug)]
pub struct GlyphAtlas<S, A = GridAllocator> {
    surface: S,
    allocator: A,
    rasterizer: GlyphRasterizer,
    entries: HashMap<Codepoint, AtlasEntry>,
    stats: AtlasStats,
}

impl<S: AtlasSurface, A: AtlasAllocator> GlyphAtlas<S, A> {
    pub fn new(surface: S, allocator: A) -> Self {
        Self {
            surface,
            allocator,
            rasterizer: GlyphRasterizer::default(),
            entries: HashMap::new(),
            stats: AtlasStats::default(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn stats(&self) -> AtlasStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry of an already resolved codepoint.
    pub fn get(&self, codepoint: Codepoint) -> Option<&AtlasEntry> {
        self.entries.get(&codepoint)
    }

    /// Returns the atlas entry for `codepoint`, rasterizing and uploading the glyph on the first
    /// request.
    ///
    /// When the allocator fails, nothing is stored and the glyph is not rasterized.
    pub fn resolve(
        &mut self,
        font: &mut impl FontBackend,
        codepoint: Codepoint,
        scale: f32,
    ) -> Result<AtlasEntry, AtlasFull> {
        match self.entries.entry(codepoint) {
            hash_map::Entry::Occupied(e) => {
                self.stats.hits += 1;
                Ok(*e.get())
            }
            hash_map::Entry::Vacant(e) => {
                self.stats.misses += 1;
                let entry = Self::fill(
                    &mut self.surface,
                    &mut self.allocator,
                    &mut self.rasterizer,
                    &mut self.stats,
                    font,
                    codepoint,
                    scale,
                )?;
                Ok(*e.insert(entry))
            }
        }
    }

    #[instrument(skip_all)]
    fn fill(
        surface: &mut S,
        allocator: &mut A,
        rasterizer: &mut GlyphRasterizer,
        stats: &mut AtlasStats,
        font: &mut impl FontBackend,
        codepoint: Codepoint,
        scale: f32,
    ) -> Result<AtlasEntry, AtlasFull> {
        let glyph_index = font.glyph_index(codepoint);
        let bitmap_box = font.bitmap_box(glyph_index, scale, scale);
        // The box's top is above the baseline, hence negative.
        let baseline_to_top_px = -bitmap_box.y0;

        // Also for glyphs without pixels, which are never allocated.
        if !allocator.supports(codepoint) {
            let size = if bitmap_box.is_empty() {
                SizePx::zero()
            } else {
                padded_glyph_size(&bitmap_box)
            };
            return Err(atlas_full(codepoint, size));
        }

        if bitmap_box.is_empty() {
            log::debug!("U+{codepoint:04X}: no visible pixels");
            return Ok(AtlasEntry {
                texture_rect: None,
                glyph_index,
                baseline_to_top_px,
            });
        }

        let region = allocator.allocate(codepoint, padded_glyph_size(&bitmap_box))?;
        let bitmap = rasterizer.rasterize_in_box(font, glyph_index, scale, &bitmap_box);
        debug_assert_eq!(region.size().cast::<u32>(), bitmap.size());

        surface.upload(region.min, &bitmap);
        stats.uploads += 1;

        log::debug!("U+{codepoint:04X}: rasterized into {region:?}");

        Ok(AtlasEntry {
            texture_rect: Some(region),
            glyph_index,
            baseline_to_top_px,
        })
    }
}
