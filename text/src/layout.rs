//! Places glyphs along a baseline with fractional horizontal precision.
use crate::{
    decoder::Codepoint,
    error::AtlasFull,
    font::FontBackend,
    geometry::{BoxPx, PointPx, PositionPx},
    glyph::{AtlasAllocator, AtlasEntry, AtlasSurface, GlyphAtlas},
};

const LINE_FEED: Codepoint = '\n' as Codepoint;

/// A visible glyph with its place on the baseline.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PositionedGlyph {
    pub codepoint: Codepoint,
    pub entry: AtlasEntry,
    /// The region of the glyph's padded bitmap in the atlas.
    pub texture_rect: BoxPx,
    /// `x`: integer pixel part of the glyph's left edge, `y`: the baseline.
    pub position: PointPx,
    /// The fractional part of the glyph's left edge, in `[0, 1)`.
    pub subpixel_shift: f32,
}

impl PositionedGlyph {
    /// The top of the glyph's bitmap.
    pub fn top(&self) -> i32 {
        self.position.y - self.entry.baseline_to_top_px
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextLayout {
    pub glyphs: Vec<PositionedGlyph>,
    /// Pen position after the last codepoint. `y` is the baseline of the last line.
    pub pen: PositionPx,
}

/// Splits a position into its integer pixel and its fractional part.
///
/// The fraction is always in `[0, 1)`, also for negative positions.
pub fn split_subpixel(x: f32) -> (i32, f32) {
    let pixel = x.floor();
    let shift = x - pixel;
    // `x - floor(x)` rounds up to 1.0 for tiny negative values.
    if shift >= 1.0 {
        return (pixel as i32 + 1, 0.0);
    }
    (pixel as i32, shift)
}

/// Lays out `codepoints` starting with the top left corner of the first line at `origin`.
///
/// Glyphs are resolved through the atlas, so every visible glyph is rasterized on first use.
/// Glyphs without visible pixels only advance the pen.
pub fn layout<S: AtlasSurface, A: AtlasAllocator>(
    font: &mut impl FontBackend,
    atlas: &mut GlyphAtlas<S, A>,
    codepoints: impl IntoIterator<Item = Codepoint>,
    origin: PositionPx,
    font_scale: f32,
) -> Result<TextLayout, AtlasFull> {
    let v_metrics = font.v_metrics();
    let line_height = v_metrics.line_height(font_scale).round();

    let mut pen = PositionPx::new(origin.x, origin.y + v_metrics.baseline(font_scale).round());
    let mut previous = None;
    let mut glyphs = Vec::new();

    for codepoint in codepoints {
        if let Some(previous) = previous {
            pen.x += font.kern_advance(previous, codepoint) as f32 * font_scale;
        }
        previous = Some(codepoint);

        if codepoint == LINE_FEED {
            pen.x = origin.x;
            pen.y += line_height;
            continue;
        }

        let entry = atlas.resolve(font, codepoint, font_scale)?;
        let h_metrics = font.h_metrics(entry.glyph_index);

        if let Some(texture_rect) = entry.texture_rect {
            let glyph_x = pen.x + h_metrics.left_side_bearing as f32 * font_scale;
            let (pixel_x, subpixel_shift) = split_subpixel(glyph_x);
            glyphs.push(PositionedGlyph {
                codepoint,
                entry,
                texture_rect,
                position: PointPx::new(pixel_x, pen.y.floor() as i32),
                subpixel_shift,
            });
        }

        pen.x += h_metrics.advance_width as f32 * font_scale;
    }

    Ok(TextLayout { glyphs, pen })
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::{
        decoder::codepoints,
        font::{SyntheticFont, SyntheticGlyph, VMetrics},
        geometry::SizePx,
        glyph::{CpuAtlasSurface, GridAllocator},
    };

    const SCALE: f32 = 0.25;

    fn font() -> SyntheticFont {
        SyntheticFont::new(
            64,
            VMetrics {
                ascent: 48,
                descent: -16,
                line_gap: 4,
            },
        )
        .with_glyph('a', SyntheticGlyph::rect(37, 4, 28.0, 32.0))
        .with_glyph('A', SyntheticGlyph::rect(40, 0, 40.0, 48.0))
        .with_glyph('V', SyntheticGlyph::rect(40, 0, 40.0, 48.0))
        .with_glyph(' ', SyntheticGlyph::blank(16))
        .with_kerning('A', 'V', -8)
    }

    fn atlas() -> GlyphAtlas<CpuAtlasSurface> {
        let size = SizePx::new(512, 512);
        GlyphAtlas::new(
            CpuAtlasSurface::new(size),
            GridAllocator::new(size, SizePx::new(32, 32)),
        )
    }

    fn lay_out(text: &str, origin: PositionPx) -> TextLayout {
        layout(
            &mut font(),
            &mut atlas(),
            codepoints(text.as_bytes()),
            origin,
            SCALE,
        )
        .unwrap()
    }

    #[test]
    fn repeated_glyphs_advance_by_fractional_amounts() {
        let result = lay_out("aaaa", PositionPx::origin());

        // 37 units at 0.25 are 9.25 pixels.
        assert_abs_diff_eq!(result.pen.x, 4.0 * 9.25);
        let positions: Vec<(i32, f32)> = result
            .glyphs
            .iter()
            .map(|g| (g.position.x, g.subpixel_shift))
            .collect();
        // Left side bearing adds one pixel.
        assert_eq!(
            positions,
            [(1, 0.0), (10, 0.25), (19, 0.5), (28, 0.75)]
        );
    }

    #[test]
    fn baseline_is_snapped_below_the_origin() {
        let result = lay_out("a", PositionPx::new(10.0, 10.0));
        let glyph = result.glyphs[0];
        assert_eq!(glyph.position.y, 22);
        // 32 units high at 0.25.
        assert_eq!(glyph.entry.baseline_to_top_px, 8);
        assert_eq!(glyph.top(), 14);
        assert_eq!(glyph.position.x, 11);
    }

    #[test]
    fn kerning_is_applied_between_pairs() {
        let plain = lay_out("AA", PositionPx::origin());
        let kerned = lay_out("AV", PositionPx::origin());
        assert_abs_diff_eq!(plain.pen.x - kerned.pen.x, 2.0);
        assert_eq!(kerned.glyphs[1].position.x, 8);
    }

    #[test]
    fn invisible_glyphs_only_advance() {
        let result = lay_out("a a", PositionPx::origin());
        assert_eq!(result.glyphs.len(), 2);
        assert_abs_diff_eq!(result.pen.x, 9.25 + 4.0 + 9.25);
        assert_eq!(result.glyphs[1].position.x, 14);
        assert_abs_diff_eq!(result.glyphs[1].subpixel_shift, 0.25);
    }

    #[test]
    fn line_feed_resets_the_pen_and_moves_down() {
        let result = lay_out("aa\na", PositionPx::new(3.0, 0.0));
        assert_eq!(result.glyphs.len(), 2 + 1);
        // (48 + 16 + 4) * 0.25 = 17
        let first = result.glyphs[0];
        let third = result.glyphs[2];
        assert_eq!(third.position.y - first.position.y, 17);
        assert_eq!(third.position.x, first.position.x);
        assert_abs_diff_eq!(result.pen.x, 3.0 + 9.25);
        assert_abs_diff_eq!(result.pen.y, 12.0 + 17.0);
    }

    #[test]
    fn empty_input_produces_nothing() {
        let result = lay_out("", PositionPx::new(5.0, 0.0));
        assert!(result.glyphs.is_empty());
        assert_eq!(result.pen, PositionPx::new(5.0, 12.0));
    }

    #[test]
    fn subpixel_split_handles_negative_positions() {
        assert_eq!(split_subpixel(2.5), (2, 0.5));
        assert_eq!(split_subpixel(-0.75), (-1, 0.25));
        assert_eq!(split_subpixel(-3.0), (-3, 0.0));
        assert_eq!(split_subpixel(-1e-9), (0, 0.0));
    }
}
