//! Subpixel (LCD) text: from UTF-8 bytes to batches of glyph instances referencing an RGB coverage
//! atlas.

pub mod config;
pub mod decoder;
mod error;
pub mod font;
pub mod geometry;
pub mod glyph;
mod instance_batch;
mod layout;
pub mod subpixel;

pub use error::*;
pub use instance_batch::*;
pub use layout::*;

use crate::{
    decoder::codepoints,
    font::FontBackend,
    geometry::{PositionPx, Rgba8},
    glyph::{AtlasAllocator, AtlasSurface, GlyphAtlas},
};

/// Decodes, lays out and appends the instances of `text` to `sink`.
///
/// Decoding stops at the end of `text` or at the first zero byte. Returns the layout of all
/// visible glyphs.
pub fn append_text<S: AtlasSurface, A: AtlasAllocator>(
    font: &mut impl FontBackend,
    atlas: &mut GlyphAtlas<S, A>,
    sink: &mut impl InstanceSink,
    text: &[u8],
    origin: PositionPx,
    font_scale: f32,
    color: Rgba8,
) -> Result<TextLayout, TextError> {
    let layout = layout(font, atlas, codepoints(text), origin, font_scale)?;
    for glyph in &layout.glyphs {
        sink.append(RenderInstance::from_glyph(glyph, color))?;
    }
    Ok(layout)
}
