mod atlas;
mod atlas_surface;
mod glyph_atlas;
mod glyph_rasterization;
mod lcd_filter;

pub use atlas::*;
pub use atlas_surface::*;
pub use glyph_atlas::*;
pub use glyph_rasterization::*;
pub use lcd_filter::*;
