//! The glyph atlas on the GPU.
use tracing::instrument;
use wgpu::{
    Device, Extent3d, Origin3d, Queue, TexelCopyBufferLayout, TexelCopyTextureInfo, Texture,
    TextureAspect, TextureDescriptor, TextureDimension, TextureFormat, TextureUsages, TextureView,
    TextureViewDescriptor,
};

use subpix_text::{
    geometry::{PointPx, SizePx},
    glyph::{AtlasSurface, CoverageBitmap},
};

/// An RGBA texture holding the RGB coverage of the rasterized glyphs. Alpha is unused.
#[derive(Debug)]
pub struct AtlasTexture {
    texture: Texture,
    view: TextureView,
    queue: Queue,
    size: SizePx,
    /// Reused row expansion buffer.
    rgba: Vec<u8>,
}

impl AtlasTexture {
    const FORMAT: TextureFormat = TextureFormat::Rgba8Unorm;
    const BYTES_PER_TEXEL: usize = 4;

    pub fn new(device: &Device, queue: &Queue, size: SizePx) -> Self {
        let texture = device.create_texture(&TextureDescriptor {
            label: Some("Subpixel Glyph Atlas"),
            size: Extent3d {
                width: size.width,
                height: size.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: Self::FORMAT,
            usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let view = texture.create_view(&TextureViewDescriptor::default());

        Self {
            texture,
            view,
            queue: queue.clone(),
            size,
            rgba: Vec::new(),
        }
    }

    pub fn view(&self) -> &TextureView {
        &self.view
    }
}

impl AtlasSurface for AtlasTexture {
    fn size(&self) -> SizePx {
        self.size
    }

    /// Upload the bitmap to the GPU into the atlas texture at the given position.
    #[instrument(skip_all)]
    fn upload(&mut self, origin: PointPx, bitmap: &CoverageBitmap) {
        let (x, y) = (origin.x, origin.y);
        let (width, height) = (bitmap.width(), bitmap.height());
        if x < 0
            || y < 0
            || x as u32 + width > self.size.width
            || y as u32 + height > self.size.height
        {
            log::warn!("Upload of {width}x{height} at {origin:?} is outside of the atlas texture");
            return;
        }

        expand_to_rgba(bitmap, &mut self.rgba);

        self.queue.write_texture(
            TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: Origin3d {
                    x: x as u32,
                    y: y as u32,
                    z: 0,
                },
                aspect: TextureAspect::All,
            },
            &self.rgba,
            TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * Self::BYTES_PER_TEXEL as u32),
                rows_per_image: None,
            },
            Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
    }
}

/// RGB to opaque RGBA.
fn expand_to_rgba(bitmap: &CoverageBitmap, rgba: &mut Vec<u8>) {
    rgba.clear();
    rgba.extend(
        bitmap
            .data()
            .chunks_exact(3)
            .flat_map(|rgb| [rgb[0], rgb[1], rgb[2], u8::MAX]),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_coverage_expands_to_opaque_rgba() {
        let bitmap = CoverageBitmap::new(2, 1, vec![1, 2, 3, 4, 5, 6]);
        let mut rgba = vec![9; 3];
        expand_to_rgba(&bitmap, &mut rgba);
        assert_eq!(rgba, [1, 2, 3, 255, 4, 5, 6, 255]);
    }
}
