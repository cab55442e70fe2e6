use std::fmt;

use super::{CoverageBitmap, HORIZONTAL_RESOLUTION};
use crate::geometry::{PointPx, SizePx};

/// The RGB8 texture glyph bitmaps are stored in.
///
/// Written only through sub-rectangle uploads.
pub trait AtlasSurface {
    fn size(&self) -> SizePx;

    /// Copy `bitmap` into the surface with its top left corner at `origin`.
    fn upload(&mut self, origin: PointPx, bitmap: &CoverageBitmap);
}

/// An atlas surface in main memory.
///
/// Used for headless composition and to verify what a GPU texture would contain.
#[derive(Clone)]
pub struct CpuAtlasSurface {
    size: SizePx,
    data: Vec<u8>,
    uploads: usize,
}

impl fmt::Debug for CpuAtlasSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CpuAtlasSurface")
            .field("size", &self.size)
            .field("uploads", &self.uploads)
            .finish()
    }
}

impl CpuAtlasSurface {
    pub fn new(size: SizePx) -> Self {
        Self {
            size,
            data: vec![0; size.area() as usize * HORIZONTAL_RESOLUTION],
            uploads: 0,
        }
    }

    /// Number of uploads so far.
    pub fn uploads(&self) -> usize {
        self.uploads
    }

    /// The texel at `x`, `y`. Out of bounds texels are black.
    pub fn texel(&self, x: i32, y: i32) -> [u8; 3] {
        if x < 0 || y < 0 || x as u32 >= self.size.width || y as u32 >= self.size.height {
            return [0; 3];
        }
        let offset = (y as usize * self.size.width as usize + x as usize) * HORIZONTAL_RESOLUTION;
        [
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
        ]
    }
}

impl AtlasSurface for CpuAtlasSurface {
    fn size(&self) -> SizePx {
        self.size
    }

    fn upload(&mut self, origin: PointPx, bitmap: &CoverageBitmap) {
        self.uploads += 1;

        let surface_stride = self.size.width as usize * HORIZONTAL_RESOLUTION;
        // Clip against the surface.
        let columns = (bitmap.width() as i32).min(self.size.width as i32 - origin.x);
        let rows = (bitmap.height() as i32).min(self.size.height as i32 - origin.y);
        if origin.x < 0 || origin.y < 0 || columns <= 0 || rows <= 0 {
            log::warn!("Upload at {origin:?} is outside of the atlas surface");
            return;
        }

        let row_bytes = columns as usize * HORIZONTAL_RESOLUTION;
        for y in 0..rows as u32 {
            let dest = (origin.y as usize + y as usize) * surface_stride
                + origin.x as usize * HORIZONTAL_RESOLUTION;
            self.data[dest..dest + row_bytes].copy_from_slice(&bitmap.row(y)[..row_bytes]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_writes_the_sub_rectangle_only() {
        let mut surface = CpuAtlasSurface::new(SizePx::new(8, 8));
        let data: Vec<u8> = (1..=12).collect();
        let bitmap = CoverageBitmap::new(2, 2, data);

        surface.upload(PointPx::new(3, 5), &bitmap);

        assert_eq!(surface.uploads(), 1);
        assert_eq!(surface.texel(3, 5), [1, 2, 3]);
        assert_eq!(surface.texel(4, 5), [4, 5, 6]);
        assert_eq!(surface.texel(3, 6), [7, 8, 9]);
        assert_eq!(surface.texel(4, 6), [10, 11, 12]);
        assert_eq!(surface.texel(2, 5), [0, 0, 0]);
        assert_eq!(surface.texel(5, 6), [0, 0, 0]);
        assert_eq!(surface.texel(-1, 0), [0, 0, 0]);
    }

    #[test]
    fn upload_is_clipped_at_the_edges() {
        let mut surface = CpuAtlasSurface::new(SizePx::new(4, 4));
        let bitmap = CoverageBitmap::new(3, 3, vec![255; 27]);
        surface.upload(PointPx::new(2, 2), &bitmap);
        assert_eq!(surface.texel(3, 3), [255; 3]);
        assert_eq!(surface.texel(1, 3), [0; 3]);
    }
}
