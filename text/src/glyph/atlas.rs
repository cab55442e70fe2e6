//! Region allocators for the glyph atlas.
//!
//! Allocation is separate from the atlas' codepoint to entry mapping. Allocators hand out
//! regions, they never free them.
use etagere::BucketedAtlasAllocator;
use euclid::size2;

use crate::{
    decoder::Codepoint,
    error::AtlasFull,
    geometry::{BoxPx, PointPx, SizePx},
};

pub trait AtlasAllocator {
    /// `false` if glyphs of `codepoint` can never be stored, regardless of their size.
    fn supports(&self, codepoint: Codepoint) -> bool;

    /// Allocate a region of `size` pixels for the glyph of `codepoint`.
    fn allocate(&mut self, codepoint: Codepoint, size: SizePx) -> Result<BoxPx, AtlasFull>;
}

impl<A: AtlasAllocator + ?Sized> AtlasAllocator for Box<A> {
    fn supports(&self, codepoint: Codepoint) -> bool {
        (**self).supports(codepoint)
    }

    fn allocate(&mut self, codepoint: Codepoint, size: SizePx) -> Result<BoxPx, AtlasFull> {
        (**self).allocate(codepoint, size)
    }
}

pub(crate) fn atlas_full(codepoint: Codepoint, size: SizePx) -> AtlasFull {
    AtlasFull {
        codepoint,
        width: size.width,
        height: size.height,
    }
}

/// A fixed grid of equally sized cells, one per codepoint, in row-major order.
///
/// Can only address the first `columns * rows` codepoints and wastes most of its space. Simple,
/// and the region of a glyph is predictable.
#[derive(Debug)]
pub struct GridAllocator {
    cell_size: SizePx,
    columns: u32,
    rows: u32,
    occupied: Vec<bool>,
}

impl GridAllocator {
    pub fn new(atlas_size: SizePx, cell_size: SizePx) -> Self {
        assert!(!cell_size.is_empty(), "Grid cells must not be empty");
        let columns = atlas_size.width / cell_size.width;
        let rows = atlas_size.height / cell_size.height;
        Self {
            cell_size,
            columns,
            rows,
            occupied: vec![false; (columns * rows) as usize],
        }
    }

    /// The number of codepoints that can be stored, starting at 0.
    pub fn capacity(&self) -> u32 {
        self.columns * self.rows
    }

    pub fn cell_origin(&self, codepoint: Codepoint) -> Option<PointPx> {
        if codepoint >= self.capacity() {
            return None;
        }
        let column = codepoint % self.columns;
        let row = codepoint / self.columns;
        Some(PointPx::new(
            (column * self.cell_size.width) as i32,
            (row * self.cell_size.height) as i32,
        ))
    }
}

impl AtlasAllocator for GridAllocator {
    fn supports(&self, codepoint: Codepoint) -> bool {
        codepoint < self.capacity()
    }

    fn allocate(&mut self, codepoint: Codepoint, size: SizePx) -> Result<BoxPx, AtlasFull> {
        let fits = size.width <= self.cell_size.width && size.height <= self.cell_size.height;
        let origin = self.cell_origin(codepoint).filter(|_| fits);
        let Some(origin) = origin else {
            return Err(atlas_full(codepoint, size));
        };

        let occupied = &mut self.occupied[codepoint as usize];
        if *occupied {
            return Err(atlas_full(codepoint, size));
        }
        *occupied = true;

        Ok(BoxPx::from_origin_and_size(origin, size.cast()))
    }
}

/// Packs glyphs of any codepoint tightly, backed by etagere's bucketed shelf allocator.
pub struct PackedAllocator {
    allocator: BucketedAtlasAllocator,
}

impl std::fmt::Debug for PackedAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackedAllocator").finish_non_exhaustive()
    }
}

impl PackedAllocator {
    /// Empty column left of each region. Compositing reads the texel left of a glyph's first
    /// column, which must not belong to another glyph.
    const GUARD_COLUMNS: i32 = 1;

    pub fn new(atlas_size: SizePx) -> Self {
        let allocator =
            BucketedAtlasAllocator::new(size2(atlas_size.width as i32, atlas_size.height as i32));
        Self { allocator }
    }
}

impl AtlasAllocator for PackedAllocator {
    fn supports(&self, _codepoint: Codepoint) -> bool {
        true
    }

    fn allocate(&mut self, codepoint: Codepoint, size: SizePx) -> Result<BoxPx, AtlasFull> {
        let guarded = size2(
            size.width as i32 + Self::GUARD_COLUMNS,
            size.height as i32,
        );

        let Some(allocation) = self.allocator.allocate(guarded) else {
            log::debug!("No room left for {size:?} (U+{codepoint:04X})");
            return Err(atlas_full(codepoint, size));
        };

        let min = allocation.rectangle.min;
        let origin = PointPx::new(min.x + Self::GUARD_COLUMNS, min.y);
        Ok(BoxPx::from_origin_and_size(origin, size.cast()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_cells_are_addressed_by_codepoint() {
        let mut grid = GridAllocator::new(SizePx::new(512, 512), SizePx::new(32, 32));
        assert_eq!(grid.capacity(), 256);

        let region = grid.allocate('H' as Codepoint, SizePx::new(10, 12)).unwrap();
        // 'H' is 72: column 8, row 4.
        assert_eq!(region.min, PointPx::new(256, 128));
        assert_eq!(region.max, PointPx::new(266, 140));
    }

    #[test]
    fn grid_rejects_out_of_range_oversized_and_occupied() {
        let mut grid = GridAllocator::new(SizePx::new(512, 512), SizePx::new(32, 32));
        let size = SizePx::new(8, 8);

        assert_eq!(
            grid.allocate(256, size),
            Err(AtlasFull {
                codepoint: 256,
                width: 8,
                height: 8
            })
        );
        assert!(grid.allocate('a' as Codepoint, SizePx::new(33, 8)).is_err());
        assert!(grid.allocate('a' as Codepoint, size).is_ok());
        assert!(grid.allocate('a' as Codepoint, size).is_err());

        assert!(grid.supports(255));
        assert!(!grid.supports(256));
    }

    #[test]
    fn packed_regions_do_not_overlap_and_keep_a_guard_column() {
        let mut packed = PackedAllocator::new(SizePx::new(128, 128));
        let regions: Vec<BoxPx> = (0..20)
            .map(|i| packed.allocate(0x4E00 + i, SizePx::new(9, 14)).unwrap())
            .collect();

        for (i, a) in regions.iter().enumerate() {
            assert_eq!(a.size().width, 9);
            assert_eq!(a.size().height, 14);
            assert!(a.min.x >= 1);
            let guarded_a = BoxPx::new(PointPx::new(a.min.x - 1, a.min.y), a.max);
            for b in &regions[i + 1..] {
                assert!(!guarded_a.intersects(b), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn packed_reports_full() {
        let mut packed = PackedAllocator::new(SizePx::new(32, 32));
        assert!(packed.allocate('x' as Codepoint, SizePx::new(64, 8)).is_err());
        assert!(packed.supports(0x10FFFF));
    }
}
