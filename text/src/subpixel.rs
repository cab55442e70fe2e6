//! Subpixel compositing on the CPU.
//!
//! This is what the renderer's fragment stage computes per pixel, also used to verify rendered
//! text without a GPU. Glyphs are rasterized at phase 0. A fractional shift is approximated by
//! moving coverage from the glyph's subpixels towards the subpixels of the texel to its left, in
//! three linear bands of a third of a pixel each.
use crate::{
    geometry::SizePx,
    glyph::CpuAtlasSurface,
    instance_batch::{InstanceBatch, RenderInstance},
};

pub type Rgb = [f32; 3];

fn mix(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Coverage of a pixel whose glyph is shifted right by `shift` (`0..1`) pixels.
///
/// `current` is the texel at the pixel, `previous` the texel left of it.
pub fn shift_coverages(current: Rgb, previous: Rgb, shift: f32) -> Rgb {
    let [r, g, b] = current;
    let [pr, pg, pb] = previous;

    if shift <= 1.0 / 3.0 {
        let z = shift * 3.0;
        [mix(r, pb, z), mix(g, r, z), mix(b, g, z)]
    } else if shift <= 2.0 / 3.0 {
        let z = shift * 3.0 - 1.0;
        [mix(pb, pg, z), mix(r, pb, z), mix(g, r, z)]
    } else {
        let z = shift * 3.0 - 2.0;
        [mix(pg, pr, z), mix(pb, pg, z), mix(r, pb, z)]
    }
}

/// Makes coverage heavier (`adjustment > 0`) or lighter (`adjustment < 0`).
pub fn adjust_coverages(coverages: Rgb, adjustment: f32) -> Rgb {
    if adjustment >= 0.0 {
        coverages.map(|c| (c * (1.0 + adjustment)).min(1.0))
    } else {
        coverages.map(|c| (1.0 - (1.0 - c) * (1.0 - adjustment)).max(0.0))
    }
}

/// Blends a pre-multiplied `color` onto `destination`, each channel weighted by its own coverage.
///
/// Equivalent to dual source blending with `One` and `OneMinusSrc1`, where the first source is
/// `color * coverage` and the second `color.a * coverage`.
pub fn blend(destination: Rgb, color: [f32; 4], coverages: Rgb) -> Rgb {
    let alpha = color[3];
    std::array::from_fn(|i| {
        color[i] * coverages[i] + destination[i] * (1.0 - alpha * coverages[i])
    })
}

/// An RGB float framebuffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Framebuffer {
    size: SizePx,
    pixels: Vec<Rgb>,
}

impl Framebuffer {
    pub fn new(size: SizePx, background: Rgb) -> Self {
        Self {
            size,
            pixels: vec![background; size.area() as usize],
        }
    }

    pub fn size(&self) -> SizePx {
        self.size
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        self.pixels[self.index(x, y)]
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    /// Quantized to 8 bits per channel.
    pub fn to_rgb8(&self) -> Vec<[u8; 3]> {
        self.pixels
            .iter()
            .map(|p| p.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8))
            .collect()
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.size.width as usize + x as usize
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct SoftwareCompositor {
    pub coverage_adjustment: f32,
}

impl SoftwareCompositor {
    pub fn new(coverage_adjustment: f32) -> Self {
        Self {
            coverage_adjustment,
        }
    }

    pub fn composite(
        &self,
        atlas: &CpuAtlasSurface,
        batch: &InstanceBatch,
        target: &mut Framebuffer,
    ) {
        for instance in batch.instances() {
            self.composite_instance(atlas, instance, target);
        }
    }

    fn composite_instance(
        &self,
        atlas: &CpuAtlasSurface,
        instance: &RenderInstance,
        target: &mut Framebuffer,
    ) {
        let pos = instance.pos;
        let size = target.size();
        let x_range = (pos.left as i32).max(0)..(pos.right as i32).min(size.width as i32);
        let y_range = (pos.top as i32).max(0)..(pos.bottom as i32).min(size.height as i32);
        let color = instance.color.to_f32();

        for y in y_range {
            let tex_y = instance.tex.top as i32 + (y - pos.top as i32);
            for x in x_range.clone() {
                let tex_x = instance.tex.left as i32 + (x - pos.left as i32);
                let current = texel_coverages(atlas, tex_x, tex_y);
                let previous = texel_coverages(atlas, tex_x - 1, tex_y);
                let coverages = adjust_coverages(
                    shift_coverages(current, previous, instance.subpixel_shift),
                    self.coverage_adjustment,
                );

                let index = target.index(x as u32, y as u32);
                target.pixels[index] = blend(target.pixels[index], color, coverages);
            }
        }
    }
}

fn texel_coverages(atlas: &CpuAtlasSurface, x: i32, y: i32) -> Rgb {
    atlas.texel(x, y).map(|c| c as f32 / 255.0)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::{
        geometry::{PointPx, RectPx, Rgba8},
        glyph::{AtlasSurface, CoverageBitmap},
        instance_batch::InstanceSink,
    };

    const CURRENT: Rgb = [0.9, 0.6, 0.3];
    const PREVIOUS: Rgb = [0.1, 0.2, 0.4];

    fn assert_rgb_eq(a: Rgb, b: Rgb) {
        for i in 0..3 {
            assert_abs_diff_eq!(a[i], b[i], epsilon = 1e-5);
        }
    }

    #[test]
    fn zero_shift_keeps_the_texel() {
        assert_rgb_eq(shift_coverages(CURRENT, PREVIOUS, 0.0), CURRENT);
    }

    #[test]
    fn band_edges_move_by_whole_subpixels() {
        // One subpixel: previous blue enters red.
        assert_rgb_eq(
            shift_coverages(CURRENT, PREVIOUS, 1.0 / 3.0),
            [0.4, 0.9, 0.6],
        );
        // Two subpixels.
        assert_rgb_eq(
            shift_coverages(CURRENT, PREVIOUS, 2.0 / 3.0),
            [0.2, 0.4, 0.9],
        );
        // Approaching three subpixels, the previous texel takes over.
        assert_rgb_eq(
            shift_coverages(CURRENT, PREVIOUS, 0.999_999),
            [0.1, 0.2, 0.4],
        );
    }

    #[test]
    fn bands_interpolate_linearly() {
        let half = shift_coverages(CURRENT, PREVIOUS, 0.5);
        assert_rgb_eq(half, [0.3, 0.65, 0.75]);
    }

    #[test]
    fn coverage_adjustment() {
        let c = [0.0, 0.5, 1.0];
        assert_rgb_eq(adjust_coverages(c, 0.0), c);
        assert_rgb_eq(adjust_coverages(c, 1.0), [0.0, 1.0, 1.0]);
        assert_rgb_eq(adjust_coverages(c, -1.0), [0.0, 0.0, 1.0]);
        assert_rgb_eq(adjust_coverages(c, -0.5), [0.0, 0.25, 1.0]);
    }

    #[test]
    fn blending_weights_each_channel_independently() {
        let gray = [0.25; 3];
        let white = [1.0; 4];
        assert_rgb_eq(blend(gray, white, [1.0, 0.0, 0.5]), [1.0, 0.25, 0.625]);

        let translucent = Rgba8::new(255, 0, 0, 128).premultiplied().to_f32();
        let out = blend([0.0; 3], translucent, [1.0; 3]);
        assert_abs_diff_eq!(out[0], 128.0 / 255.0, epsilon = 1e-6);
        assert_abs_diff_eq!(out[1], 0.0);
    }

    #[test]
    fn compositor_reads_the_instance_region() {
        let mut atlas = CpuAtlasSurface::new(SizePx::new(16, 16));
        // Two pixels, the second fully covered.
        let bitmap = CoverageBitmap::new(2, 1, vec![0, 0, 0, 255, 255, 255]);
        atlas.upload(PointPx::new(4, 2), &bitmap);

        let mut batch = InstanceBatch::new(1);
        batch
            .append(RenderInstance {
                pos: RectPx::new(1, 1, 3, 2),
                tex: RectPx::new(4, 2, 6, 3),
                color: Rgba8::new(255, 255, 255, 255),
                subpixel_shift: 0.0,
            })
            .unwrap();

        let background = [0.25; 3];
        let mut target = Framebuffer::new(SizePx::new(4, 4), background);
        SoftwareCompositor::default().composite(&atlas, &batch, &mut target);

        assert_rgb_eq(target.pixel(1, 1), background);
        assert_rgb_eq(target.pixel(2, 1), [1.0; 3]);
        assert_rgb_eq(target.pixel(0, 1), background);
        assert_rgb_eq(target.pixel(2, 2), background);
    }

    #[test]
    fn shifted_instance_spills_into_the_padding_column() {
        let mut atlas = CpuAtlasSurface::new(SizePx::new(16, 16));
        let bitmap = CoverageBitmap::new(2, 1, vec![255, 255, 255, 0, 0, 0]);
        atlas.upload(PointPx::new(4, 0), &bitmap);

        let mut batch = InstanceBatch::new(1);
        batch
            .append(RenderInstance {
                pos: RectPx::new(0, 0, 2, 1),
                tex: RectPx::new(4, 0, 6, 1),
                color: Rgba8::new(255, 255, 255, 255),
                subpixel_shift: 1.0 / 3.0,
            })
            .unwrap();

        let mut target = Framebuffer::new(SizePx::new(2, 1), [0.0; 3]);
        SoftwareCompositor::default().composite(&atlas, &batch, &mut target);

        assert_rgb_eq(target.pixel(0, 0), [0.0, 1.0, 1.0]);
        assert_rgb_eq(target.pixel(1, 0), [1.0, 0.0, 0.0]);
        assert_eq!(target.to_rgb8()[1], [255, 0, 0]);
    }
}
