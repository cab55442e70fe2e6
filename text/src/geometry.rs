//! Pixel space primitives shared by the atlas, the layout and the renderer.

use serde::{Deserialize, Serialize};

pub struct PixelUnit;
pub type SizePx = euclid::Size2D<u32, PixelUnit>;
pub type PointPx = euclid::Point2D<i32, PixelUnit>;
/// A position with sub-pixel precision.
pub type PositionPx = euclid::Point2D<f32, PixelUnit>;
pub type BoxPx = euclid::Box2D<i32, PixelUnit>;

/// A left / top / right / bottom rectangle in signed 16 bit pixel coordinates.
///
/// This is the compact form instances are sent to the GPU in.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct RectPx {
    pub left: i16,
    pub top: i16,
    pub right: i16,
    pub bottom: i16,
}

impl RectPx {
    pub const fn new(left: i16, top: i16, right: i16, bottom: i16) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> i32 {
        self.right as i32 - self.left as i32
    }

    pub fn height(&self) -> i32 {
        self.bottom as i32 - self.top as i32
    }

    pub fn ltrb(&self) -> [i16; 4] {
        [self.left, self.top, self.right, self.bottom]
    }
}

/// Coordinates outside of the `i16` range are saturated.
impl From<BoxPx> for RectPx {
    fn from(b: BoxPx) -> Self {
        Self::new(
            saturate(b.min.x),
            saturate(b.min.y),
            saturate(b.max.x),
            saturate(b.max.y),
        )
    }
}

pub(crate) fn saturate(v: i32) -> i16 {
    v.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

/// Straight (not pre-multiplied) 8 bit RGBA color.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn premultiplied(&self) -> Self {
        let mul = |c: u8| ((c as u32 * self.a as u32 + 127) / 255) as u8;
        Self::new(mul(self.r), mul(self.g), mul(self.b), self.a)
    }

    /// The color's components normalized to `0..=1`.
    pub fn to_f32(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a].map(|c| c as f32 / 255.0)
    }

    pub fn to_array(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<[u8; 4]> for Rgba8 {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self::new(r, g, b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn premultiply_keeps_opaque_colors() {
        let c = Rgba8::new(218, 218, 218, 255);
        assert_eq!(c.premultiplied(), c);
    }

    #[test]
    fn premultiply_scales_by_alpha() {
        let c = Rgba8::new(255, 128, 0, 128);
        assert_eq!(c.premultiplied(), Rgba8::new(128, 64, 0, 128));
        assert_eq!(Rgba8::new(200, 10, 99, 0).premultiplied(), Rgba8::new(0, 0, 0, 0));
    }

    #[test]
    fn rect_from_box_saturates() {
        let b = BoxPx::new(PointPx::new(-40_000, 3), PointPx::new(12, 40_000));
        assert_eq!(RectPx::from(b), RectPx::new(i16::MIN, 3, 12, i16::MAX));
    }
}
