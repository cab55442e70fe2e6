use std::mem;

use bytemuck::{Pod, Zeroable};
use static_assertions::const_assert_eq;
use wgpu::{BufferAddress, VertexAttribute, VertexBufferLayout, VertexStepMode};

use subpix_text::RenderInstance;

/// A glyph instance as read by the vertex stage.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct InstancePod {
    /// Left, top, right, bottom in framebuffer pixels.
    pub pos: [i16; 4],
    /// Left, top, right, bottom in atlas texels.
    pub tex: [i16; 4],
    /// Pre-multiplied RGBA.
    pub color: [u8; 4],
    pub subpixel_shift: f32,
}

const_assert_eq!(mem::size_of::<InstancePod>(), 24);

impl InstancePod {
    pub fn layout() -> VertexBufferLayout<'static> {
        const ATTRS: [VertexAttribute; 4] = wgpu::vertex_attr_array![
            0 => Sint16x4,
            1 => Sint16x4,
            2 => Unorm8x4,
            3 => Float32
        ];

        VertexBufferLayout {
            array_stride: mem::size_of::<InstancePod>() as BufferAddress,
            step_mode: VertexStepMode::Instance,
            attributes: &ATTRS,
        }
    }
}

/// Per frame shader parameters.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct RenderParams {
    pub half_viewport_size: [f32; 2],
    pub coverage_adjustment: f32,
    pub padding: f32,
}

// WebGL uniform requirement
const_assert_eq!(mem::size_of::<RenderParams>() % 16, 0);

impl RenderParams {
    pub fn new((width, height): (u32, u32), coverage_adjustment: f32) -> Self {
        Self {
            half_viewport_size: [width as f32 / 2.0, height as f32 / 2.0],
            coverage_adjustment,
            padding: 0.0,
        }
    }
}

pub trait ToPod {
    type Pod;
    fn to_pod(&self) -> Self::Pod;
}

impl ToPod for RenderInstance {
    type Pod = InstancePod;

    fn to_pod(&self) -> Self::Pod {
        InstancePod {
            pos: self.pos.ltrb(),
            tex: self.tex.ltrb(),
            color: self.color.to_array(),
            subpixel_shift: self.subpixel_shift,
        }
    }
}

pub trait AsBytes {
    fn as_bytes(&self) -> &[u8];
}

impl<T: Pod> AsBytes for T {
    fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

#[cfg(test)]
mod tests {
    use subpix_text::geometry::{RectPx, Rgba8};

    use super::*;

    #[test]
    fn instance_pod_keeps_the_instance_fields() {
        let instance = RenderInstance {
            pos: RectPx::new(-2, 10, 9, 22),
            tex: RectPx::new(256, 128, 267, 140),
            color: Rgba8::new(218, 218, 218, 255),
            subpixel_shift: 0.75,
        };

        let pod = instance.to_pod();
        assert_eq!(pod.pos, [-2, 10, 9, 22]);
        assert_eq!(pod.tex, [256, 128, 267, 140]);
        assert_eq!(pod.color, [218, 218, 218, 255]);
        assert_eq!(pod.subpixel_shift, 0.75);
        assert_eq!(pod.as_bytes().len(), 24);
    }

    #[test]
    fn instance_layout_matches_the_pod() {
        let layout = InstancePod::layout();
        assert_eq!(layout.array_stride, 24);
        assert_eq!(layout.step_mode, VertexStepMode::Instance);
        let offsets: Vec<u64> = layout.attributes.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, [0, 8, 16, 20]);
    }

    #[test]
    fn params_hold_the_half_viewport() {
        let params = RenderParams::new((400, 101), -0.25);
        assert_eq!(params.half_viewport_size, [200.0, 50.5]);
        assert_eq!(params.coverage_adjustment, -0.25);
        assert_eq!(params.as_bytes().len(), 16);
    }
}
