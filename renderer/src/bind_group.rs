use derive_more::Deref;
use wgpu::{BindGroup, Buffer, Device, TextureView};

use crate::{bind_group_entries, tools::BindGroupLayoutBuilder};

/// Render parameters and the glyph atlas.
#[derive(Debug, Deref)]
pub struct BindGroupLayout(wgpu::BindGroupLayout);

impl BindGroupLayout {
    pub fn new(device: &Device) -> Self {
        let layout = BindGroupLayoutBuilder::vertex_fragment()
            // RenderParams
            .uniform()
            .unfiltered_texture()
            .build("Subpixel Text Bind Group Layout", device);

        Self(layout)
    }

    pub fn create_bind_group(
        &self,
        device: &Device,
        params: &Buffer,
        atlas_view: &TextureView,
    ) -> BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Subpixel Text Bind Group"),
            layout: &self.0,
            entries: bind_group_entries!(0 => params, 1 => atlas_view),
        })
    }
}
