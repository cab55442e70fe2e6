use tracing::instrument;
use wgpu::util::{BufferInitDescriptor, DeviceExt};

use subpix_text::InstanceBatch;

use crate::{
    AtlasTexture,
    bind_group::BindGroupLayout,
    pods::{AsBytes, InstancePod, RenderParams, ToPod},
    tools::create_pipeline,
};

/// Adds the pre-multiplied color and subtracts the background weighted per channel by the second
/// fragment output.
pub const SUBPIXEL_BLENDING: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::OneMinusSrc1,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::OneMinusSrc1,
        operation: wgpu::BlendOperation::Add,
    },
};

const VERTICES_PER_INSTANCE: u32 = 6;

/// Draws instance batches with subpixel coverage from the atlas texture.
#[derive(Debug)]
pub struct SubpixelTextRenderer {
    pipeline: wgpu::RenderPipeline,
    params_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    batches: Vec<InstanceBuffer>,
}

#[derive(Debug)]
struct InstanceBuffer {
    buffer: wgpu::Buffer,
    instance_count: usize,
}

impl SubpixelTextRenderer {
    pub fn new(
        device: &wgpu::Device,
        target_format: wgpu::TextureFormat,
        atlas: &AtlasTexture,
    ) -> Self {
        let bind_group_layout = BindGroupLayout::new(device);

        let shader =
            &device.create_shader_module(wgpu::include_wgsl!("shader/subpixel_text.wgsl"));

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Subpixel Text Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let targets = [Some(wgpu::ColorTargetState {
            format: target_format,
            blend: Some(SUBPIXEL_BLENDING),
            write_mask: wgpu::ColorWrites::ALL,
        })];

        let vertex_layout = [InstancePod::layout()];

        let pipeline = create_pipeline(
            "Subpixel Text Pipeline",
            device,
            shader,
            "fs_main",
            &vertex_layout,
            &pipeline_layout,
            &targets,
        );

        let params_buffer = device.create_buffer_init(&BufferInitDescriptor {
            label: Some("Subpixel Text Params"),
            contents: RenderParams::new((1, 1), 0.0).as_bytes(),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = bind_group_layout.create_bind_group(device, &params_buffer, atlas.view());

        Self {
            pipeline,
            params_buffer,
            bind_group,
            batches: Vec::new(),
        }
    }

    /// Uploads the parameters and one instance buffer per non-empty batch.
    ///
    /// Glyphs must already be resolved, so that the atlas texture is up to date.
    #[instrument(skip_all)]
    pub fn prepare<'a>(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        viewport_size: (u32, u32),
        coverage_adjustment: f32,
        batches: impl IntoIterator<Item = &'a InstanceBatch>,
    ) {
        let params = RenderParams::new(viewport_size, coverage_adjustment);
        queue.write_buffer(&self.params_buffer, 0, params.as_bytes());

        self.batches.clear();
        for batch in batches {
            if batch.is_empty() {
                continue;
            }
            let pods: Vec<InstancePod> = batch.instances().iter().map(|i| i.to_pod()).collect();
            let buffer = device.create_buffer_init(&BufferInitDescriptor {
                label: Some("Subpixel Text Instance Buffer"),
                contents: bytemuck::cast_slice(&pods),
                usage: wgpu::BufferUsages::VERTEX,
            });
            self.batches.push(InstanceBuffer {
                buffer,
                instance_count: pods.len(),
            });
        }
    }

    /// Records one draw per prepared batch, in order.
    pub fn render(&self, pass: &mut wgpu::RenderPass<'_>) {
        if self.batches.is_empty() {
            return;
        }

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);

        for InstanceBuffer {
            buffer,
            instance_count,
        } in &self.batches
        {
            pass.set_vertex_buffer(0, buffer.slice(..));
            pass.draw(0..VERTICES_PER_INSTANCE, 0..*instance_count as u32);
        }
    }
}
