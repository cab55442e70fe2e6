pub struct BindGroupLayoutBuilder {
    shader_stages: wgpu::ShaderStages,
    entries: Vec<wgpu::BindGroupLayoutEntry>,
}

impl BindGroupLayoutBuilder {
    pub fn vertex_fragment() -> Self {
        Self::new(wgpu::ShaderStages::VERTEX_FRAGMENT)
    }

    fn new(shader_stages: wgpu::ShaderStages) -> Self {
        Self {
            shader_stages,
            entries: Vec::new(),
        }
    }

    pub fn uniform(self) -> Self {
        self.add_ty(wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        })
    }

    /// A texture that is only read with `textureLoad`, so it needs no sampler.
    pub fn unfiltered_texture(self) -> Self {
        self.add_ty(wgpu::BindingType::Texture {
            multisampled: false,
            view_dimension: wgpu::TextureViewDimension::D2,
            sample_type: wgpu::TextureSampleType::Float { filterable: false },
        })
    }

    fn add_ty(mut self, ty: wgpu::BindingType) -> Self {
        self.entries.push(wgpu::BindGroupLayoutEntry {
            binding: self.entries.len() as _,
            visibility: self.shader_stages,
            ty,
            count: None,
        });
        self
    }

    pub fn build(self, name: &str, device: &wgpu::Device) -> wgpu::BindGroupLayout {
        let descriptor = wgpu::BindGroupLayoutDescriptor {
            label: Some(name),
            entries: &self.entries,
        };
        device.create_bind_group_layout(&descriptor)
    }
}
