//! wgpu backend for subpixel text: the atlas texture, instance buffers and a dual source blending
//! pipeline.

mod atlas_texture;
mod bind_group;
mod pods;
mod render_device;
mod renderer;
mod text_renderer;
mod tools;

pub use atlas_texture::*;
pub use pods::{InstancePod, RenderParams, ToPod};
pub use render_device::*;
pub use renderer::*;
pub use text_renderer::*;
