//! GPU-side resources: growable buffers, textures and the manager that keeps
//! them in sync with their CPU counterparts.

pub mod buffer;
pub mod manager;
pub mod texture;

pub use buffer::GpuBuffer;
pub use manager::{Fallback, ResourceManager, material_maps};
pub use texture::{GpuTexture, wgpu_format};
