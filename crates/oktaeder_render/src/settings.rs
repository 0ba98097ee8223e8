//! Renderer Settings
//!
//! ```rust,ignore
//! let settings = RendererSettings {
//!     clear_color: wgpu::Color { r: 0.1, g: 0.1, b: 0.1, a: 1.0 },
//!     ..Default::default()
//! };
//! ```

/// Startup configuration of a [`Renderer`](crate::Renderer).
///
/// Buffer sizes are initial allocations. A frame that needs more grows the
/// buffer to the next power of two.
#[derive(Debug, Clone)]
pub struct RendererSettings {
    /// Initial size of the per-frame uniform arena buffer in bytes.
    pub uniform_buffer_size: u64,
    /// Initial size of each light storage buffer in bytes.
    pub light_buffer_size: u64,
    pub clear_color: wgpu::Color,
    /// Anisotropy clamp of the material sampler (1 disables it).
    pub max_anisotropy: u16,
    pub depth_format: wgpu::TextureFormat,
    /// Frames a mesh or texture may go unrendered before its GPU copy is
    /// destroyed.
    pub resource_ttl_frames: u64,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            uniform_buffer_size: 4 * 1024 * 1024,
            light_buffer_size: 32 * 1024,
            clear_color: wgpu::Color::BLACK,
            max_anisotropy: 16,
            depth_format: wgpu::TextureFormat::Depth32Float,
            resource_ttl_frames: 600,
        }
    }
}
