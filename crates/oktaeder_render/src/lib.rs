//! Frame assembly, shader permutations and GPU submission.
//!
//! [`FrameAssembler`] is pure CPU work and can be driven without a device.
//! [`Renderer`] wraps it with the wgpu side: resource mirroring, the
//! permutation cache and the forward pass.

pub mod assembler;
pub mod layouts;
pub mod pass;
pub mod pipeline;
pub mod renderer;
pub mod resources;
pub mod settings;
pub mod uniforms;

pub use assembler::{DrawCommand, Frame, FrameAssembler, MaterialEntry, ObjectEntry};
pub use pipeline::{PermutationCache, ShaderFlags, generate_shader, generate_vertex_layout};
pub use renderer::Renderer;
pub use settings::RendererSettings;
pub use uniforms::{
    DirectionalLightRecord, GlobalUniforms, MaterialUniforms, ObjectUniforms, PointLightRecord,
    UNIFORM_ALIGNMENT,
};
