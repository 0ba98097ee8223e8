//! Shader permutations.
//!
//! A mesh's optional vertex streams select one of at most sixteen shader
//! variants. [`ShaderFlags`] is the key, [`generate_vertex_layout`] and
//! [`generate_shader`] produce the variant, and [`PermutationCache`] makes
//! sure each one is built once.

pub mod cache;
pub mod flags;
pub mod forward;
pub mod shader_gen;
pub mod vertex;

pub use cache::PermutationCache;
pub use flags::ShaderFlags;
pub use forward::ForwardPipelineFactory;
pub use shader_gen::generate_shader;
pub use vertex::{GeneratedVertexLayout, VertexStream, generate_vertex_layout};
