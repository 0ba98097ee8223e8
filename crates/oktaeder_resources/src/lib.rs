//! CPU-side resources.
//!
//! Every resource here owns its data on the CPU and carries a [`ResourceId`]
//! plus a version counter. The render crate mirrors them on the GPU and
//! re-uploads only when the version moves.

pub mod id;
pub mod index_buffer;
pub mod material;
pub mod mesh;
pub mod texture;
pub mod vertex_buffer;

pub use id::ResourceId;
pub use index_buffer::{IndexBuffer, IndexFormat};
pub use material::Material;
pub use mesh::{Mesh, Submesh};
pub use texture::{Texture2D, TextureFormat};
pub use vertex_buffer::{VertexAttribute, VertexBuffer, VertexBufferDescriptor, VertexWrite};
