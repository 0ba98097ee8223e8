//! oktaeder
//!
//! A small physically based forward renderer built on wgpu.
//!
//! The workspace splits into:
//!
//! - [`core`]: error type, binary writer and identity mapping
//! - [`resources`]: CPU-side vertex/index buffers, textures, materials, meshes
//! - [`scene`]: node hierarchy with lazy world matrices, cameras and lights
//! - [`render`]: frame assembly, shader permutations and the wgpu renderer
//!
//! ```rust,ignore
//! use oktaeder::prelude::*;
//!
//! let mut scene = Scene::new();
//! let camera = scene.add_camera(Camera::perspective(FRAC_PI_2, 0.1, f32::INFINITY));
//! let eye = scene.create_node("Eye");
//! scene
//!     .node(eye)
//!     .set_position(Vec3::new(0.0, 0.0, 5.0))
//!     .attach_camera(camera)
//!     .finish()?;
//!
//! let mut renderer = Renderer::new(device, queue, surface_format, RendererSettings::default());
//! renderer.render(&mut scene, camera, &view, width, height)?;
//! ```

pub use oktaeder_core as core;
pub use oktaeder_render as render;
pub use oktaeder_resources as resources;
pub use oktaeder_scene as scene;

pub use oktaeder_core::{OktaederError, Result};
pub use oktaeder_render::{FrameAssembler, Renderer, RendererSettings};
pub use oktaeder_resources::{
    IndexBuffer, IndexFormat, Material, Mesh, Submesh, Texture2D, TextureFormat, VertexBuffer,
    VertexBufferDescriptor, VertexWrite,
};
pub use oktaeder_scene::{Camera, CameraKey, Light, LightKey, NodeHandle, Scene};

pub mod prelude {
    pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

    pub use crate::{
        Camera, CameraKey, FrameAssembler, IndexBuffer, IndexFormat, Light, LightKey, Material,
        Mesh, NodeHandle, OktaederError, Renderer, RendererSettings, Result, Scene, Submesh,
        Texture2D, TextureFormat, VertexBuffer, VertexBufferDescriptor, VertexWrite,
    };
}
