//! GPU-visible data layouts.
//!
//! Each struct mirrors a WGSL struct in `forward.wgsl` byte for byte. Padding
//! fields are spelled out so `bytemuck` can prove there are no hidden holes.

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec3};

use oktaeder_resources::Material;

/// Alignment of every block in the uniform arena
/// (`minUniformBufferOffsetAlignment`).
pub const UNIFORM_ALIGNMENT: usize = 256;

pub const GLOBAL_UNIFORMS_SIZE: u64 = 160;
pub const MATERIAL_UNIFORMS_SIZE: u64 = 64;
pub const OBJECT_UNIFORMS_SIZE: u64 = 128;
/// Stride of one point or directional light record.
pub const LIGHT_RECORD_SIZE: u64 = 32;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GlobalUniforms {
    /// World space to view space: inverse of the camera's world matrix.
    pub view: Mat4,
    pub projection: Mat4,
    pub ambient_light: Vec3,
    pub point_light_count: u32,
    pub directional_light_count: u32,
    pub _padding: [u32; 3],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MaterialUniforms {
    pub base_color: Vec3,
    pub partial_coverage: f32,
    pub transmission: Vec3,
    pub collimation: f32,
    pub occlusion_texture_strength: f32,
    pub roughness: f32,
    pub metallic: f32,
    pub normal_scale: f32,
    pub emissive: Vec3,
    pub ior: f32,
}

impl From<&Material> for MaterialUniforms {
    fn from(material: &Material) -> Self {
        Self {
            base_color: material.base_color,
            partial_coverage: material.partial_coverage,
            transmission: material.transmission,
            collimation: material.collimation,
            occlusion_texture_strength: material.occlusion_texture_strength,
            roughness: material.roughness,
            metallic: material.metallic,
            normal_scale: material.normal_scale,
            emissive: material.emissive,
            ior: material.ior,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ObjectUniforms {
    pub world: Mat4,
    /// Inverse-transpose of the world matrix's upper 3x3, for normals.
    pub normal: Mat4,
}

impl ObjectUniforms {
    #[must_use]
    pub fn new(world: Mat4) -> Self {
        let normal = Mat3::from_mat4(world).inverse().transpose();
        Self {
            world,
            normal: Mat4::from_mat3(normal),
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PointLightRecord {
    pub position: Vec3,
    pub _padding0: u32,
    pub color: Vec3,
    pub _padding1: u32,
}

impl PointLightRecord {
    #[must_use]
    pub fn new(position: Vec3, color: Vec3) -> Self {
        Self {
            position,
            _padding0: 0,
            color,
            _padding1: 0,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DirectionalLightRecord {
    /// Unit vector the light travels along, in world space.
    pub direction: Vec3,
    pub _padding0: u32,
    pub color: Vec3,
    pub _padding1: u32,
}

impl DirectionalLightRecord {
    #[must_use]
    pub fn new(direction: Vec3, color: Vec3) -> Self {
        Self {
            direction,
            _padding0: 0,
            color,
            _padding1: 0,
        }
    }
}

const _: () = assert!(size_of::<GlobalUniforms>() == GLOBAL_UNIFORMS_SIZE as usize);
const _: () = assert!(size_of::<MaterialUniforms>() == MATERIAL_UNIFORMS_SIZE as usize);
const _: () = assert!(size_of::<ObjectUniforms>() == OBJECT_UNIFORMS_SIZE as usize);
const _: () = assert!(size_of::<PointLightRecord>() == LIGHT_RECORD_SIZE as usize);
const _: () = assert!(size_of::<DirectionalLightRecord>() == LIGHT_RECORD_SIZE as usize);
