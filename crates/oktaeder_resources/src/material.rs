//! Physically based material parameters.
//!
//! Materials are shared as `Arc<Material>` and deduplicated by pointer, never
//! by value. Build one with struct-update syntax:
//!
//! ```rust,ignore
//! let gold = Arc::new(Material {
//!     name: "Gold".into(),
//!     base_color: Vec3::new(1.0, 0.78, 0.34),
//!     roughness: 0.3,
//!     ..Default::default()
//! });
//! ```

use std::sync::Arc;

use glam::Vec3;

use crate::texture::Texture2D;

#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,

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

    /// RGB base color, A partial coverage.
    pub base_color_partial_coverage_texture: Option<Arc<Texture2D>>,
    /// R occlusion.
    pub occlusion_texture: Option<Arc<Texture2D>>,
    /// G roughness, B metallic.
    pub roughness_metallic_texture: Option<Arc<Texture2D>>,
    /// Tangent-space normal.
    pub normal_texture: Option<Arc<Texture2D>>,
    pub emissive_texture: Option<Arc<Texture2D>>,
    /// RGB transmission, A collimation.
    pub transmission_collimation_texture: Option<Arc<Texture2D>>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "Material".to_string(),
            base_color: Vec3::ONE,
            partial_coverage: 1.0,
            transmission: Vec3::ZERO,
            collimation: 1.0,
            occlusion_texture_strength: 1.0,
            roughness: 1.0,
            metallic: 1.0,
            normal_scale: 1.0,
            emissive: Vec3::ZERO,
            ior: 1.45,
            base_color_partial_coverage_texture: None,
            occlusion_texture: None,
            roughness_metallic_texture: None,
            normal_texture: None,
            emissive_texture: None,
            transmission_collimation_texture: None,
        }
    }
}

impl Material {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}
