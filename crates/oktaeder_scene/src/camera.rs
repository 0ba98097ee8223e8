//! Cameras and reversed-Z projections.
//!
//! View space looks down +Z and clip-space `w` equals view-space `z`. Depth
//! is 1 at the near plane and falls to 0 at the far plane, which pairs with a
//! `Greater` depth test and a depth clear value of 0.

use glam::{Mat4, Vec4};

use crate::NodeHandle;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Orthographic {
        /// Half the height of the view volume.
        half_vertical_size: f32,
        near: f32,
        far: f32,
    },
    Perspective {
        /// Full vertical field of view in radians.
        vertical_fov: f32,
        near: f32,
        /// May be `f32::INFINITY`.
        far: f32,
    },
}

impl Projection {
    #[inline]
    #[must_use]
    pub fn near(&self) -> f32 {
        match *self {
            Self::Orthographic { near, .. } | Self::Perspective { near, .. } => near,
        }
    }

    #[inline]
    #[must_use]
    pub fn far(&self) -> f32 {
        match *self {
            Self::Orthographic { far, .. } | Self::Perspective { far, .. } => far,
        }
    }

    /// Column-major projection matrix for the given width / height ratio.
    #[must_use]
    pub fn matrix(&self, aspect_ratio: f32) -> Mat4 {
        match *self {
            Self::Orthographic {
                half_vertical_size,
                near,
                far,
            } => {
                let half_horizontal_size = half_vertical_size * aspect_ratio;
                Mat4::from_cols(
                    Vec4::new(1.0 / half_horizontal_size, 0.0, 0.0, 0.0),
                    Vec4::new(0.0, 1.0 / half_vertical_size, 0.0, 0.0),
                    Vec4::new(0.0, 0.0, 1.0 / (near - far), 0.0),
                    Vec4::new(0.0, 0.0, far / (far - near), 1.0),
                )
            }
            Self::Perspective {
                vertical_fov,
                near,
                far,
            } => {
                let f = 1.0 / (0.5 * vertical_fov).tan();
                let x = Vec4::new(f / aspect_ratio, 0.0, 0.0, 0.0);
                let y = Vec4::new(0.0, f, 0.0, 0.0);
                if far.is_infinite() {
                    Mat4::from_cols(
                        x,
                        y,
                        Vec4::new(0.0, 0.0, 0.0, 1.0),
                        Vec4::new(0.0, 0.0, near, 0.0),
                    )
                } else {
                    Mat4::from_cols(
                        x,
                        y,
                        Vec4::new(0.0, 0.0, near / (near - far), 1.0),
                        Vec4::new(0.0, 0.0, near * far / (far - near), 0.0),
                    )
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Camera {
    pub name: String,
    pub projection: Projection,
    pub(crate) node: Option<NodeHandle>,
}

impl Camera {
    #[must_use]
    pub fn new(projection: Projection) -> Self {
        Self {
            name: "Camera".to_string(),
            projection,
            node: None,
        }
    }

    #[must_use]
    pub fn orthographic(half_vertical_size: f32, near: f32, far: f32) -> Self {
        Self::new(Projection::Orthographic {
            half_vertical_size,
            near,
            far,
        })
    }

    #[must_use]
    pub fn perspective(vertical_fov: f32, near: f32, far: f32) -> Self {
        Self::new(Projection::Perspective {
            vertical_fov,
            near,
            far,
        })
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// The node this camera is attached to.
    #[inline]
    #[must_use]
    pub fn node(&self) -> Option<NodeHandle> {
        self.node
    }

    #[inline]
    #[must_use]
    pub fn projection_matrix(&self, aspect_ratio: f32) -> Mat4 {
        self.projection.matrix(aspect_ratio)
    }
}
