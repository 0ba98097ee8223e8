//! Chainable node operation wrapper.
//!
//! [`SceneNode`] borrows a [`Scene`] mutably and offers a fluent API for
//! setting up a node. The first failure (a stale handle, a cyclic attach)
//! is kept and every later call becomes a no-op; [`SceneNode::finish`]
//! reports it.
//!
//! # Example
//!
//! ```rust,ignore
//! let handle = scene
//!     .node(handle)
//!     .set_position(Vec3::new(0.0, 3.0, -5.0))
//!     .set_uniform_scale(2.0)
//!     .attach_to(parent)
//!     .finish()?;
//! ```
#![allow(clippy::return_self_not_must_use)]
use std::sync::Arc;

use glam::{Quat, Vec3};

use oktaeder_core::{OktaederError, Result};
use oktaeder_resources::{Material, Mesh};

use crate::scene::Scene;
use crate::{CameraKey, LightKey, NodeHandle};

/// Temporary mutable borrow of a scene node for chainable operations.
#[must_use = "call `finish` to observe errors"]
pub struct SceneNode<'a> {
    scene: &'a mut Scene,
    handle: NodeHandle,
    error: Option<OktaederError>,
}

impl<'a> SceneNode<'a> {
    #[inline]
    pub fn new(scene: &'a mut Scene, handle: NodeHandle) -> Self {
        Self {
            scene,
            handle,
            error: None,
        }
    }

    /// Returns the underlying handle.
    #[inline]
    #[must_use]
    pub fn handle(&self) -> NodeHandle {
        self.handle
    }

    fn apply(mut self, op: impl FnOnce(&mut Scene, NodeHandle) -> Result<()>) -> Self {
        if self.error.is_none()
            && let Err(e) = op(&mut *self.scene, self.handle)
        {
            self.error = Some(e);
        }
        self
    }

    // -- Transform --

    pub fn set_position(self, position: Vec3) -> Self {
        self.apply(|s, h| s.set_translation(h, position))
    }

    pub fn set_rotation(self, rotation: Quat) -> Self {
        self.apply(|s, h| s.set_rotation(h, rotation))
    }

    pub fn set_scale(self, scale: Vec3) -> Self {
        self.apply(|s, h| s.set_scale(h, scale))
    }

    pub fn set_uniform_scale(self, scale: f32) -> Self {
        self.set_scale(Vec3::splat(scale))
    }

    /// Rotates around the local Y axis by `angle` radians (cumulative).
    pub fn rotate_y(self, angle: f32) -> Self {
        self.apply(|s, h| {
            let rotation = s.rotation(h).unwrap_or(Quat::IDENTITY);
            s.set_rotation(h, rotation * Quat::from_rotation_y(angle))
        })
    }

    // -- Hierarchy --

    pub fn attach_to(self, parent: NodeHandle) -> Self {
        self.apply(|s, h| s.attach(h, parent))
    }

    pub fn detach(self) -> Self {
        self.apply(Scene::detach)
    }

    // -- Attachments --

    pub fn set_mesh(self, mesh: Arc<Mesh>, materials: Vec<Arc<Material>>) -> Self {
        self.apply(|s, h| {
            s.set_mesh(h, Some(mesh))?;
            s.set_materials(h, materials)
        })
    }

    pub fn attach_camera(self, camera: CameraKey) -> Self {
        self.apply(|s, h| s.attach_camera(h, camera))
    }

    pub fn attach_light(self, light: LightKey) -> Self {
        self.apply(|s, h| s.attach_light(h, light))
    }

    /// Ends the chain, returning the handle or the first error.
    pub fn finish(self) -> Result<NodeHandle> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.handle),
        }
    }
}
