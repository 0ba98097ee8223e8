use std::sync::Arc;

use glam::{Quat, Vec3};

use oktaeder_resources::{Material, Mesh};

use crate::transform::Transform;
use crate::{CameraKey, LightKey, NodeHandle};

/// A scene graph node.
///
/// Hierarchy links and the transform are only mutable through
/// [`Scene`](crate::Scene), which keeps parent and child lists in sync and
/// propagates invalidation. Mesh and materials are shared and freely
/// assignable.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,

    // === Hierarchy ===
    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,

    // === Spatial ===
    pub(crate) transform: Transform,

    // === Unique attachments ===
    pub(crate) camera: Option<CameraKey>,
    pub(crate) light: Option<LightKey>,

    // === Shared attachments ===
    pub mesh: Option<Arc<Mesh>>,
    /// One material per submesh of `mesh`.
    pub materials: Vec<Arc<Material>>,
}

impl Node {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            children: Vec::new(),
            transform: Transform::new(),
            camera: None,
            light: None,
            mesh: None,
            materials: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.transform.set_translation(translation);
        self
    }

    #[must_use]
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.transform.set_rotation(rotation);
        self
    }

    #[must_use]
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.transform.set_scale(scale);
        self
    }

    #[must_use]
    pub fn with_mesh(mut self, mesh: Arc<Mesh>, materials: Vec<Arc<Material>>) -> Self {
        self.mesh = Some(mesh);
        self.materials = materials;
        self
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    #[inline]
    #[must_use]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    #[inline]
    #[must_use]
    pub fn camera(&self) -> Option<CameraKey> {
        self.camera
    }

    #[inline]
    #[must_use]
    pub fn light(&self) -> Option<LightKey> {
        self.light
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new("Node")
    }
}
