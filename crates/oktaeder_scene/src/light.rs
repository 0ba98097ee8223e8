use glam::Vec3;

use crate::NodeHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightKind {
    /// Emits from the node's world position.
    Point,
    /// Shines along the node's world -Z axis.
    Directional,
}

#[derive(Debug, Clone)]
pub struct Light {
    pub name: String,
    pub kind: LightKind,
    /// Linear RGB, premultiplied by intensity.
    pub color: Vec3,
    pub(crate) node: Option<NodeHandle>,
}

impl Light {
    #[must_use]
    pub fn point(color: Vec3) -> Self {
        Self {
            name: "PointLight".to_string(),
            kind: LightKind::Point,
            color,
            node: None,
        }
    }

    #[must_use]
    pub fn directional(color: Vec3) -> Self {
        Self {
            name: "DirectionalLight".to_string(),
            kind: LightKind::Directional,
            color,
            node: None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// The node this light is attached to.
    #[inline]
    #[must_use]
    pub fn node(&self) -> Option<NodeHandle> {
        self.node
    }
}
