use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};
use slotmap::SlotMap;

use oktaeder_core::{OktaederError, Result};
use oktaeder_resources::{Material, Mesh};

use crate::camera::Camera;
use crate::light::Light;
use crate::node::Node;
use crate::transform_system;
use crate::traversal::PreOrder;
use crate::wrapper::SceneNode;
use crate::{CameraKey, LightKey, NodeHandle};

/// Scene graph container.
///
/// Owns every node, camera and light. Nodes reachable from `root_nodes` are
/// what gets rendered. The scene holds no per-frame state; the only caches
/// are the matrices inside each node's transform.
pub struct Scene {
    pub(crate) nodes: SlotMap<NodeHandle, Node>,
    pub(crate) root_nodes: Vec<NodeHandle>,

    pub(crate) cameras: SlotMap<CameraKey, Camera>,
    pub(crate) lights: SlotMap<LightKey, Light>,

    /// Linear RGB ambient term added to every lit surface.
    pub ambient_light: Vec3,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            root_nodes: Vec::new(),
            cameras: SlotMap::with_key(),
            lights: SlotMap::with_key(),
            ambient_light: Vec3::ZERO,
        }
    }

    // ========================================================================
    // Node lifecycle
    // ========================================================================

    /// Inserts `node` as a new root.
    pub fn add_node(&mut self, mut node: Node) -> NodeHandle {
        node.parent = None;
        node.children.clear();
        node.camera = None;
        node.light = None;
        // a cloned node carries the world matrix of its old position
        node.transform.mark_world_dirty();
        let handle = self.nodes.insert(node);
        self.root_nodes.push(handle);
        handle
    }

    /// Creates an empty root node.
    pub fn create_node(&mut self, name: impl Into<String>) -> NodeHandle {
        self.add_node(Node::new(name))
    }

    /// Inserts `node` as the last child of `parent`.
    pub fn add_to_parent(&mut self, mut node: Node, parent: NodeHandle) -> Result<NodeHandle> {
        if !self.nodes.contains_key(parent) {
            return Err(OktaederError::NodeNotFound(format!("{parent:?}")));
        }
        node.parent = Some(parent);
        node.children.clear();
        node.camera = None;
        node.light = None;
        // a cloned node carries the world matrix of its old position
        node.transform.mark_world_dirty();
        let handle = self.nodes.insert(node);
        self.nodes[parent].children.push(handle);
        Ok(handle)
    }

    /// Removes a node and its whole subtree. Cameras and lights attached to
    /// removed nodes stay in the scene, detached. Stale handles are ignored.
    pub fn remove_node(&mut self, handle: NodeHandle) {
        let Some(node) = self.nodes.get(handle) else {
            return;
        };

        match node.parent {
            Some(parent) => {
                if let Some(p) = self.nodes.get_mut(parent)
                    && let Some(i) = p.children.iter().position(|&c| c == handle)
                {
                    p.children.remove(i);
                }
            }
            None => self.root_nodes.retain(|&r| r != handle),
        }

        let mut stack = vec![handle];
        while let Some(h) = stack.pop() {
            let Some(removed) = self.nodes.remove(h) else {
                continue;
            };
            if let Some(camera) = removed.camera.and_then(|c| self.cameras.get_mut(c)) {
                log::debug!("Camera [{}] detached: node [{}] removed", camera.name, removed.name);
                camera.node = None;
            }
            if let Some(light) = removed.light.and_then(|l| self.lights.get_mut(l)) {
                log::debug!("Light [{}] detached: node [{}] removed", light.name, removed.name);
                light.node = None;
            }
            stack.extend(removed.children);
        }
    }

    #[inline]
    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    /// Mutable access to name, mesh and materials. Hierarchy and transform
    /// stay behind the scene's own methods.
    #[inline]
    pub fn get_node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    #[inline]
    #[must_use]
    pub fn root_nodes(&self) -> &[NodeHandle] {
        &self.root_nodes
    }

    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Chainable wrapper around one node.
    pub fn node(&mut self, handle: NodeHandle) -> SceneNode<'_> {
        SceneNode::new(self, handle)
    }

    /// Fresh depth-first pre-order walk over everything reachable from the
    /// roots.
    #[must_use]
    pub fn pre_order(&self) -> PreOrder<'_> {
        PreOrder::new(&self.nodes, &self.root_nodes)
    }

    // ========================================================================
    // Hierarchy
    // ========================================================================

    /// Makes `child` the last child of `parent`.
    ///
    /// The child leaves its previous parent (or the root list) first, so it
    /// is never listed twice. Fails if `parent` is `child` or one of its
    /// descendants.
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle) -> Result<()> {
        self.require_node(child)?;
        self.require_node(parent)?;
        if self.is_ancestor_or_self(child, parent) {
            return Err(OktaederError::HierarchyCycle {
                node: self.nodes[child].name.clone(),
            });
        }
        if self.nodes[child].parent == Some(parent) {
            log::warn!(
                "Node [{}] is already a child of [{}], moving it to the end",
                self.nodes[child].name,
                self.nodes[parent].name
            );
        }

        self.unlink(child);
        self.nodes[parent].children.push(child);
        self.nodes[child].parent = Some(parent);
        transform_system::mark_world_dirty(&mut self.nodes, child);
        Ok(())
    }

    /// Turns `child` into a root. No-op for nodes that already are roots.
    pub fn detach(&mut self, child: NodeHandle) -> Result<()> {
        self.require_node(child)?;
        if self.nodes[child].parent.is_none() {
            return Ok(());
        }

        self.unlink(child);
        self.root_nodes.push(child);
        transform_system::mark_world_dirty(&mut self.nodes, child);
        Ok(())
    }

    /// Removes `child` from its parent's child list or from the roots.
    fn unlink(&mut self, child: NodeHandle) {
        match self.nodes[child].parent.take() {
            Some(old_parent) => {
                let siblings = &mut self.nodes[old_parent].children;
                if let Some(i) = siblings.iter().position(|&c| c == child) {
                    siblings.remove(i);
                }
            }
            None => {
                if let Some(i) = self.root_nodes.iter().position(|&r| r == child) {
                    self.root_nodes.remove(i);
                }
            }
        }
    }

    /// Whether `ancestor` is `node` or lies on the path from `node` to its root.
    #[must_use]
    pub fn is_ancestor_or_self(&self, ancestor: NodeHandle, node: NodeHandle) -> bool {
        let mut current = Some(node);
        while let Some(h) = current {
            if h == ancestor {
                return true;
            }
            current = self.nodes.get(h).and_then(|n| n.parent);
        }
        false
    }

    // ========================================================================
    // Transform
    // ========================================================================

    pub fn set_translation(&mut self, handle: NodeHandle, translation: Vec3) -> Result<()> {
        self.require_node_mut(handle)?.transform.set_translation(translation);
        transform_system::mark_world_dirty(&mut self.nodes, handle);
        Ok(())
    }

    pub fn set_rotation(&mut self, handle: NodeHandle, rotation: Quat) -> Result<()> {
        self.require_node_mut(handle)?.transform.set_rotation(rotation);
        transform_system::mark_world_dirty(&mut self.nodes, handle);
        Ok(())
    }

    pub fn set_scale(&mut self, handle: NodeHandle, scale: Vec3) -> Result<()> {
        self.require_node_mut(handle)?.transform.set_scale(scale);
        transform_system::mark_world_dirty(&mut self.nodes, handle);
        Ok(())
    }

    #[must_use]
    pub fn translation(&self, handle: NodeHandle) -> Option<Vec3> {
        self.nodes.get(handle).map(|n| n.transform.translation())
    }

    #[must_use]
    pub fn rotation(&self, handle: NodeHandle) -> Option<Quat> {
        self.nodes.get(handle).map(|n| n.transform.rotation())
    }

    #[must_use]
    pub fn scale(&self, handle: NodeHandle) -> Option<Vec3> {
        self.nodes.get(handle).map(|n| n.transform.scale())
    }

    /// Local matrix of `handle`, recomputed only if its TRS changed.
    pub fn local_matrix(&mut self, handle: NodeHandle) -> Option<Mat4> {
        self.nodes.get_mut(handle).map(|n| n.transform.local_matrix())
    }

    /// World matrix of `handle`, recomputing stale ancestors on the way.
    pub fn world_matrix(&mut self, handle: NodeHandle) -> Option<Mat4> {
        transform_system::resolve_world_matrix(&mut self.nodes, handle)
    }

    // ========================================================================
    // Shared attachments
    // ========================================================================

    pub fn set_mesh(&mut self, handle: NodeHandle, mesh: Option<Arc<Mesh>>) -> Result<()> {
        self.require_node_mut(handle)?.mesh = mesh;
        Ok(())
    }

    pub fn set_materials(
        &mut self,
        handle: NodeHandle,
        materials: Vec<Arc<Material>>,
    ) -> Result<()> {
        self.require_node_mut(handle)?.materials = materials;
        Ok(())
    }

    // ========================================================================
    // Cameras
    // ========================================================================

    pub fn add_camera(&mut self, mut camera: Camera) -> CameraKey {
        camera.node = None;
        self.cameras.insert(camera)
    }

    #[inline]
    #[must_use]
    pub fn camera(&self, key: CameraKey) -> Option<&Camera> {
        self.cameras.get(key)
    }

    #[inline]
    pub fn camera_mut(&mut self, key: CameraKey) -> Option<&mut Camera> {
        self.cameras.get_mut(key)
    }

    /// Removes a camera, detaching it from its node first.
    pub fn remove_camera(&mut self, key: CameraKey) -> Option<Camera> {
        let camera = self.cameras.remove(key)?;
        if let Some(node) = camera.node.and_then(|n| self.nodes.get_mut(n)) {
            node.camera = None;
        }
        Some(camera)
    }

    /// Gives `camera` to `node`.
    ///
    /// The camera's previous node loses it and the node's previous camera is
    /// released, so both sides always agree.
    pub fn attach_camera(&mut self, node: NodeHandle, camera: CameraKey) -> Result<()> {
        self.require_node(node)?;
        self.require_camera(camera)?;

        if let Some(old_node) = self.cameras[camera].node
            && old_node != node
            && let Some(n) = self.nodes.get_mut(old_node)
        {
            n.camera = None;
        }
        if let Some(old_camera) = self.nodes[node].camera
            && old_camera != camera
            && let Some(c) = self.cameras.get_mut(old_camera)
        {
            c.node = None;
        }

        self.nodes[node].camera = Some(camera);
        self.cameras[camera].node = Some(node);
        Ok(())
    }

    /// Releases the camera held by `node`, if any.
    pub fn detach_camera(&mut self, node: NodeHandle) -> Result<()> {
        if let Some(camera) = self.require_node_mut(node)?.camera.take()
            && let Some(c) = self.cameras.get_mut(camera)
        {
            c.node = None;
        }
        Ok(())
    }

    /// Takes `camera` away from whichever node holds it.
    pub fn release_camera(&mut self, camera: CameraKey) -> Result<()> {
        let held_by = self.require_camera(camera)?.node;
        match held_by {
            Some(node) => self.detach_camera(node),
            None => Ok(()),
        }
    }

    // ========================================================================
    // Lights
    // ========================================================================

    pub fn add_light(&mut self, mut light: Light) -> LightKey {
        light.node = None;
        self.lights.insert(light)
    }

    #[inline]
    #[must_use]
    pub fn light(&self, key: LightKey) -> Option<&Light> {
        self.lights.get(key)
    }

    #[inline]
    pub fn light_mut(&mut self, key: LightKey) -> Option<&mut Light> {
        self.lights.get_mut(key)
    }

    /// Removes a light, detaching it from its node first.
    pub fn remove_light(&mut self, key: LightKey) -> Option<Light> {
        let light = self.lights.remove(key)?;
        if let Some(node) = light.node.and_then(|n| self.nodes.get_mut(n)) {
            node.light = None;
        }
        Some(light)
    }

    /// Gives `light` to `node`, with the same swap rules as
    /// [`attach_camera`](Self::attach_camera).
    pub fn attach_light(&mut self, node: NodeHandle, light: LightKey) -> Result<()> {
        self.require_node(node)?;
        self.require_light(light)?;

        if let Some(old_node) = self.lights[light].node
            && old_node != node
            && let Some(n) = self.nodes.get_mut(old_node)
        {
            n.light = None;
        }
        if let Some(old_light) = self.nodes[node].light
            && old_light != light
            && let Some(l) = self.lights.get_mut(old_light)
        {
            l.node = None;
        }

        self.nodes[node].light = Some(light);
        self.lights[light].node = Some(node);
        Ok(())
    }

    /// Releases the light held by `node`, if any.
    pub fn detach_light(&mut self, node: NodeHandle) -> Result<()> {
        if let Some(light) = self.require_node_mut(node)?.light.take()
            && let Some(l) = self.lights.get_mut(light)
        {
            l.node = None;
        }
        Ok(())
    }

    /// Takes `light` away from whichever node holds it.
    pub fn release_light(&mut self, light: LightKey) -> Result<()> {
        let held_by = self.require_light(light)?.node;
        match held_by {
            Some(node) => self.detach_light(node),
            None => Ok(()),
        }
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    fn require_node(&self, handle: NodeHandle) -> Result<&Node> {
        self.nodes
            .get(handle)
            .ok_or_else(|| OktaederError::NodeNotFound(format!("{handle:?}")))
    }

    fn require_node_mut(&mut self, handle: NodeHandle) -> Result<&mut Node> {
        self.nodes
            .get_mut(handle)
            .ok_or_else(|| OktaederError::NodeNotFound(format!("{handle:?}")))
    }

    fn require_camera(&self, key: CameraKey) -> Result<&Camera> {
        self.cameras
            .get(key)
            .ok_or_else(|| OktaederError::CameraNotFound(format!("{key:?}")))
    }

    fn require_light(&self, key: LightKey) -> Result<&Light> {
        self.lights
            .get(key)
            .ok_or_else(|| OktaederError::LightNotFound(format!("{key:?}")))
    }
}
