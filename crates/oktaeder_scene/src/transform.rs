use glam::{Mat4, Quat, Vec3};

/// Local TRS of a node with cached local and world matrices.
///
/// Each cache has its own dirty flag. The local flag is owned by this
/// component. The world flag depends on ancestors and is driven by
/// [`transform_system`](crate::transform_system).
#[derive(Debug, Clone)]
pub struct Transform {
    translation: Vec3,
    rotation: Quat,
    scale: Vec3,

    local_matrix: Mat4,
    world_matrix: Mat4,

    local_dirty: bool,
    world_dirty: bool,
}

impl Transform {
    #[must_use]
    pub fn new() -> Self {
        Self::from_trs(Vec3::ZERO, Quat::IDENTITY, Vec3::ONE)
    }

    #[must_use]
    pub fn from_trs(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
            local_matrix: Mat4::IDENTITY,
            world_matrix: Mat4::IDENTITY,
            local_dirty: true,
            world_dirty: true,
        }
    }

    #[inline]
    #[must_use]
    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    #[inline]
    #[must_use]
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    #[inline]
    #[must_use]
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    // ========================================================================
    // Mutation
    // ========================================================================
    // These only flag this transform. Descendant invalidation is the job of
    // the owning scene.

    pub fn set_translation(&mut self, translation: Vec3) {
        self.translation = translation;
        self.mark_local_dirty();
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
        self.mark_local_dirty();
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.mark_local_dirty();
    }

    #[inline]
    fn mark_local_dirty(&mut self) {
        self.local_dirty = true;
        self.world_dirty = true;
    }

    #[inline]
    pub(crate) fn mark_world_dirty(&mut self) {
        self.world_dirty = true;
    }

    // ========================================================================
    // Matrix caches
    // ========================================================================

    /// Returns the local matrix, recomputing it if TRS changed since the
    /// last read. Scale is applied first, then rotation, then translation.
    pub fn local_matrix(&mut self) -> Mat4 {
        if self.local_dirty {
            self.local_matrix =
                Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation);
            self.local_dirty = false;
        }
        self.local_matrix
    }

    /// The cached world matrix, or `None` when it is stale.
    #[inline]
    #[must_use]
    pub fn cached_world_matrix(&self) -> Option<Mat4> {
        (!self.world_dirty).then_some(self.world_matrix)
    }

    #[inline]
    pub(crate) fn set_world_matrix(&mut self, world: Mat4) {
        self.world_matrix = world;
        self.world_dirty = false;
    }

    #[inline]
    #[must_use]
    pub fn is_local_dirty(&self) -> bool {
        self.local_dirty
    }

    #[inline]
    #[must_use]
    pub fn is_world_dirty(&self) -> bool {
        self.world_dirty
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}
