//! Frame Assembler
//!
//! Turns a scene and a camera into everything one frame uploads and draws,
//! without touching the GPU:
//!
//! 1. materials reachable from the roots, deduplicated by identity and packed
//!    into the uniform arena in first-seen order
//! 2. nodes with a mesh, packed the same way (world + normal matrix)
//! 3. point and directional lights, packed into their own arrays
//! 4. the global block (view, projection, ambient, light counts)
//! 5. the draw list, one entry per (object, submesh)
//!
//! Every arena block starts on a [`UNIFORM_ALIGNMENT`] boundary. All writers
//! are cleared at the start of a frame and keep their allocations.

use std::ops::Range;
use std::sync::Arc;

use smallvec::SmallVec;

use oktaeder_core::{BinaryWriter, ByAddress, Mapping, OktaederError, Result};
use oktaeder_resources::{Material, Mesh};
use oktaeder_scene::{CameraKey, LightKind, NodeHandle, Scene};

use crate::pipeline::ShaderFlags;
use crate::uniforms::{
    DirectionalLightRecord, GlobalUniforms, MaterialUniforms, ObjectUniforms, PointLightRecord,
    UNIFORM_ALIGNMENT,
};

#[derive(Debug, Clone)]
pub struct MaterialEntry {
    pub material: Arc<Material>,
    /// Byte offset of this material's block in the uniform arena.
    pub uniform_offset: u32,
}

#[derive(Debug, Clone)]
pub struct ObjectEntry {
    pub node: NodeHandle,
    pub mesh: Arc<Mesh>,
    /// Byte offset of this object's block in the uniform arena.
    pub uniform_offset: u32,
    pub flags: ShaderFlags,
    /// Material table index per submesh.
    pub materials: SmallVec<[usize; 4]>,
}

/// One indexed draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawCommand {
    /// Index into [`Frame::objects`].
    pub object: usize,
    /// Submesh index within the object's mesh.
    pub submesh: usize,
    /// Index into [`Frame::materials`].
    pub material: usize,
    pub index_range: Range<u32>,
}

/// Output of [`FrameAssembler::assemble`].
#[derive(Debug, Default)]
pub struct Frame {
    uniforms: BinaryWriter,
    point_lights: BinaryWriter,
    directional_lights: BinaryWriter,
    point_light_count: u32,
    directional_light_count: u32,
    global_offset: u32,
    global: Option<GlobalUniforms>,
    materials: Vec<MaterialEntry>,
    objects: Vec<ObjectEntry>,
    draws: Vec<DrawCommand>,
}

impl Frame {
    fn clear(&mut self) {
        self.uniforms.clear();
        self.point_lights.clear();
        self.directional_lights.clear();
        self.point_light_count = 0;
        self.directional_light_count = 0;
        self.global_offset = 0;
        self.global = None;
        self.materials.clear();
        self.objects.clear();
        self.draws.clear();
    }

    /// The uniform arena: materials, then objects, then the global block.
    #[inline]
    #[must_use]
    pub fn uniform_bytes(&self) -> &[u8] {
        self.uniforms.as_bytes()
    }

    #[inline]
    #[must_use]
    pub fn point_light_bytes(&self) -> &[u8] {
        self.point_lights.as_bytes()
    }

    #[inline]
    #[must_use]
    pub fn directional_light_bytes(&self) -> &[u8] {
        self.directional_lights.as_bytes()
    }

    #[inline]
    #[must_use]
    pub fn point_light_count(&self) -> u32 {
        self.point_light_count
    }

    #[inline]
    #[must_use]
    pub fn directional_light_count(&self) -> u32 {
        self.directional_light_count
    }

    /// Byte offset of the global block in the uniform arena.
    #[inline]
    #[must_use]
    pub fn global_offset(&self) -> u32 {
        self.global_offset
    }

    /// The global block as written, `None` before the first successful
    /// assembly.
    #[inline]
    #[must_use]
    pub fn global_uniforms(&self) -> Option<&GlobalUniforms> {
        self.global.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn materials(&self) -> &[MaterialEntry] {
        &self.materials
    }

    #[inline]
    #[must_use]
    pub fn objects(&self) -> &[ObjectEntry] {
        &self.objects
    }

    #[inline]
    #[must_use]
    pub fn draws(&self) -> &[DrawCommand] {
        &self.draws
    }
}

#[derive(Default)]
pub struct FrameAssembler {
    frame: Frame,
    order: Vec<NodeHandle>,
    material_ids: Mapping<ByAddress<Material>>,
    object_ids: Mapping<NodeHandle>,
}

impl FrameAssembler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently assembled frame.
    #[inline]
    #[must_use]
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Gathers and packs one frame.
    ///
    /// Takes the scene mutably only to refresh matrix caches. Fails if the
    /// camera is unknown or detached, or if a renderable node's material
    /// list does not match its mesh.
    pub fn assemble(
        &mut self,
        scene: &mut Scene,
        camera: CameraKey,
        aspect_ratio: f32,
    ) -> Result<&Frame> {
        let camera = scene
            .camera(camera)
            .ok_or_else(|| OktaederError::CameraNotFound(format!("{camera:?}")))?;
        let camera_node = camera.node().ok_or_else(|| OktaederError::CameraDetached {
            camera: camera.name.clone(),
        })?;
        let projection = camera.projection_matrix(aspect_ratio);

        self.frame.clear();
        self.material_ids.clear();
        self.object_ids.clear();
        self.order.clear();
        self.order.extend(scene.pre_order().map(|(handle, _)| handle));

        self.gather_materials(scene);
        self.gather_objects(scene)?;
        self.gather_lights(scene);

        let view = scene
            .world_matrix(camera_node)
            .ok_or_else(|| OktaederError::NodeNotFound(format!("{camera_node:?}")))?
            .inverse();
        let global = GlobalUniforms {
            view,
            projection,
            ambient_light: scene.ambient_light,
            point_light_count: self.frame.point_light_count,
            directional_light_count: self.frame.directional_light_count,
            _padding: [0; 3],
        };
        self.frame.global_offset = self.frame.uniforms.len() as u32;
        self.frame.uniforms.write_pod(&global);
        self.frame.uniforms.pad_to_align(UNIFORM_ALIGNMENT);
        self.frame.global = Some(global);

        self.build_draws();

        log::trace!(
            "Frame assembled: {} materials, {} objects, {} draws, {} point / {} directional lights, {} uniform bytes",
            self.frame.materials.len(),
            self.frame.objects.len(),
            self.frame.draws.len(),
            self.frame.point_light_count,
            self.frame.directional_light_count,
            self.frame.uniforms.len(),
        );

        Ok(&self.frame)
    }

    fn gather_materials(&mut self, scene: &Scene) {
        for &handle in &self.order {
            let Some(node) = scene.get_node(handle) else {
                continue;
            };
            for material in &node.materials {
                self.material_ids.add(ByAddress(Arc::clone(material)));
            }
        }

        for material in &self.material_ids {
            let uniform_offset = self.frame.uniforms.len() as u32;
            self.frame
                .uniforms
                .write_pod(&MaterialUniforms::from(&**material));
            self.frame.uniforms.pad_to_align(UNIFORM_ALIGNMENT);
            self.frame.materials.push(MaterialEntry {
                material: Arc::clone(&material.0),
                uniform_offset,
            });
        }
    }

    fn gather_objects(&mut self, scene: &mut Scene) -> Result<()> {
        for &handle in &self.order {
            let Some(node) = scene.get_node(handle) else {
                continue;
            };
            let Some(mesh) = &node.mesh else {
                continue;
            };
            if mesh.submesh_count() != node.materials.len() {
                return Err(OktaederError::MaterialCountMismatch {
                    node: node.name.clone(),
                    submeshes: mesh.submesh_count(),
                    materials: node.materials.len(),
                });
            }
            self.object_ids.add(handle);
        }

        for &handle in &self.object_ids {
            let world = scene
                .world_matrix(handle)
                .ok_or_else(|| OktaederError::NodeNotFound(format!("{handle:?}")))?;
            let Some(node) = scene.get_node(handle) else {
                continue;
            };
            let Some(mesh) = node.mesh.clone() else {
                continue;
            };

            let materials = node
                .materials
                .iter()
                .filter_map(|m| self.material_ids.id_of(&ByAddress(Arc::clone(m))))
                .collect();

            let uniform_offset = self.frame.uniforms.len() as u32;
            self.frame.uniforms.write_pod(&ObjectUniforms::new(world));
            self.frame.uniforms.pad_to_align(UNIFORM_ALIGNMENT);

            self.frame.objects.push(ObjectEntry {
                node: handle,
                flags: ShaderFlags::from_vertex_buffer(mesh.vertex_buffer()),
                mesh,
                uniform_offset,
                materials,
            });
        }
        Ok(())
    }

    fn gather_lights(&mut self, scene: &mut Scene) {
        for &handle in &self.order {
            let Some(light) = scene
                .get_node(handle)
                .and_then(|node| node.light())
                .and_then(|key| scene.light(key))
            else {
                continue;
            };
            let (kind, color) = (light.kind, light.color);
            let Some(world) = scene.world_matrix(handle) else {
                continue;
            };

            match kind {
                LightKind::Point => {
                    let position = world.w_axis.truncate();
                    self.frame
                        .point_lights
                        .write_pod(&PointLightRecord::new(position, color));
                    self.frame.point_light_count += 1;
                }
                LightKind::Directional => {
                    let direction = (-world.z_axis.truncate()).normalize_or_zero();
                    self.frame
                        .directional_lights
                        .write_pod(&DirectionalLightRecord::new(direction, color));
                    self.frame.directional_light_count += 1;
                }
            }
        }
    }

    fn build_draws(&mut self) {
        for (object_index, object) in self.frame.objects.iter().enumerate() {
            for (submesh_index, submesh) in object.mesh.submeshes().iter().enumerate() {
                self.frame.draws.push(DrawCommand {
                    object: object_index,
                    submesh: submesh_index,
                    material: object.materials[submesh_index],
                    index_range: submesh.index_range(),
                });
            }
        }
    }
}
