//! GPU mirrors of CPU resources.
//!
//! Every mirror remembers the version it was uploaded at. `prepare_*` compares
//! that against the resource and re-uploads only when it moved. Entries are
//! keyed by [`ResourceId`], so a resource shared by many meshes or materials
//! is uploaded once.
//!
//! Mirrors are also stamped with the last frame that prepared them.
//! [`ResourceManager::prune`] destroys the ones no frame has asked for in a
//! while, so dropping a mesh or texture on the CPU side eventually frees its
//! GPU memory.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use oktaeder_resources::{
    IndexFormat, Material, Mesh, ResourceId, Texture2D, TextureFormat, VertexAttribute,
};

use super::buffer::GpuBuffer;
use super::texture::{GpuTexture, wgpu_format};

/// Texel bound in place of a missing material map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    White,
    Black,
    /// Tangent-space +Z.
    Normal,
}

/// A GPU-side copy that can be evicted once no frame uses it.
trait Mirror {
    fn last_used_frame(&self) -> u64;
    fn destroy(&self);
}

struct VertexMirror {
    version: u64,
    last_used_frame: u64,
    streams: FxHashMap<VertexAttribute, GpuBuffer>,
}

impl Mirror for VertexMirror {
    fn last_used_frame(&self) -> u64 {
        self.last_used_frame
    }

    fn destroy(&self) {
        for buffer in self.streams.values() {
            buffer.destroy();
        }
    }
}

struct IndexMirror {
    version: u64,
    last_used_frame: u64,
    format: wgpu::IndexFormat,
    buffer: GpuBuffer,
}

impl Mirror for IndexMirror {
    fn last_used_frame(&self) -> u64 {
        self.last_used_frame
    }

    fn destroy(&self) {
        self.buffer.destroy();
    }
}

struct TextureMirror {
    version: u64,
    last_used_frame: u64,
    texture: GpuTexture,
}

impl Mirror for TextureMirror {
    fn last_used_frame(&self) -> u64 {
        self.last_used_frame
    }

    fn destroy(&self) {
        self.texture.destroy();
    }
}

/// Destroys and removes every mirror last used before `cutoff`.
fn evict_unused<K, M: Mirror>(mirrors: &mut FxHashMap<K, M>, cutoff: u64) -> usize {
    let before = mirrors.len();
    mirrors.retain(|_, mirror| {
        let keep = mirror.last_used_frame() >= cutoff;
        if !keep {
            mirror.destroy();
        }
        keep
    });
    before - mirrors.len()
}

pub struct ResourceManager {
    device: wgpu::Device,
    queue: wgpu::Queue,

    vertex_buffers: FxHashMap<ResourceId, VertexMirror>,
    index_buffers: FxHashMap<ResourceId, IndexMirror>,
    textures: FxHashMap<ResourceId, TextureMirror>,
    frame_index: u64,

    white: GpuTexture,
    black: GpuTexture,
    flat_normal: GpuTexture,
}

impl ResourceManager {
    #[must_use]
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        let white = GpuTexture::solid(
            &device,
            &queue,
            "Fallback White",
            [255, 255, 255, 255],
            wgpu::TextureFormat::Rgba8Unorm,
        );
        let black = GpuTexture::solid(
            &device,
            &queue,
            "Fallback Black",
            [0, 0, 0, 255],
            wgpu::TextureFormat::Rgba8Unorm,
        );
        let flat_normal = GpuTexture::solid(
            &device,
            &queue,
            "Fallback Normal",
            [128, 128, 255, 255],
            wgpu::TextureFormat::Rgba8Unorm,
        );

        Self {
            device,
            queue,
            vertex_buffers: FxHashMap::default(),
            index_buffers: FxHashMap::default(),
            textures: FxHashMap::default(),
            frame_index: 0,
            white,
            black,
            flat_normal,
        }
    }

    /// Starts a new frame. Mirrors prepared from now on count as used in it.
    pub fn next_frame(&mut self) {
        self.frame_index += 1;
    }

    #[inline]
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Destroys mirrors that no frame prepared during the last `ttl_frames`
    /// frames. Returns how many were evicted.
    pub fn prune(&mut self, ttl_frames: u64) -> usize {
        let Some(cutoff) = self.frame_index.checked_sub(ttl_frames) else {
            return 0;
        };
        let evicted = evict_unused(&mut self.vertex_buffers, cutoff)
            + evict_unused(&mut self.index_buffers, cutoff)
            + evict_unused(&mut self.textures, cutoff);
        if evicted > 0 {
            log::debug!("Evicted {evicted} GPU mirrors unused since frame {cutoff}");
        }
        evicted
    }

    /// Uploads the vertex streams and index data of `mesh` if they changed.
    pub fn prepare_mesh(&mut self, mesh: &Mesh) {
        let frame = self.frame_index;
        let vertex_buffer = mesh.vertex_buffer();
        let version = vertex_buffer.version();
        let id = vertex_buffer.id();
        let stale = self
            .vertex_buffers
            .get(&id)
            .is_none_or(|mirror| mirror.version != version);

        if stale {
            let mirror = self.vertex_buffers.entry(id).or_insert_with(|| VertexMirror {
                version,
                last_used_frame: frame,
                streams: FxHashMap::default(),
            });
            mirror.version = version;
            for attribute in VertexAttribute::ALL {
                let Some(bytes) = vertex_buffer.stream_bytes(attribute) else {
                    continue;
                };
                let buffer = mirror.streams.entry(attribute).or_insert_with(|| {
                    GpuBuffer::new(
                        &self.device,
                        format!("{} {}", vertex_buffer.name(), attribute.name()),
                        bytes.len() as u64,
                        wgpu::BufferUsages::VERTEX,
                    )
                });
                buffer.write(&self.device, &self.queue, &bytes);
            }
            log::trace!("Uploaded vertex buffer '{}' v{version}", vertex_buffer.name());
        }
        if let Some(mirror) = self.vertex_buffers.get_mut(&id) {
            mirror.last_used_frame = frame;
        }

        let index_buffer = mesh.index_buffer();
        let version = index_buffer.version();
        let id = index_buffer.id();
        let stale = self
            .index_buffers
            .get(&id)
            .is_none_or(|mirror| mirror.version != version);

        if stale {
            let bytes = index_buffer.bytes();
            let format = match index_buffer.format() {
                IndexFormat::Uint16 => wgpu::IndexFormat::Uint16,
                IndexFormat::Uint32 => wgpu::IndexFormat::Uint32,
            };
            let mirror = self.index_buffers.entry(id).or_insert_with(|| IndexMirror {
                version,
                last_used_frame: frame,
                format,
                buffer: GpuBuffer::new(
                    &self.device,
                    index_buffer.name(),
                    bytes.len() as u64,
                    wgpu::BufferUsages::INDEX,
                ),
            });
            mirror.version = version;
            mirror.format = format;
            mirror.buffer.write(&self.device, &self.queue, &bytes);
            log::trace!("Uploaded index buffer '{}' v{version}", index_buffer.name());
        }
        if let Some(mirror) = self.index_buffers.get_mut(&id) {
            mirror.last_used_frame = frame;
        }
    }

    /// Uploads every map of `material` that changed.
    pub fn prepare_material(&mut self, material: &Material) {
        for (texture, _) in material_maps(material) {
            if let Some(texture) = texture {
                self.prepare_texture(texture);
            }
        }
    }

    pub fn prepare_texture(&mut self, texture: &Texture2D) {
        if texture.format() == TextureFormat::Depth {
            log::warn!(
                "Depth texture '{}' cannot be sampled as a material map",
                texture.name()
            );
            return;
        }

        let version = texture.version();
        let (width, height) = texture.size();
        let id = texture.id();

        let current = self
            .textures
            .get(&id)
            .map(|mirror| (mirror.version, mirror.texture.size()));
        let up_to_date = match current {
            Some((uploaded, size)) if size == (width.max(1), height.max(1)) => uploaded == version,
            Some(_) => {
                // resized on the CPU side, recreate
                if let Some(old) = self.textures.remove(&id) {
                    old.destroy();
                }
                false
            }
            None => false,
        };

        if !up_to_date {
            let bytes = texture.bytes();
            let format = wgpu_format(texture.format());
            match self.textures.get_mut(&id) {
                Some(mirror) => {
                    mirror.texture.upload_rgba8(&self.queue, &bytes);
                    mirror.version = version;
                }
                None => {
                    let gpu = GpuTexture::with_rgba8(
                        &self.device,
                        &self.queue,
                        texture.name(),
                        width,
                        height,
                        format,
                        &bytes,
                    );
                    self.textures.insert(
                        id,
                        TextureMirror {
                            version,
                            last_used_frame: self.frame_index,
                            texture: gpu,
                        },
                    );
                }
            }
        }
        if let Some(mirror) = self.textures.get_mut(&id) {
            mirror.last_used_frame = self.frame_index;
        }
    }

    #[must_use]
    pub fn vertex_stream(
        &self,
        id: ResourceId,
        attribute: VertexAttribute,
    ) -> Option<&wgpu::Buffer> {
        self.vertex_buffers
            .get(&id)
            .and_then(|mirror| mirror.streams.get(&attribute))
            .map(GpuBuffer::buffer)
    }

    #[must_use]
    pub fn index_buffer(&self, id: ResourceId) -> Option<(&wgpu::Buffer, wgpu::IndexFormat)> {
        self.index_buffers
            .get(&id)
            .map(|mirror| (mirror.buffer.buffer(), mirror.format))
    }

    /// View of an uploaded texture, or the fallback when there is none.
    #[must_use]
    pub fn texture_view(
        &self,
        texture: Option<&Arc<Texture2D>>,
        fallback: Fallback,
    ) -> &wgpu::TextureView {
        texture
            .and_then(|texture| self.textures.get(&texture.id()))
            .map_or_else(
                || self.fallback(fallback).view(),
                |mirror| mirror.texture.view(),
            )
    }

    fn fallback(&self, fallback: Fallback) -> &GpuTexture {
        match fallback {
            Fallback::White => &self.white,
            Fallback::Black => &self.black,
            Fallback::Normal => &self.flat_normal,
        }
    }
}

/// The six maps of a material in binding order, each with the texel used
/// when it is absent.
#[must_use]
pub fn material_maps(material: &Material) -> [(Option<&Arc<Texture2D>>, Fallback); 6] {
    [
        (
            material.base_color_partial_coverage_texture.as_ref(),
            Fallback::White,
        ),
        (material.occlusion_texture.as_ref(), Fallback::White),
        (material.roughness_metallic_texture.as_ref(), Fallback::White),
        (material.normal_texture.as_ref(), Fallback::Normal),
        (material.emissive_texture.as_ref(), Fallback::White),
        (
            material.transmission_collimation_texture.as_ref(),
            Fallback::Black,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    struct CountingMirror {
        last_used_frame: u64,
        destroyed: Rc<Cell<u32>>,
    }

    impl Mirror for CountingMirror {
        fn last_used_frame(&self) -> u64 {
            self.last_used_frame
        }

        fn destroy(&self) {
            self.destroyed.set(self.destroyed.get() + 1);
        }
    }

    #[test]
    fn eviction_destroys_only_unused_mirrors() {
        let destroyed = Rc::new(Cell::new(0));
        let mut mirrors = FxHashMap::default();
        for (key, frame) in [(1, 3), (2, 10), (3, 7), (4, 12)] {
            mirrors.insert(
                key,
                CountingMirror {
                    last_used_frame: frame,
                    destroyed: Rc::clone(&destroyed),
                },
            );
        }

        let evicted = evict_unused(&mut mirrors, 8);

        assert_eq!(evicted, 2);
        assert_eq!(destroyed.get(), 2);
        let mut kept: Vec<i32> = mirrors.keys().copied().collect();
        kept.sort_unstable();
        assert_eq!(kept, [2, 4]);
    }

    #[test]
    fn mirror_used_at_the_cutoff_frame_is_kept() {
        let destroyed = Rc::new(Cell::new(0));
        let mut mirrors = FxHashMap::default();
        mirrors.insert(
            "mesh",
            CountingMirror {
                last_used_frame: 5,
                destroyed: Rc::clone(&destroyed),
            },
        );

        assert_eq!(evict_unused(&mut mirrors, 5), 0);
        assert_eq!(evict_unused(&mut mirrors, 6), 1);
        assert!(mirrors.is_empty());
        assert_eq!(destroyed.get(), 1);
    }

    #[test]
    fn missing_maps_fall_back_per_slot() {
        let material = Material::default();
        let fallbacks: Vec<Fallback> = material_maps(&material)
            .iter()
            .map(|(texture, fallback)| {
                assert!(texture.is_none());
                *fallback
            })
            .collect();
        assert_eq!(
            fallbacks,
            [
                Fallback::White,
                Fallback::White,
                Fallback::White,
                Fallback::Normal,
                Fallback::White,
                Fallback::Black,
            ]
        );
    }

    #[test]
    fn maps_keep_their_texture() {
        let normal = Arc::new(Texture2D::new("n", 2, 2, TextureFormat::Linear));
        let material = Material {
            normal_texture: Some(Arc::clone(&normal)),
            ..Default::default()
        };
        let maps = material_maps(&material);
        assert!(maps[3].0.is_some_and(|t| Arc::ptr_eq(t, &normal)));
        assert!(maps[0].0.is_none());
    }
}
