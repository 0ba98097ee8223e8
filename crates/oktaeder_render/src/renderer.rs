//! Renderer
//!
//! Owns the GPU state and records one forward pass per call to
//! [`Renderer::render`]:
//!
//! 1. assemble the frame on the CPU
//! 2. mirror changed meshes and textures to the GPU, evicting mirrors that
//!    have not been drawn for a while
//! 3. upload the uniform arena and both light arrays
//! 4. fetch or compile one pipeline per shader permutation in use
//! 5. record the draws and submit

use oktaeder_core::Result;
use oktaeder_scene::{CameraKey, Scene};

use crate::assembler::{Frame, FrameAssembler};
use crate::layouts::BindGroupLayouts;
use crate::pass::TrackedRenderPass;
use crate::pipeline::{ForwardPipelineFactory, PermutationCache};
use crate::resources::{GpuBuffer, GpuTexture, ResourceManager, material_maps};
use crate::settings::RendererSettings;
use crate::uniforms::{GLOBAL_UNIFORMS_SIZE, MATERIAL_UNIFORMS_SIZE, OBJECT_UNIFORMS_SIZE};

const GLOBAL_GROUP_ID: u64 = 0;
const OBJECT_GROUP_ID: u64 = 1;
const MATERIAL_GROUP_BASE_ID: u64 = 2;

/// A value built from buffers that may be reallocated, rebuilt when any of
/// their generations moves.
struct Generational<T> {
    generations: [u64; 3],
    value: T,
}

pub struct Renderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    settings: RendererSettings,

    layouts: BindGroupLayouts,
    factory: ForwardPipelineFactory,
    pipelines: PermutationCache<wgpu::RenderPipeline>,
    sampler: wgpu::Sampler,

    uniform_buffer: GpuBuffer,
    point_light_buffer: GpuBuffer,
    directional_light_buffer: GpuBuffer,
    global_bind_group: Option<Generational<wgpu::BindGroup>>,
    object_bind_group: Option<Generational<wgpu::BindGroup>>,

    depth: Option<GpuTexture>,
    resources: ResourceManager,
    assembler: FrameAssembler,
}

impl Renderer {
    #[must_use]
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        color_format: wgpu::TextureFormat,
        settings: RendererSettings,
    ) -> Self {
        let layouts = BindGroupLayouts::new(&device);
        let factory = ForwardPipelineFactory::new(
            &device,
            layouts.as_array(),
            color_format,
            settings.depth_format,
        );

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Material Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            anisotropy_clamp: settings.max_anisotropy.max(1),
            ..Default::default()
        });

        let uniform_buffer = GpuBuffer::new(
            &device,
            "Uniform Arena",
            settings.uniform_buffer_size,
            wgpu::BufferUsages::UNIFORM,
        );
        let point_light_buffer = GpuBuffer::new(
            &device,
            "Point Lights",
            settings.light_buffer_size,
            wgpu::BufferUsages::STORAGE,
        );
        let directional_light_buffer = GpuBuffer::new(
            &device,
            "Directional Lights",
            settings.light_buffer_size,
            wgpu::BufferUsages::STORAGE,
        );

        let resources = ResourceManager::new(device.clone(), queue.clone());

        log::info!(
            "Renderer created: color {color_format:?}, depth {:?}",
            settings.depth_format
        );

        Self {
            device,
            queue,
            settings,
            layouts,
            factory,
            pipelines: PermutationCache::new(),
            sampler,
            uniform_buffer,
            point_light_buffer,
            directional_light_buffer,
            global_bind_group: None,
            object_bind_group: None,
            depth: None,
            resources,
            assembler: FrameAssembler::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &RendererSettings {
        &self.settings
    }

    /// Number of distinct pipelines compiled so far.
    #[inline]
    #[must_use]
    pub fn pipeline_count(&self) -> usize {
        self.pipelines.len()
    }

    /// The frame packed by the last call to [`render`](Self::render).
    #[inline]
    #[must_use]
    pub fn last_frame(&self) -> &Frame {
        self.assembler.frame()
    }

    /// Draws `scene` as seen from `camera` into `target`.
    ///
    /// `width` and `height` must match the target. The depth attachment is
    /// (re)created to fit them.
    pub fn render(
        &mut self,
        scene: &mut Scene,
        camera: CameraKey,
        target: &wgpu::TextureView,
        width: u32,
        height: u32,
    ) -> Result<()> {
        let aspect_ratio = width.max(1) as f32 / height.max(1) as f32;
        let frame = self.assembler.assemble(scene, camera, aspect_ratio)?;

        self.resources.next_frame();
        for object in frame.objects() {
            self.resources.prepare_mesh(&object.mesh);
        }
        for entry in frame.materials() {
            self.resources.prepare_material(&entry.material);
        }
        self.resources.prune(self.settings.resource_ttl_frames);

        self.uniform_buffer
            .write(&self.device, &self.queue, frame.uniform_bytes());
        self.point_light_buffer
            .write(&self.device, &self.queue, frame.point_light_bytes());
        self.directional_light_buffer
            .write(&self.device, &self.queue, frame.directional_light_bytes());

        let mut pipelines = Vec::with_capacity(frame.objects().len());
        for object in frame.objects() {
            let pipeline = self.pipelines.get_or_create(object.flags, |flags| {
                self.factory.create(&self.device, flags)
            })?;
            pipelines.push(pipeline);
        }

        let global = refresh_global_bind_group(
            &self.device,
            &self.layouts,
            &self.uniform_buffer,
            &self.point_light_buffer,
            &self.directional_light_buffer,
            &mut self.global_bind_group,
        );
        let object_group = refresh_object_bind_group(
            &self.device,
            &self.layouts,
            &self.uniform_buffer,
            &mut self.object_bind_group,
        );
        let material_bind_groups = create_material_bind_groups(
            &self.device,
            &self.layouts,
            &self.uniform_buffer,
            &self.sampler,
            &self.resources,
            frame,
        );

        let depth = ensure_depth_attachment(
            &self.device,
            &mut self.depth,
            width,
            height,
            self.settings.depth_format,
        );

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Forward Encoder"),
            });

        {
            let pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Forward Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.settings.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth.view(),
                    depth_ops: Some(wgpu::Operations {
                        // reversed-Z: 0.0 is the far plane
                        load: wgpu::LoadOp::Clear(0.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            let mut pass = TrackedRenderPass::new(pass);

            pass.set_bind_group(0, GLOBAL_GROUP_ID, global, Some(frame.global_offset()));

            for draw in frame.draws() {
                let object = &frame.objects()[draw.object];
                let vertex_buffer = object.mesh.vertex_buffer();
                let index_buffer = object.mesh.index_buffer();

                let Some((indices, index_format)) = self.resources.index_buffer(index_buffer.id())
                else {
                    log::warn!("Index buffer '{}' is not resident", index_buffer.name());
                    continue;
                };

                pass.set_pipeline(object.flags.key(), &pipelines[draw.object]);

                let mut resident = true;
                for (slot, attribute) in (0u32..).zip(object.flags.attributes()) {
                    let Some(stream) = self.resources.vertex_stream(vertex_buffer.id(), attribute)
                    else {
                        resident = false;
                        break;
                    };
                    let id = (vertex_buffer.id().raw() << 3) | u64::from(slot);
                    pass.set_vertex_buffer(slot, id, stream);
                }
                if !resident {
                    log::warn!("Vertex buffer '{}' is not resident", vertex_buffer.name());
                    continue;
                }
                pass.set_index_buffer(index_buffer.id().raw(), indices, index_format);

                pass.set_bind_group(
                    1,
                    MATERIAL_GROUP_BASE_ID + draw.material as u64,
                    &material_bind_groups[draw.material],
                    Some(frame.materials()[draw.material].uniform_offset),
                );
                pass.set_bind_group(
                    2,
                    OBJECT_GROUP_ID,
                    object_group,
                    Some(object.uniform_offset),
                );
                pass.draw_indexed(draw.index_range.clone(), 0..1);
            }

            log::trace!("Forward pass recorded {} draw calls", pass.draw_calls());
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }
}

/// Returns the cached value, rebuilding it when missing or built against
/// other buffer generations.
fn get_or_rebuild<T>(
    cached: &mut Option<Generational<T>>,
    generations: [u64; 3],
    build: impl FnOnce() -> T,
) -> &T {
    if cached
        .as_ref()
        .is_some_and(|entry| entry.generations != generations)
    {
        *cached = None;
    }
    &cached
        .get_or_insert_with(|| Generational {
            generations,
            value: build(),
        })
        .value
}

fn refresh_global_bind_group<'a>(
    device: &wgpu::Device,
    layouts: &BindGroupLayouts,
    uniforms: &GpuBuffer,
    point_lights: &GpuBuffer,
    directional_lights: &GpuBuffer,
    cached: &'a mut Option<Generational<wgpu::BindGroup>>,
) -> &'a wgpu::BindGroup {
    let generations = [
        uniforms.generation(),
        point_lights.generation(),
        directional_lights.generation(),
    ];
    get_or_rebuild(cached, generations, || {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Global BindGroup"),
            layout: &layouts.global,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: uniforms.buffer(),
                        offset: 0,
                        size: wgpu::BufferSize::new(GLOBAL_UNIFORMS_SIZE),
                    }),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: point_lights.buffer().as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: directional_lights.buffer().as_entire_binding(),
                },
            ],
        })
    })
}

fn refresh_object_bind_group<'a>(
    device: &wgpu::Device,
    layouts: &BindGroupLayouts,
    uniforms: &GpuBuffer,
    cached: &'a mut Option<Generational<wgpu::BindGroup>>,
) -> &'a wgpu::BindGroup {
    let generations = [uniforms.generation(), 0, 0];
    get_or_rebuild(cached, generations, || {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Object BindGroup"),
            layout: &layouts.object,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: uniforms.buffer(),
                    offset: 0,
                    size: wgpu::BufferSize::new(OBJECT_UNIFORMS_SIZE),
                }),
            }],
        })
    })
}

/// Returns a depth attachment of `width` x `height`, recreating it when the
/// target was resized.
fn ensure_depth_attachment<'a>(
    device: &wgpu::Device,
    depth: &'a mut Option<GpuTexture>,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
) -> &'a GpuTexture {
    let size = (width.max(1), height.max(1));
    if depth.as_ref().is_some_and(|texture| texture.size() != size) {
        *depth = None;
    }
    depth.get_or_insert_with(|| {
        log::debug!("Creating depth attachment {}x{}", size.0, size.1);
        GpuTexture::new(
            device,
            "Depth Attachment",
            size.0,
            size.1,
            format,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
        )
    })
}

/// One bind group per material in the frame. They differ only in textures;
/// the uniform block is selected by dynamic offset.
fn create_material_bind_groups(
    device: &wgpu::Device,
    layouts: &BindGroupLayouts,
    uniforms: &GpuBuffer,
    sampler: &wgpu::Sampler,
    resources: &ResourceManager,
    frame: &Frame,
) -> Vec<wgpu::BindGroup> {
    frame
        .materials()
        .iter()
        .map(|entry| {
            let maps = material_maps(&entry.material);
            let mut entries = Vec::with_capacity(2 + maps.len());
            entries.push(wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: uniforms.buffer(),
                    offset: 0,
                    size: wgpu::BufferSize::new(MATERIAL_UNIFORMS_SIZE),
                }),
            });
            entries.push(wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            });
            for (binding, (texture, fallback)) in (2u32..).zip(maps) {
                entries.push(wgpu::BindGroupEntry {
                    binding,
                    resource: wgpu::BindingResource::TextureView(
                        resources.texture_view(texture, fallback),
                    ),
                });
            }

            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&entry.material.name),
                layout: &layouts.material,
                entries: &entries,
            })
        })
        .collect()
}
