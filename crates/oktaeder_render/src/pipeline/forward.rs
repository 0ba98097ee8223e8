//! Forward pipeline construction for one shader permutation.

use oktaeder_core::Result;

use super::flags::ShaderFlags;
use super::shader_gen::generate_shader;
use super::vertex::generate_vertex_layout;

/// Everything a permutation shares with its siblings: the pipeline layout
/// and the attachment formats.
pub struct ForwardPipelineFactory {
    layout: wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    depth_format: wgpu::TextureFormat,
}

impl ForwardPipelineFactory {
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        bind_group_layouts: [&wgpu::BindGroupLayout; 3],
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
    ) -> Self {
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Forward Pipeline Layout"),
            bind_group_layouts: &bind_group_layouts.map(Some),
            immediate_size: 0,
        });
        Self {
            layout,
            color_format,
            depth_format,
        }
    }

    /// Generates, compiles and links the pipeline for `flags`.
    pub fn create(
        &self,
        device: &wgpu::Device,
        flags: ShaderFlags,
    ) -> Result<wgpu::RenderPipeline> {
        let label = format!("Forward Pipeline {:#06b}", flags.key());
        log::debug!("Compiling {label}");

        let source = generate_shader(flags)?;
        let vertex_layout = generate_vertex_layout(flags);
        let vertex_buffers = vertex_layout.buffer_layouts();

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        Ok(device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&label),
            layout: Some(&self.layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs_main"),
                buffers: &vertex_buffers,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.color_format,
                    blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: self.depth_format,
                depth_write_enabled: Some(true),
                depth_compare: Some(wgpu::CompareFunction::Greater),
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        }))
    }
}
