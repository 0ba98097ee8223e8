//! Bind group layouts shared by every forward pipeline.
//!
//! | group | binding | resource                              |
//! |-------|---------|---------------------------------------|
//! | 0     | 0       | global uniforms (dynamic offset)      |
//! | 0     | 1       | point lights (storage)                |
//! | 0     | 2       | directional lights (storage)          |
//! | 1     | 0       | material uniforms (dynamic offset)    |
//! | 1     | 1       | sampler                               |
//! | 1     | 2..=7   | material maps                         |
//! | 2     | 0       | object uniforms (dynamic offset)      |

use crate::uniforms::{
    GLOBAL_UNIFORMS_SIZE, LIGHT_RECORD_SIZE, MATERIAL_UNIFORMS_SIZE, OBJECT_UNIFORMS_SIZE,
};

/// Number of texture bindings in the material group.
pub const MATERIAL_TEXTURE_COUNT: u32 = 6;

pub struct BindGroupLayouts {
    pub global: wgpu::BindGroupLayout,
    pub material: wgpu::BindGroupLayout,
    pub object: wgpu::BindGroupLayout,
}

impl BindGroupLayouts {
    #[must_use]
    pub fn new(device: &wgpu::Device) -> Self {
        let global = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Global BindGroup Layout"),
            entries: &[
                dynamic_uniform(0, wgpu::ShaderStages::VERTEX_FRAGMENT, GLOBAL_UNIFORMS_SIZE),
                light_storage(1),
                light_storage(2),
            ],
        });

        let mut material_entries = vec![
            dynamic_uniform(0, wgpu::ShaderStages::FRAGMENT, MATERIAL_UNIFORMS_SIZE),
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ];
        material_entries.extend((0..MATERIAL_TEXTURE_COUNT).map(|i| wgpu::BindGroupLayoutEntry {
            binding: 2 + i,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        }));
        let material = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Material BindGroup Layout"),
            entries: &material_entries,
        });

        let object = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Object BindGroup Layout"),
            entries: &[dynamic_uniform(
                0,
                wgpu::ShaderStages::VERTEX,
                OBJECT_UNIFORMS_SIZE,
            )],
        });

        Self {
            global,
            material,
            object,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> [&wgpu::BindGroupLayout; 3] {
        [&self.global, &self.material, &self.object]
    }
}

fn dynamic_uniform(
    binding: u32,
    visibility: wgpu::ShaderStages,
    size: u64,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: true,
            min_binding_size: wgpu::BufferSize::new(size),
        },
        count: None,
    }
}

fn light_storage(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only: true },
            has_dynamic_offset: false,
            min_binding_size: wgpu::BufferSize::new(LIGHT_RECORD_SIZE),
        },
        count: None,
    }
}
