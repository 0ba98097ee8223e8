//! Vertex Layout Generator
//!
//! Builds the wgpu vertex buffer layouts and the matching WGSL
//! `VertexInput` struct for a flag set. Every attribute lives in its own
//! buffer, so slot, shader location and position in the list coincide.

use oktaeder_resources::VertexAttribute;
use wgpu::VertexFormat;

use super::flags::ShaderFlags;

#[derive(Debug, Clone)]
pub struct VertexStream {
    pub attribute: VertexAttribute,
    pub array_stride: u64,
    attributes: [wgpu::VertexAttribute; 1],
}

impl VertexStream {
    #[inline]
    #[must_use]
    pub fn location(&self) -> u32 {
        self.attributes[0].shader_location
    }

    #[inline]
    #[must_use]
    pub fn format(&self) -> VertexFormat {
        self.attributes[0].format
    }

    #[must_use]
    pub fn as_wgpu(&self) -> wgpu::VertexBufferLayout<'_> {
        wgpu::VertexBufferLayout {
            array_stride: self.array_stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &self.attributes,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeneratedVertexLayout {
    /// In binding order: position, texCoord, lightTexCoord, normal, tangent.
    pub streams: Vec<VertexStream>,
    pub vertex_input_code: String,
}

impl GeneratedVertexLayout {
    #[must_use]
    pub fn buffer_layouts(&self) -> Vec<wgpu::VertexBufferLayout<'_>> {
        self.streams.iter().map(VertexStream::as_wgpu).collect()
    }
}

#[must_use]
pub fn generate_vertex_layout(flags: ShaderFlags) -> GeneratedVertexLayout {
    let mut streams = Vec::with_capacity(VertexAttribute::ALL.len());
    let mut wgsl_struct_fields = Vec::with_capacity(VertexAttribute::ALL.len());

    for (location, attribute) in (0u32..).zip(flags.attributes()) {
        let format = vertex_format(attribute);
        streams.push(VertexStream {
            attribute,
            array_stride: attribute.stride(),
            attributes: [wgpu::VertexAttribute {
                format,
                offset: 0,
                shader_location: location,
            }],
        });
        wgsl_struct_fields.push(format!(
            "    @location({location}) {}: {},",
            wgsl_field_name(attribute),
            format_to_wgsl_type(format)
        ));
    }

    let vertex_input_code = format!(
        "struct VertexInput {{\n{}\n}}",
        wgsl_struct_fields.join("\n")
    );

    GeneratedVertexLayout {
        streams,
        vertex_input_code,
    }
}

fn vertex_format(attribute: VertexAttribute) -> VertexFormat {
    match attribute.components() {
        2 => VertexFormat::Float32x2,
        3 => VertexFormat::Float32x3,
        _ => VertexFormat::Float32x4,
    }
}

fn wgsl_field_name(attribute: VertexAttribute) -> &'static str {
    match attribute {
        VertexAttribute::Position => "position",
        VertexAttribute::TexCoord => "tex_coord",
        VertexAttribute::LightTexCoord => "light_tex_coord",
        VertexAttribute::Normal => "normal",
        VertexAttribute::Tangent => "tangent",
    }
}

fn format_to_wgsl_type(format: VertexFormat) -> &'static str {
    match format {
        VertexFormat::Float32x2 => "vec2<f32>",
        VertexFormat::Float32x3 => "vec3<f32>",
        _ => "vec4<f32>",
    }
}
