//! Vertex data stored as one stream per attribute.
//!
//! Position is mandatory. The other four streams are chosen at creation time
//! and stay fixed for the lifetime of the buffer, which is what makes the
//! shader flags of a mesh stable.

use glam::{Vec2, Vec3, Vec4};
use parking_lot::RwLock;

use oktaeder_core::{OktaederError, Result};

use crate::id::{ResourceId, Version};

/// Vertex attributes in binding order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexAttribute {
    Position,
    TexCoord,
    LightTexCoord,
    Normal,
    Tangent,
}

impl VertexAttribute {
    pub const ALL: [Self; 5] = [
        Self::Position,
        Self::TexCoord,
        Self::LightTexCoord,
        Self::Normal,
        Self::Tangent,
    ];

    /// Number of `f32` components per vertex.
    #[must_use]
    pub const fn components(self) -> usize {
        match self {
            Self::Position | Self::Normal => 3,
            Self::TexCoord | Self::LightTexCoord => 2,
            Self::Tangent => 4,
        }
    }

    /// Byte stride of one vertex in this stream.
    #[must_use]
    pub const fn stride(self) -> u64 {
        (self.components() * 4) as u64
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Position => "position",
            Self::TexCoord => "texCoord",
            Self::LightTexCoord => "lightTexCoord",
            Self::Normal => "normal",
            Self::Tangent => "tangent",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone)]
pub struct VertexBufferDescriptor {
    pub name: String,
    pub vertex_count: u32,
    pub tex_coord: bool,
    pub light_tex_coord: bool,
    pub normal: bool,
    pub tangent: bool,
}

impl Default for VertexBufferDescriptor {
    fn default() -> Self {
        Self {
            name: "VertexBuffer".to_string(),
            vertex_count: 0,
            tex_coord: false,
            light_tex_coord: false,
            normal: false,
            tangent: false,
        }
    }
}

/// One write call. Streams left as `None` are not touched.
#[derive(Debug, Clone, Copy, Default)]
pub struct VertexWrite<'a> {
    pub position: Option<&'a [Vec3]>,
    pub tex_coord: Option<&'a [Vec2]>,
    pub light_tex_coord: Option<&'a [Vec2]>,
    pub normal: Option<&'a [Vec3]>,
    pub tangent: Option<&'a [Vec4]>,
}

impl<'a> VertexWrite<'a> {
    fn streams(&self) -> [(VertexAttribute, Option<&'a [f32]>); 5] {
        [
            (VertexAttribute::Position, self.position.map(bytemuck::cast_slice)),
            (VertexAttribute::TexCoord, self.tex_coord.map(bytemuck::cast_slice)),
            (VertexAttribute::LightTexCoord, self.light_tex_coord.map(bytemuck::cast_slice)),
            (VertexAttribute::Normal, self.normal.map(bytemuck::cast_slice)),
            (VertexAttribute::Tangent, self.tangent.map(bytemuck::cast_slice)),
        ]
    }
}

#[derive(Debug)]
struct VertexStreams {
    vertex_count: u32,
    streams: [Option<Vec<f32>>; 5],
}

impl VertexStreams {
    fn allocate(vertex_count: u32, enabled: [bool; 5]) -> Self {
        let streams = VertexAttribute::ALL.map(|attribute| {
            enabled[attribute.index()]
                .then(|| vec![0.0; vertex_count as usize * attribute.components()])
        });
        Self {
            vertex_count,
            streams,
        }
    }

    fn enabled(&self) -> [bool; 5] {
        [0, 1, 2, 3, 4].map(|i| self.streams[i].is_some())
    }
}

#[derive(Debug)]
pub struct VertexBuffer {
    id: ResourceId,
    name: String,
    version: Version,
    data: RwLock<VertexStreams>,
}

impl VertexBuffer {
    #[must_use]
    pub fn new(descriptor: VertexBufferDescriptor) -> Self {
        let enabled = [
            true,
            descriptor.tex_coord,
            descriptor.light_tex_coord,
            descriptor.normal,
            descriptor.tangent,
        ];
        Self {
            id: ResourceId::next(),
            name: descriptor.name,
            version: Version::default(),
            data: RwLock::new(VertexStreams::allocate(descriptor.vertex_count, enabled)),
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> ResourceId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version.get()
    }

    #[must_use]
    pub fn vertex_count(&self) -> u32 {
        self.data.read().vertex_count
    }

    #[must_use]
    pub fn has_attribute(&self, attribute: VertexAttribute) -> bool {
        self.data.read().streams[attribute.index()].is_some()
    }

    #[must_use]
    pub fn has_tex_coord(&self) -> bool {
        self.has_attribute(VertexAttribute::TexCoord)
    }

    #[must_use]
    pub fn has_light_tex_coord(&self) -> bool {
        self.has_attribute(VertexAttribute::LightTexCoord)
    }

    #[must_use]
    pub fn has_normal(&self) -> bool {
        self.has_attribute(VertexAttribute::Normal)
    }

    #[must_use]
    pub fn has_tangent(&self) -> bool {
        self.has_attribute(VertexAttribute::Tangent)
    }

    /// Writes the given streams starting at vertex `offset`.
    ///
    /// The whole write is validated before any data changes, so a failed call
    /// leaves the buffer untouched.
    pub fn write(&self, offset: u32, write: &VertexWrite<'_>) -> Result<()> {
        let mut data = self.data.write();
        let streams = write.streams();

        for (attribute, values) in &streams {
            let Some(values) = values else { continue };
            if data.streams[attribute.index()].is_none() {
                return Err(OktaederError::MissingVertexAttribute {
                    buffer: self.name.clone(),
                    attribute: attribute.name(),
                });
            }
            let count = values.len() / attribute.components();
            if offset as usize + count > data.vertex_count as usize {
                return Err(OktaederError::VertexRangeOutOfBounds {
                    buffer: self.name.clone(),
                    attribute: attribute.name(),
                    offset,
                    count,
                    capacity: data.vertex_count,
                });
            }
        }

        for (attribute, values) in streams {
            let (Some(values), Some(stream)) = (values, data.streams[attribute.index()].as_mut())
            else {
                continue;
            };
            let start = offset as usize * attribute.components();
            stream[start..start + values.len()].copy_from_slice(values);
        }

        drop(data);
        self.version.bump();
        Ok(())
    }

    /// Reallocates every stream at `vertex_count` vertices. Old contents are
    /// discarded.
    pub fn resize_discard(&self, vertex_count: u32) {
        let mut data = self.data.write();
        log::debug!(
            "Resizing vertex buffer [{}]: {} -> {} vertices",
            self.name,
            data.vertex_count,
            vertex_count
        );
        let enabled = data.enabled();
        *data = VertexStreams::allocate(vertex_count, enabled);
        drop(data);
        self.version.bump();
    }

    /// Like [`resize_discard`](Self::resize_discard), but only when the buffer
    /// is smaller than `vertex_count`.
    pub fn ensure_size_discard(&self, vertex_count: u32) {
        if self.vertex_count() < vertex_count {
            self.resize_discard(vertex_count);
        }
    }

    /// Raw little-endian bytes of one stream, or `None` if it is absent.
    #[must_use]
    pub fn stream_bytes(&self, attribute: VertexAttribute) -> Option<Vec<u8>> {
        let data = self.data.read();
        data.streams[attribute.index()]
            .as_deref()
            .map(|stream| bytemuck::cast_slice(stream).to_vec())
    }
}
