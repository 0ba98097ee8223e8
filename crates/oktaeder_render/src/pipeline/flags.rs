use bitflags::bitflags;

use oktaeder_resources::{VertexAttribute, VertexBuffer};

bitflags! {
    /// Optional vertex streams present on a mesh. Position is always there.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ShaderFlags: u8 {
        const TEX_COORD       = 1 << 0;
        const LIGHT_TEX_COORD = 1 << 1;
        const NORMAL          = 1 << 2;
        const TANGENT         = 1 << 3;
    }
}

impl ShaderFlags {
    #[must_use]
    pub fn new(tex_coord: bool, light_tex_coord: bool, normal: bool, tangent: bool) -> Self {
        let mut flags = Self::empty();
        flags.set(Self::TEX_COORD, tex_coord);
        flags.set(Self::LIGHT_TEX_COORD, light_tex_coord);
        flags.set(Self::NORMAL, normal);
        flags.set(Self::TANGENT, tangent);
        flags
    }

    #[must_use]
    pub fn from_vertex_buffer(vertex_buffer: &VertexBuffer) -> Self {
        Self::new(
            vertex_buffer.has_tex_coord(),
            vertex_buffer.has_light_tex_coord(),
            vertex_buffer.has_normal(),
            vertex_buffer.has_tangent(),
        )
    }

    /// Vertex attributes this flag set binds, in binding order.
    pub fn attributes(self) -> impl Iterator<Item = VertexAttribute> {
        VertexAttribute::ALL
            .into_iter()
            .filter(move |&attribute| match attribute {
                VertexAttribute::Position => true,
                VertexAttribute::TexCoord => self.contains(Self::TEX_COORD),
                VertexAttribute::LightTexCoord => self.contains(Self::LIGHT_TEX_COORD),
                VertexAttribute::Normal => self.contains(Self::NORMAL),
                VertexAttribute::Tangent => self.contains(Self::TANGENT),
            })
    }

    /// Cache key: one bit per flag, so distinct sets never share a key.
    #[inline]
    #[must_use]
    pub fn key(self) -> u32 {
        u32::from(self.bits())
    }
}
