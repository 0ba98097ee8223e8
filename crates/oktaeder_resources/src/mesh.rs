use std::ops::Range;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::index_buffer::IndexBuffer;
use crate::vertex_buffer::VertexBuffer;

/// A contiguous index range drawn with one material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Submesh {
    pub start: u32,
    pub length: u32,
}

impl Submesh {
    #[must_use]
    pub const fn new(start: u32, length: u32) -> Self {
        Self { start, length }
    }

    #[must_use]
    pub const fn index_range(&self) -> Range<u32> {
        self.start..self.start + self.length
    }
}

/// Geometry shared between nodes: buffers plus submesh ranges.
///
/// The pairing is fixed at construction. The buffers themselves stay
/// writable through their own interior locking.
#[derive(Debug)]
pub struct Mesh {
    name: String,
    vertex_buffer: Arc<VertexBuffer>,
    index_buffer: Arc<IndexBuffer>,
    submeshes: SmallVec<[Submesh; 4]>,
}

impl Mesh {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        vertex_buffer: Arc<VertexBuffer>,
        index_buffer: Arc<IndexBuffer>,
        submeshes: impl IntoIterator<Item = Submesh>,
    ) -> Self {
        Self {
            name: name.into(),
            vertex_buffer,
            index_buffer,
            submeshes: submeshes.into_iter().collect(),
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn vertex_buffer(&self) -> &Arc<VertexBuffer> {
        &self.vertex_buffer
    }

    #[inline]
    #[must_use]
    pub fn index_buffer(&self) -> &Arc<IndexBuffer> {
        &self.index_buffer
    }

    #[inline]
    #[must_use]
    pub fn submeshes(&self) -> &[Submesh] {
        &self.submeshes
    }

    #[inline]
    #[must_use]
    pub fn submesh_count(&self) -> usize {
        self.submeshes.len()
    }
}
