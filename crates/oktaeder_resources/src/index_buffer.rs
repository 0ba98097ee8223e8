use parking_lot::RwLock;

use oktaeder_core::{OktaederError, Result};

use crate::id::{ResourceId, Version};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndexFormat {
    #[default]
    Uint16,
    Uint32,
}

impl IndexFormat {
    /// Bytes per index.
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::Uint16 => 2,
            Self::Uint32 => 4,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
        }
    }
}

#[derive(Debug)]
struct IndexData {
    format: IndexFormat,
    index_count: u32,
    bytes: Vec<u8>,
}

impl IndexData {
    fn allocate(format: IndexFormat, index_count: u32) -> Self {
        Self {
            format,
            index_count,
            bytes: vec![0; index_count as usize * format.size()],
        }
    }
}

#[derive(Debug)]
pub struct IndexBuffer {
    id: ResourceId,
    name: String,
    version: Version,
    data: RwLock<IndexData>,
}

impl IndexBuffer {
    #[must_use]
    pub fn new(name: impl Into<String>, format: IndexFormat, index_count: u32) -> Self {
        Self {
            id: ResourceId::next(),
            name: name.into(),
            version: Version::default(),
            data: RwLock::new(IndexData::allocate(format, index_count)),
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
    pub fn format(&self) -> IndexFormat {
        self.data.read().format
    }

    #[must_use]
    pub fn index_count(&self) -> u32 {
        self.data.read().index_count
    }

    pub fn write_u16(&self, offset: u32, indices: &[u16]) -> Result<()> {
        self.write_typed(offset, IndexFormat::Uint16, indices.len(), bytemuck::cast_slice(indices))
    }

    pub fn write_u32(&self, offset: u32, indices: &[u32]) -> Result<()> {
        self.write_typed(offset, IndexFormat::Uint32, indices.len(), bytemuck::cast_slice(indices))
    }

    /// Writes indices converted to whatever format the buffer has.
    pub fn write_indices(&self, offset: u32, indices: &[u32]) -> Result<()> {
        match self.format() {
            IndexFormat::Uint32 => self.write_u32(offset, indices),
            IndexFormat::Uint16 => {
                debug_assert!(indices.iter().all(|&i| i <= u32::from(u16::MAX)));
                let narrowed: Vec<u16> = indices.iter().map(|&i| i as u16).collect();
                self.write_u16(offset, &narrowed)
            }
        }
    }

    fn write_typed(
        &self,
        offset: u32,
        format: IndexFormat,
        count: usize,
        bytes: &[u8],
    ) -> Result<()> {
        let mut data = self.data.write();
        if data.format != format {
            return Err(OktaederError::IndexFormatMismatch {
                buffer: self.name.clone(),
                expected: data.format.name(),
                actual: format.name(),
            });
        }
        if offset as usize + count > data.index_count as usize {
            return Err(OktaederError::IndexRangeOutOfBounds {
                buffer: self.name.clone(),
                offset,
                count,
                capacity: data.index_count,
            });
        }
        let start = offset as usize * format.size();
        data.bytes[start..start + bytes.len()].copy_from_slice(bytes);
        drop(data);
        self.version.bump();
        Ok(())
    }

    /// Reallocates the buffer. Old contents are discarded.
    pub fn resize_discard(&self, format: IndexFormat, index_count: u32) {
        log::debug!(
            "Resizing index buffer [{}]: {} {} indices",
            self.name,
            index_count,
            format.name()
        );
        *self.data.write() = IndexData::allocate(format, index_count);
        self.version.bump();
    }

    /// Reallocates only when the format differs or the buffer is too small.
    pub fn ensure_size_discard(&self, format: IndexFormat, index_count: u32) {
        let needs_resize = {
            let data = self.data.read();
            data.format != format || data.index_count < index_count
        };
        if needs_resize {
            self.resize_discard(format, index_count);
        }
    }

    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        self.data.read().bytes.clone()
    }
}
