use parking_lot::RwLock;

use oktaeder_core::{OktaederError, Result};

use crate::id::{ResourceId, Version};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// RGBA8 color data in sRGB encoding.
    Srgb,
    /// RGBA8 linear data (normals, roughness, ...).
    Linear,
    /// 32-bit float depth. GPU only.
    Depth,
}

impl TextureFormat {
    /// Bytes per texel of the CPU copy. Depth textures keep none.
    #[must_use]
    pub const fn cpu_texel_size(self) -> usize {
        match self {
            Self::Srgb | Self::Linear => 4,
            Self::Depth => 0,
        }
    }
}

#[derive(Debug)]
struct TextureData {
    width: u32,
    height: u32,
    bytes: Vec<u8>,
}

#[derive(Debug)]
pub struct Texture2D {
    id: ResourceId,
    name: String,
    format: TextureFormat,
    version: Version,
    data: RwLock<TextureData>,
}

impl Texture2D {
    #[must_use]
    pub fn new(name: impl Into<String>, width: u32, height: u32, format: TextureFormat) -> Self {
        Self {
            id: ResourceId::next(),
            name: name.into(),
            format,
            version: Version::default(),
            data: RwLock::new(TextureData {
                width,
                height,
                bytes: vec![0; width as usize * height as usize * format.cpu_texel_size()],
            }),
        }
    }

    /// Creates a texture and fills it in one step.
    pub fn with_data(
        name: impl Into<String>,
        width: u32,
        height: u32,
        format: TextureFormat,
        bytes: &[u8],
    ) -> Result<Self> {
        let texture = Self::new(name, width, height, format);
        texture.write(bytes)?;
        Ok(texture)
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
    pub fn format(&self) -> TextureFormat {
        self.format
    }

    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version.get()
    }

    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        let data = self.data.read();
        (data.width, data.height)
    }

    /// Replaces the full image. `bytes` must be tightly packed RGBA8 rows.
    pub fn write(&self, bytes: &[u8]) -> Result<()> {
        if self.format == TextureFormat::Depth {
            return Err(OktaederError::TextureNotWritable {
                texture: self.name.clone(),
            });
        }
        let mut data = self.data.write();
        if bytes.len() != data.bytes.len() {
            return Err(OktaederError::TextureSizeMismatch {
                texture: self.name.clone(),
                expected: data.bytes.len(),
                actual: bytes.len(),
            });
        }
        data.bytes.copy_from_slice(bytes);
        drop(data);
        self.version.bump();
        Ok(())
    }

    /// Changes the dimensions. Old contents are discarded.
    pub fn resize_discard(&self, width: u32, height: u32) {
        let mut data = self.data.write();
        data.width = width;
        data.height = height;
        data.bytes = vec![0; width as usize * height as usize * self.format.cpu_texel_size()];
        drop(data);
        self.version.bump();
    }

    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        self.data.read().bytes.clone()
    }
}
