//! GPU textures for material maps, fallbacks and the depth attachment.

use oktaeder_resources::TextureFormat;

/// wgpu format a CPU texture is uploaded as.
#[must_use]
pub fn wgpu_format(format: TextureFormat) -> wgpu::TextureFormat {
    match format {
        TextureFormat::Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
        TextureFormat::Linear => wgpu::TextureFormat::Rgba8Unorm,
        TextureFormat::Depth => wgpu::TextureFormat::Depth32Float,
    }
}

#[derive(Debug)]
pub struct GpuTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl GpuTexture {
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        usage: wgpu::TextureUsages,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// A sampled texture filled from tightly packed RGBA8 rows.
    #[must_use]
    pub fn with_rgba8(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        data: &[u8],
    ) -> Self {
        let texture = Self::new(
            device,
            label,
            width,
            height,
            format,
            wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        );
        texture.upload_rgba8(queue, data);
        texture
    }

    /// A 1x1 texture holding one texel, bound where a material has no map.
    #[must_use]
    pub fn solid(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        texel: [u8; 4],
        format: wgpu::TextureFormat,
    ) -> Self {
        Self::with_rgba8(device, queue, label, 1, 1, format, &texel)
    }

    pub fn upload_rgba8(&self, queue: &wgpu::Queue, data: &[u8]) {
        let expected = self.width as usize * self.height as usize * 4;
        if data.len() < expected {
            log::warn!(
                "Texture upload of {} bytes is smaller than {}x{} RGBA8, skipped",
                data.len(),
                self.width,
                self.height
            );
            return;
        }

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &data[..expected],
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(self.width * 4),
                rows_per_image: Some(self.height),
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
    }

    #[inline]
    #[must_use]
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn destroy(&self) {
        self.texture.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_formats_keep_their_encoding() {
        assert_eq!(
            wgpu_format(TextureFormat::Srgb),
            wgpu::TextureFormat::Rgba8UnormSrgb
        );
        assert_eq!(
            wgpu_format(TextureFormat::Linear),
            wgpu::TextureFormat::Rgba8Unorm
        );
        assert_eq!(
            wgpu_format(TextureFormat::Depth),
            wgpu::TextureFormat::Depth32Float
        );
    }
}
