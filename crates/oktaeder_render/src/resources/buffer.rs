//! Growable GPU buffers.

/// Smallest allocation handed to wgpu. Storage bindings must not be empty.
const MIN_BUFFER_SIZE: u64 = 256;

/// A GPU buffer that is rewritten wholesale and grows when the data outgrows
/// it.
///
/// Growing destroys the old buffer. The generation counter moves on every
/// reallocation so bind groups that captured the old buffer can be rebuilt.
#[derive(Debug)]
pub struct GpuBuffer {
    buffer: wgpu::Buffer,
    size: u64,
    usage: wgpu::BufferUsages,
    label: String,
    generation: u64,
}

impl GpuBuffer {
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        label: impl Into<String>,
        size: u64,
        usage: wgpu::BufferUsages,
    ) -> Self {
        let label = label.into();
        let usage = usage | wgpu::BufferUsages::COPY_DST;
        let size = aligned_size(size.max(MIN_BUFFER_SIZE));
        let buffer = create(device, &label, size, usage);
        Self {
            buffer,
            size,
            usage,
            label,
            generation: 0,
        }
    }

    /// Uploads `data` at offset zero. Returns `true` if the buffer had to be
    /// reallocated first.
    pub fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, data: &[u8]) -> bool {
        if data.is_empty() {
            return false;
        }

        let required = aligned_size(data.len() as u64);
        let mut reallocated = false;
        if required > self.size {
            let new_size = required.next_power_of_two();
            log::debug!(
                "Growing buffer '{}' from {} to {} bytes",
                self.label,
                self.size,
                new_size
            );
            self.buffer.destroy();
            self.buffer = create(device, &self.label, new_size, self.usage);
            self.size = new_size;
            self.generation += 1;
            reallocated = true;
        }

        // write_buffer wants a multiple of four bytes
        if data.len() % 4 == 0 {
            queue.write_buffer(&self.buffer, 0, data);
        } else {
            let mut padded = Vec::with_capacity(required as usize);
            padded.extend_from_slice(data);
            padded.resize(required as usize, 0);
            queue.write_buffer(&self.buffer, 0, &padded);
        }
        reallocated
    }

    #[inline]
    #[must_use]
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Frees the GPU memory now instead of when the last handle drops.
    pub fn destroy(&self) {
        self.buffer.destroy();
    }
}

fn create(
    device: &wgpu::Device,
    label: &str,
    size: u64,
    usage: wgpu::BufferUsages,
) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size,
        usage,
        mapped_at_creation: false,
    })
}

/// Rounds up to [`wgpu::COPY_BUFFER_ALIGNMENT`].
#[inline]
#[must_use]
pub fn aligned_size(size: u64) -> u64 {
    size.div_ceil(wgpu::COPY_BUFFER_ALIGNMENT) * wgpu::COPY_BUFFER_ALIGNMENT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aligned_size_rounds_up_to_four() {
        assert_eq!(aligned_size(0), 0);
        assert_eq!(aligned_size(1), 4);
        assert_eq!(aligned_size(4), 4);
        assert_eq!(aligned_size(6), 8);
    }
}
