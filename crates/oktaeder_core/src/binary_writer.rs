//! Growable byte writer for GPU-visible data.
//!
//! All writes are little-endian. Capacity grows to the next power of two, so a
//! writer that is cleared and refilled every frame settles on a fixed
//! allocation after the first few frames.

use bytemuck::Pod;
use glam::{Mat4, Vec2, Vec3, Vec4};

const INITIAL_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
pub struct BinaryWriter {
    bytes: Vec<u8>,
}

impl Default for BinaryWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl BinaryWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity.max(1).next_power_of_two()),
        }
    }

    /// Number of bytes written so far. This is also the current write cursor.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.bytes.capacity()
    }

    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Resets the cursor to zero and keeps the allocation.
    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    /// Makes room for `additional` more bytes without reallocating on the
    /// following writes.
    pub fn reserve(&mut self, additional: usize) {
        let required = self.bytes.len() + additional;
        if required > self.bytes.capacity() {
            let target = required.next_power_of_two();
            self.bytes.reserve_exact(target - self.bytes.len());
        }
    }

    pub fn write_bytes(&mut self, data: &[u8]) {
        self.reserve(data.len());
        self.bytes.extend_from_slice(data);
    }

    #[inline]
    pub fn write_u32(&mut self, value: u32) {
        self.write_bytes(&value.to_le_bytes());
    }

    #[inline]
    pub fn write_f32(&mut self, value: f32) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_vec2(&mut self, value: Vec2) {
        self.write_f32(value.x);
        self.write_f32(value.y);
    }

    pub fn write_vec3(&mut self, value: Vec3) {
        self.write_f32(value.x);
        self.write_f32(value.y);
        self.write_f32(value.z);
    }

    pub fn write_vec4(&mut self, value: Vec4) {
        self.write_f32(value.x);
        self.write_f32(value.y);
        self.write_f32(value.z);
        self.write_f32(value.w);
    }

    /// Writes the matrix column by column.
    pub fn write_mat4(&mut self, value: &Mat4) {
        for f in value.to_cols_array() {
            self.write_f32(f);
        }
    }

    /// Writes the raw bytes of a `#[repr(C)]` value.
    pub fn write_pod<T: Pod>(&mut self, value: &T) {
        self.write_bytes(bytemuck::bytes_of(value));
    }

    /// Zero-fills up to the next multiple of `alignment` and returns the new
    /// cursor.
    pub fn pad_to_align(&mut self, alignment: usize) -> usize {
        debug_assert!(alignment.is_power_of_two());
        let aligned = self.bytes.len().next_multiple_of(alignment);
        let padding = aligned - self.bytes.len();
        if padding > 0 {
            self.reserve(padding);
            self.bytes.resize(aligned, 0);
        }
        aligned
    }
}
