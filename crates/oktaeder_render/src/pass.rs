//! Render pass with state tracking.
//!
//! Skips `set_*` calls that would rebind what is already bound. Resources are
//! identified by caller-chosen ids.

use std::ops::Range;

#[derive(Clone, Copy, PartialEq, Eq)]
struct BindGroupState {
    id: u64,
    offset: Option<u32>,
}

pub struct TrackedRenderPass<'a> {
    pass: wgpu::RenderPass<'a>,
    pipeline: Option<u32>,
    bind_groups: [Option<BindGroupState>; 3],
    vertex_buffers: [Option<u64>; 8],
    index_buffer: Option<u64>,
    draw_calls: u32,
}

impl<'a> TrackedRenderPass<'a> {
    #[must_use]
    pub fn new(pass: wgpu::RenderPass<'a>) -> Self {
        Self {
            pass,
            pipeline: None,
            bind_groups: [None; 3],
            vertex_buffers: [None; 8],
            index_buffer: None,
            draw_calls: 0,
        }
    }

    pub fn set_pipeline(&mut self, key: u32, pipeline: &wgpu::RenderPipeline) {
        if self.pipeline != Some(key) {
            self.pass.set_pipeline(pipeline);
            self.pipeline = Some(key);
        }
    }

    /// Binds a group with at most one dynamic offset.
    pub fn set_bind_group(
        &mut self,
        index: u32,
        id: u64,
        bind_group: &wgpu::BindGroup,
        offset: Option<u32>,
    ) {
        let state = BindGroupState { id, offset };
        let slot = &mut self.bind_groups[index as usize];
        if *slot != Some(state) {
            match offset {
                Some(offset) => self.pass.set_bind_group(index, bind_group, &[offset]),
                None => self.pass.set_bind_group(index, bind_group, &[]),
            }
            *slot = Some(state);
        }
    }

    pub fn set_vertex_buffer(&mut self, slot: u32, id: u64, buffer: &wgpu::Buffer) {
        let current = &mut self.vertex_buffers[slot as usize];
        if *current != Some(id) {
            self.pass.set_vertex_buffer(slot, buffer.slice(..));
            *current = Some(id);
        }
    }

    pub fn set_index_buffer(&mut self, id: u64, buffer: &wgpu::Buffer, format: wgpu::IndexFormat) {
        if self.index_buffer != Some(id) {
            self.pass.set_index_buffer(buffer.slice(..), format);
            self.index_buffer = Some(id);
        }
    }

    pub fn draw_indexed(&mut self, indices: Range<u32>, instances: Range<u32>) {
        self.pass.draw_indexed(indices, 0, instances);
        self.draw_calls += 1;
    }

    #[inline]
    #[must_use]
    pub fn draw_calls(&self) -> u32 {
        self.draw_calls
    }
}
