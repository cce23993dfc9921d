//! Pass recording and submission.
//!
//! Every entry point checks the command buffer's [`PassState`] before the
//! driver sees the call. A failed check is logged at error level and the call
//! becomes a no-op, so a single misuse cannot take a render loop down.

use bytemuck::Pod;
use log::error;
use raw_window_handle::RawWindowHandle;

use super::cmd::{ComputePass, CopyPass, RenderPass};
use super::device::Device;
use super::driver::state::{PassError, PassKind, PassState};
use super::driver::types::*;
use super::structs::*;

/// Unwrap a validation result, or log it and return `$fallback`.
macro_rules! validate {
    ($check:expr, $fallback:expr) => {
        match $check {
            Ok(value) => value,
            Err(err) => {
                error!("{}", err);
                return $fallback;
            }
        }
    };
    ($check:expr) => {
        validate!($check, ())
    };
}

impl Device {
    /// Driver handle for `cb` if it may start a new pass.
    fn idle_target(&self, cb: Handle<CommandBuffer>) -> Result<Handle<CommandBuffer>, PassError> {
        let header = self.header(cb)?;
        header.pass.ensure_idle()?;
        Ok(header.raw)
    }

    /// Driver handle for `cb` if `kind` is active, and its pipeline is bound
    /// when `needs_pipeline` is set.
    fn pass_target(
        &self,
        cb: Handle<CommandBuffer>,
        kind: PassKind,
        needs_pipeline: bool,
    ) -> Result<Handle<CommandBuffer>, PassError> {
        let header = self.header(cb)?;
        if needs_pipeline {
            header.pass.require_pipeline(kind)?;
        } else {
            header.pass.require_pass(kind)?;
        }
        Ok(header.raw)
    }

    fn update_pass<F>(&mut self, cb: Handle<CommandBuffer>, f: F)
    where
        F: FnOnce(&mut PassState) -> Result<(), PassError>,
    {
        let mut state = match self.pass_state(cb) {
            Some(state) => state,
            None => return,
        };
        validate!(f(&mut state));
        self.set_pass(cb, state);
    }

    ////////////////////////////////////////////////////////////////////////////
    // Render pass
    ////////////////////////////////////////////////////////////////////////////

    /// `None` if `cb` was submitted or already has a pass open.
    pub fn begin_render_pass(
        &mut self,
        cb: Handle<CommandBuffer>,
        color_attachments: &[ColorAttachmentInfo],
        depth_stencil_attachment: Option<&DepthStencilAttachmentInfo>,
    ) -> Option<RenderPass> {
        let raw = validate!(self.idle_target(cb), None);
        self.driver
            .begin_render_pass(raw, color_attachments, depth_stencil_attachment);
        self.set_pass(cb, PassState::started(PassKind::Render));
        Some(RenderPass::new(cb))
    }

    pub fn bind_graphics_pipeline(&mut self, pass: RenderPass, pipeline: Handle<GraphicsPipeline>) {
        let cb = pass.command_buffer();
        let raw = validate!(self.pass_target(cb, PassKind::Render, false));
        self.driver.bind_graphics_pipeline(raw, pipeline);
        self.update_pass(cb, |state| state.mark_pipeline_bound(PassKind::Render));
    }

    pub fn set_viewport(&mut self, pass: RenderPass, viewport: &Viewport) {
        let raw = validate!(self.pass_target(pass.command_buffer(), PassKind::Render, false));
        self.driver.set_viewport(raw, viewport);
    }

    pub fn set_scissor(&mut self, pass: RenderPass, scissor: &Rect2D) {
        let raw = validate!(self.pass_target(pass.command_buffer(), PassKind::Render, false));
        self.driver.set_scissor(raw, scissor);
    }

    pub fn bind_vertex_buffers(
        &mut self,
        pass: RenderPass,
        first_binding: u32,
        bindings: &[BufferBinding],
    ) {
        let raw = validate!(self.pass_target(pass.command_buffer(), PassKind::Render, true));
        self.driver.bind_vertex_buffers(raw, first_binding, bindings);
    }

    pub fn bind_index_buffer(
        &mut self,
        pass: RenderPass,
        binding: &BufferBinding,
        index_size: IndexElementSize,
    ) {
        let raw = validate!(self.pass_target(pass.command_buffer(), PassKind::Render, true));
        self.driver.bind_index_buffer(raw, binding, index_size);
    }

    pub fn bind_vertex_samplers(
        &mut self,
        pass: RenderPass,
        first_slot: u32,
        bindings: &[TextureSamplerBinding],
    ) {
        let raw = validate!(self.pass_target(pass.command_buffer(), PassKind::Render, true));
        self.driver.bind_vertex_samplers(raw, first_slot, bindings);
    }

    pub fn bind_vertex_storage_textures(
        &mut self,
        pass: RenderPass,
        first_slot: u32,
        slices: &[TextureSlice],
    ) {
        let raw = validate!(self.pass_target(pass.command_buffer(), PassKind::Render, true));
        self.driver.bind_vertex_storage_textures(raw, first_slot, slices);
    }

    pub fn bind_vertex_storage_buffers(
        &mut self,
        pass: RenderPass,
        first_slot: u32,
        buffers: &[Handle<Buffer>],
    ) {
        let raw = validate!(self.pass_target(pass.command_buffer(), PassKind::Render, true));
        self.driver.bind_vertex_storage_buffers(raw, first_slot, buffers);
    }

    pub fn bind_fragment_samplers(
        &mut self,
        pass: RenderPass,
        first_slot: u32,
        bindings: &[TextureSamplerBinding],
    ) {
        let raw = validate!(self.pass_target(pass.command_buffer(), PassKind::Render, true));
        self.driver.bind_fragment_samplers(raw, first_slot, bindings);
    }

    pub fn bind_fragment_storage_textures(
        &mut self,
        pass: RenderPass,
        first_slot: u32,
        slices: &[TextureSlice],
    ) {
        let raw = validate!(self.pass_target(pass.command_buffer(), PassKind::Render, true));
        self.driver.bind_fragment_storage_textures(raw, first_slot, slices);
    }

    pub fn bind_fragment_storage_buffers(
        &mut self,
        pass: RenderPass,
        first_slot: u32,
        buffers: &[Handle<Buffer>],
    ) {
        let raw = validate!(self.pass_target(pass.command_buffer(), PassKind::Render, true));
        self.driver.bind_fragment_storage_buffers(raw, first_slot, buffers);
    }

    pub fn push_vertex_uniform_data(&mut self, pass: RenderPass, slot: u32, data: &[u8]) {
        let raw = validate!(self.pass_target(pass.command_buffer(), PassKind::Render, true));
        self.driver.push_vertex_uniform_data(raw, slot, data);
    }

    pub fn push_vertex_uniform<T: Pod>(&mut self, pass: RenderPass, slot: u32, value: &T) {
        self.push_vertex_uniform_data(pass, slot, bytemuck::bytes_of(value));
    }

    pub fn push_fragment_uniform_data(&mut self, pass: RenderPass, slot: u32, data: &[u8]) {
        let raw = validate!(self.pass_target(pass.command_buffer(), PassKind::Render, true));
        self.driver.push_fragment_uniform_data(raw, slot, data);
    }

    pub fn push_fragment_uniform<T: Pod>(&mut self, pass: RenderPass, slot: u32, value: &T) {
        self.push_fragment_uniform_data(pass, slot, bytemuck::bytes_of(value));
    }

    pub fn draw_indexed_primitives(
        &mut self,
        pass: RenderPass,
        base_vertex: u32,
        start_index: u32,
        primitive_count: u32,
        instance_count: u32,
    ) {
        let raw = validate!(self.pass_target(pass.command_buffer(), PassKind::Render, true));
        self.driver.draw_indexed_primitives(
            raw,
            base_vertex,
            start_index,
            primitive_count,
            instance_count,
        );
    }

    pub fn draw_primitives(&mut self, pass: RenderPass, vertex_start: u32, primitive_count: u32) {
        let raw = validate!(self.pass_target(pass.command_buffer(), PassKind::Render, true));
        self.driver.draw_primitives(raw, vertex_start, primitive_count);
    }

    /// `buffer` holds `draw_count` [`IndirectDrawCommand`]s `stride` bytes
    /// apart.
    pub fn draw_primitives_indirect(
        &mut self,
        pass: RenderPass,
        buffer: Handle<Buffer>,
        offset: u32,
        draw_count: u32,
        stride: u32,
    ) {
        let raw = validate!(self.pass_target(pass.command_buffer(), PassKind::Render, true));
        self.driver
            .draw_primitives_indirect(raw, buffer, offset, draw_count, stride);
    }

    /// `buffer` holds `draw_count` [`IndexedIndirectDrawCommand`]s `stride`
    /// bytes apart.
    pub fn draw_indexed_primitives_indirect(
        &mut self,
        pass: RenderPass,
        buffer: Handle<Buffer>,
        offset: u32,
        draw_count: u32,
        stride: u32,
    ) {
        let raw = validate!(self.pass_target(pass.command_buffer(), PassKind::Render, true));
        self.driver
            .draw_indexed_primitives_indirect(raw, buffer, offset, draw_count, stride);
    }

    /// Also clears the graphics pipeline binding.
    pub fn end_render_pass(&mut self, pass: RenderPass) {
        let cb = pass.command_buffer();
        let raw = validate!(self.pass_target(cb, PassKind::Render, false));
        self.driver.end_render_pass(raw);
        self.update_pass(cb, |state| state.end(PassKind::Render));
    }

    ////////////////////////////////////////////////////////////////////////////
    // Compute pass
    ////////////////////////////////////////////////////////////////////////////

    pub fn begin_compute_pass(
        &mut self,
        cb: Handle<CommandBuffer>,
        storage_textures: &[StorageTextureReadWriteBinding],
        storage_buffers: &[StorageBufferReadWriteBinding],
    ) -> Option<ComputePass> {
        let raw = validate!(self.idle_target(cb), None);
        self.driver
            .begin_compute_pass(raw, storage_textures, storage_buffers);
        self.set_pass(cb, PassState::started(PassKind::Compute));
        Some(ComputePass::new(cb))
    }

    pub fn bind_compute_pipeline(&mut self, pass: ComputePass, pipeline: Handle<ComputePipeline>) {
        let cb = pass.command_buffer();
        let raw = validate!(self.pass_target(cb, PassKind::Compute, false));
        self.driver.bind_compute_pipeline(raw, pipeline);
        self.update_pass(cb, |state| state.mark_pipeline_bound(PassKind::Compute));
    }

    pub fn bind_compute_storage_textures(
        &mut self,
        pass: ComputePass,
        first_slot: u32,
        slices: &[TextureSlice],
    ) {
        let raw = validate!(self.pass_target(pass.command_buffer(), PassKind::Compute, true));
        self.driver.bind_compute_storage_textures(raw, first_slot, slices);
    }

    pub fn bind_compute_storage_buffers(
        &mut self,
        pass: ComputePass,
        first_slot: u32,
        buffers: &[Handle<Buffer>],
    ) {
        let raw = validate!(self.pass_target(pass.command_buffer(), PassKind::Compute, true));
        self.driver.bind_compute_storage_buffers(raw, first_slot, buffers);
    }

    pub fn push_compute_uniform_data(&mut self, pass: ComputePass, slot: u32, data: &[u8]) {
        let raw = validate!(self.pass_target(pass.command_buffer(), PassKind::Compute, true));
        self.driver.push_compute_uniform_data(raw, slot, data);
    }

    pub fn push_compute_uniform<T: Pod>(&mut self, pass: ComputePass, slot: u32, value: &T) {
        self.push_compute_uniform_data(pass, slot, bytemuck::bytes_of(value));
    }

    pub fn dispatch_compute(&mut self, pass: ComputePass, x: u32, y: u32, z: u32) {
        let raw = validate!(self.pass_target(pass.command_buffer(), PassKind::Compute, true));
        self.driver.dispatch_compute(raw, x, y, z);
    }

    /// Also clears the compute pipeline binding.
    pub fn end_compute_pass(&mut self, pass: ComputePass) {
        let cb = pass.command_buffer();
        let raw = validate!(self.pass_target(cb, PassKind::Compute, false));
        self.driver.end_compute_pass(raw);
        self.update_pass(cb, |state| state.end(PassKind::Compute));
    }

    ////////////////////////////////////////////////////////////////////////////
    // Copy pass
    ////////////////////////////////////////////////////////////////////////////

    pub fn begin_copy_pass(&mut self, cb: Handle<CommandBuffer>) -> Option<CopyPass> {
        let raw = validate!(self.idle_target(cb), None);
        self.driver.begin_copy_pass(raw);
        self.set_pass(cb, PassState::started(PassKind::Copy));
        Some(CopyPass::new(cb))
    }

    pub fn upload_to_texture(
        &mut self,
        pass: CopyPass,
        source: Handle<TransferBuffer>,
        destination: &TextureRegion,
        copy: &BufferImageCopy,
        cycle: bool,
    ) {
        let raw = validate!(self.pass_target(pass.command_buffer(), PassKind::Copy, false));
        self.driver
            .upload_to_texture(raw, source, destination, copy, cycle);
    }

    pub fn upload_to_buffer(
        &mut self,
        pass: CopyPass,
        source: Handle<TransferBuffer>,
        destination: Handle<Buffer>,
        copy: &BufferCopy,
        cycle: bool,
    ) {
        let raw = validate!(self.pass_target(pass.command_buffer(), PassKind::Copy, false));
        self.driver
            .upload_to_buffer(raw, source, destination, copy, cycle);
    }

    pub fn copy_texture_to_texture(
        &mut self,
        pass: CopyPass,
        source: &TextureRegion,
        destination: &TextureRegion,
        cycle: bool,
    ) {
        let raw = validate!(self.pass_target(pass.command_buffer(), PassKind::Copy, false));
        self.driver
            .copy_texture_to_texture(raw, source, destination, cycle);
    }

    pub fn copy_buffer_to_buffer(
        &mut self,
        pass: CopyPass,
        source: Handle<Buffer>,
        destination: Handle<Buffer>,
        copy: &BufferCopy,
        cycle: bool,
    ) {
        let raw = validate!(self.pass_target(pass.command_buffer(), PassKind::Copy, false));
        self.driver
            .copy_buffer_to_buffer(raw, source, destination, copy, cycle);
    }

    pub fn generate_mipmaps(&mut self, pass: CopyPass, texture: Handle<Texture>) {
        let raw = validate!(self.pass_target(pass.command_buffer(), PassKind::Copy, false));
        self.driver.generate_mipmaps(raw, texture);
    }

    pub fn download_from_texture(
        &mut self,
        pass: CopyPass,
        source: &TextureRegion,
        destination: Handle<TransferBuffer>,
        copy: &BufferImageCopy,
    ) {
        let raw = validate!(self.pass_target(pass.command_buffer(), PassKind::Copy, false));
        self.driver
            .download_from_texture(raw, source, destination, copy);
    }

    pub fn download_from_buffer(
        &mut self,
        pass: CopyPass,
        source: Handle<Buffer>,
        destination: Handle<TransferBuffer>,
        copy: &BufferCopy,
    ) {
        let raw = validate!(self.pass_target(pass.command_buffer(), PassKind::Copy, false));
        self.driver
            .download_from_buffer(raw, source, destination, copy);
    }

    pub fn end_copy_pass(&mut self, pass: CopyPass) {
        let cb = pass.command_buffer();
        let raw = validate!(self.pass_target(cb, PassKind::Copy, false));
        self.driver.end_copy_pass(raw);
        self.update_pass(cb, |state| state.end(PassKind::Copy));
    }

    ////////////////////////////////////////////////////////////////////////////
    // Outside passes
    ////////////////////////////////////////////////////////////////////////////

    pub fn blit(
        &mut self,
        cb: Handle<CommandBuffer>,
        source: &TextureRegion,
        destination: &TextureRegion,
        filter: Filter,
        cycle: bool,
    ) {
        let raw = validate!(self.header(cb)).raw;
        self.driver.blit(raw, source, destination, filter, cycle);
    }

    pub fn set_string_marker(&mut self, cb: Handle<CommandBuffer>, text: &str) {
        let raw = validate!(self.header(cb)).raw;
        self.driver.set_string_marker(raw, text);
    }

    /// Backbuffer of a claimed window for this frame, `None` if the window
    /// has nothing to present to right now.
    pub fn acquire_swapchain_texture(
        &mut self,
        cb: Handle<CommandBuffer>,
        window: RawWindowHandle,
    ) -> Option<SwapchainTexture> {
        let raw = validate!(self.header(cb), None).raw;
        self.driver.acquire_swapchain_texture(raw, window)
    }

    pub fn occlusion_query_begin(&mut self, cb: Handle<CommandBuffer>, query: Handle<OcclusionQuery>) {
        let raw = validate!(self.header(cb)).raw;
        self.driver.occlusion_query_begin(raw, query);
    }

    pub fn occlusion_query_end(&mut self, cb: Handle<CommandBuffer>, query: Handle<OcclusionQuery>) {
        let raw = validate!(self.header(cb)).raw;
        self.driver.occlusion_query_end(raw, query);
    }

    ////////////////////////////////////////////////////////////////////////////
    // Submission
    ////////////////////////////////////////////////////////////////////////////

    /// Retire `cb` if no pass is open. The handle stops resolving even if
    /// the driver then fails.
    fn retire(&mut self, cb: Handle<CommandBuffer>) -> Result<Handle<CommandBuffer>, PassError> {
        let header = self.header(cb)?;
        header.pass.ensure_submittable()?;
        self.command_buffers.release(cb);
        Ok(header.raw)
    }

    /// `false` if the submission was refused or the backend failed.
    pub fn submit(&mut self, cb: Handle<CommandBuffer>) -> bool {
        let raw = validate!(self.retire(cb), false);
        match self.driver.submit(raw) {
            Ok(()) => true,
            Err(err) => {
                error!("Submit failed: {}", err);
                false
            }
        }
    }

    /// Like [`Device::submit`], returning a fence that signals once the work
    /// has completed.
    pub fn submit_and_acquire_fence(&mut self, cb: Handle<CommandBuffer>) -> Option<Handle<Fence>> {
        let raw = validate!(self.retire(cb), None);
        match self.driver.submit_and_acquire_fence(raw) {
            Ok(fence) => Some(fence),
            Err(err) => {
                error!("Submit failed: {}", err);
                None
            }
        }
    }
}
