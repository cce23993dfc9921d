//! Contract between [`Device`](crate::Device) and a native backend.
//!
//! The device validates recording state before calling into a driver, so a
//! driver may assume that every pass-scoped call arrives inside the matching
//! pass with the required pipeline bound, and that a command buffer is
//! submitted at most once.

pub mod state;
pub mod types;

use raw_window_handle::RawWindowHandle;

use crate::gpu::error::{GPUError, Result};
use crate::gpu::structs::*;
use types::*;

/// Operations every backend provides.
///
/// Recording calls default to no-ops and resource creation defaults to
/// [`GPUError::Unimplemented`], so partial backends only override what they
/// support.
pub trait Driver: Send {
    fn is_texture_format_supported(
        &self,
        format: TextureFormat,
        ty: TextureType,
        usage: TextureUsage,
    ) -> bool;

    fn best_sample_count(&self, _format: TextureFormat, _desired: SampleCount) -> SampleCount {
        SampleCount::S1
    }

    /// Shader encodings consumed without translation.
    fn shader_formats(&self) -> ShaderFormat;

    /// Tear down driver state. Called once from `Device::destroy`.
    fn destroy(&mut self) {}

    ////////////////////////////////////////////////////////////////////////////
    // Resources
    ////////////////////////////////////////////////////////////////////////////

    fn create_texture(&mut self, _info: &TextureInfo) -> Result<Handle<Texture>> {
        Err(GPUError::Unimplemented("create_texture"))
    }

    fn create_buffer(&mut self, _info: &BufferInfo) -> Result<Handle<Buffer>> {
        Err(GPUError::Unimplemented("create_buffer"))
    }

    fn create_transfer_buffer(
        &mut self,
        _info: &TransferBufferInfo,
    ) -> Result<Handle<TransferBuffer>> {
        Err(GPUError::Unimplemented("create_transfer_buffer"))
    }

    fn create_sampler(&mut self, _info: &SamplerInfo) -> Result<Handle<Sampler>> {
        Err(GPUError::Unimplemented("create_sampler"))
    }

    fn create_shader(&mut self, _info: &ShaderInfo) -> Result<Handle<Shader>> {
        Err(GPUError::Unimplemented("create_shader"))
    }

    /// Build a shader from source produced by a
    /// [`ShaderTranslator`](crate::ShaderTranslator).
    fn compile_translated_shader(
        &mut self,
        _stage: ShaderStage,
        _entry_point: &str,
        _source: &str,
    ) -> Result<Handle<Shader>> {
        Err(GPUError::Unimplemented("compile_translated_shader"))
    }

    fn create_compute_pipeline(
        &mut self,
        _info: &ComputePipelineInfo,
    ) -> Result<Handle<ComputePipeline>> {
        Err(GPUError::Unimplemented("create_compute_pipeline"))
    }

    fn create_graphics_pipeline(
        &mut self,
        _info: &GraphicsPipelineInfo,
    ) -> Result<Handle<GraphicsPipeline>> {
        Err(GPUError::Unimplemented("create_graphics_pipeline"))
    }

    fn create_occlusion_query(&mut self) -> Result<Handle<OcclusionQuery>> {
        Err(GPUError::Unimplemented("create_occlusion_query"))
    }

    fn set_buffer_name(&mut self, _buffer: Handle<Buffer>, _name: &str) {}
    fn set_texture_name(&mut self, _texture: Handle<Texture>, _name: &str) {}

    /// Format `texture` was created with, after any substitution.
    fn texture_format(&self, _texture: Handle<Texture>) -> Option<TextureFormat> {
        None
    }

    fn set_string_marker(&mut self, _cb: Handle<CommandBuffer>, _text: &str) {}

    fn release_texture(&mut self, _texture: Handle<Texture>) {}
    fn release_sampler(&mut self, _sampler: Handle<Sampler>) {}
    fn release_buffer(&mut self, _buffer: Handle<Buffer>) {}
    fn release_transfer_buffer(&mut self, _buffer: Handle<TransferBuffer>) {}
    fn release_shader(&mut self, _shader: Handle<Shader>) {}
    fn release_compute_pipeline(&mut self, _pipeline: Handle<ComputePipeline>) {}
    fn release_graphics_pipeline(&mut self, _pipeline: Handle<GraphicsPipeline>) {}
    fn release_occlusion_query(&mut self, _query: Handle<OcclusionQuery>) {}

    ////////////////////////////////////////////////////////////////////////////
    // Render pass
    ////////////////////////////////////////////////////////////////////////////

    fn begin_render_pass(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _color_attachments: &[ColorAttachmentInfo],
        _depth_stencil_attachment: Option<&DepthStencilAttachmentInfo>,
    ) {
    }
    fn bind_graphics_pipeline(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _pipeline: Handle<GraphicsPipeline>,
    ) {
    }
    fn set_viewport(&mut self, _cb: Handle<CommandBuffer>, _viewport: &Viewport) {}
    fn set_scissor(&mut self, _cb: Handle<CommandBuffer>, _scissor: &Rect2D) {}
    fn bind_vertex_buffers(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _first_binding: u32,
        _bindings: &[BufferBinding],
    ) {
    }
    fn bind_index_buffer(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _binding: &BufferBinding,
        _index_size: IndexElementSize,
    ) {
    }
    fn bind_vertex_samplers(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _first_slot: u32,
        _bindings: &[TextureSamplerBinding],
    ) {
    }
    fn bind_vertex_storage_textures(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _first_slot: u32,
        _slices: &[TextureSlice],
    ) {
    }
    fn bind_vertex_storage_buffers(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _first_slot: u32,
        _buffers: &[Handle<Buffer>],
    ) {
    }
    fn bind_fragment_samplers(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _first_slot: u32,
        _bindings: &[TextureSamplerBinding],
    ) {
    }
    fn bind_fragment_storage_textures(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _first_slot: u32,
        _slices: &[TextureSlice],
    ) {
    }
    fn bind_fragment_storage_buffers(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _first_slot: u32,
        _buffers: &[Handle<Buffer>],
    ) {
    }
    fn push_vertex_uniform_data(&mut self, _cb: Handle<CommandBuffer>, _slot: u32, _data: &[u8]) {}
    fn push_fragment_uniform_data(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _slot: u32,
        _data: &[u8],
    ) {
    }
    fn draw_indexed_primitives(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _base_vertex: u32,
        _start_index: u32,
        _primitive_count: u32,
        _instance_count: u32,
    ) {
    }
    fn draw_primitives(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _vertex_start: u32,
        _primitive_count: u32,
    ) {
    }
    fn draw_primitives_indirect(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _buffer: Handle<Buffer>,
        _offset: u32,
        _draw_count: u32,
        _stride: u32,
    ) {
    }
    fn draw_indexed_primitives_indirect(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _buffer: Handle<Buffer>,
        _offset: u32,
        _draw_count: u32,
        _stride: u32,
    ) {
    }
    fn end_render_pass(&mut self, _cb: Handle<CommandBuffer>) {}

    ////////////////////////////////////////////////////////////////////////////
    // Compute pass
    ////////////////////////////////////////////////////////////////////////////

    fn begin_compute_pass(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _storage_textures: &[StorageTextureReadWriteBinding],
        _storage_buffers: &[StorageBufferReadWriteBinding],
    ) {
    }
    fn bind_compute_pipeline(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _pipeline: Handle<ComputePipeline>,
    ) {
    }
    fn bind_compute_storage_textures(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _first_slot: u32,
        _slices: &[TextureSlice],
    ) {
    }
    fn bind_compute_storage_buffers(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _first_slot: u32,
        _buffers: &[Handle<Buffer>],
    ) {
    }
    fn push_compute_uniform_data(&mut self, _cb: Handle<CommandBuffer>, _slot: u32, _data: &[u8]) {
    }
    fn dispatch_compute(&mut self, _cb: Handle<CommandBuffer>, _x: u32, _y: u32, _z: u32) {}
    fn end_compute_pass(&mut self, _cb: Handle<CommandBuffer>) {}

    ////////////////////////////////////////////////////////////////////////////
    // Transfer buffers
    ////////////////////////////////////////////////////////////////////////////

    /// Map the whole allocation. With `cycle` set the driver may hand out a
    /// fresh allocation instead of one still referenced by pending work.
    fn map_transfer_buffer(
        &mut self,
        _buffer: Handle<TransferBuffer>,
        _cycle: bool,
    ) -> Result<&mut [u8]> {
        Err(GPUError::Unimplemented("map_transfer_buffer"))
    }
    fn unmap_transfer_buffer(&mut self, _buffer: Handle<TransferBuffer>) {}
    fn set_transfer_data(
        &mut self,
        _data: &[u8],
        _buffer: Handle<TransferBuffer>,
        _copy: &BufferCopy,
        _cycle: bool,
    ) -> Result<()> {
        Err(GPUError::Unimplemented("set_transfer_data"))
    }
    fn get_transfer_data(
        &mut self,
        _buffer: Handle<TransferBuffer>,
        _data: &mut [u8],
        _copy: &BufferCopy,
    ) -> Result<()> {
        Err(GPUError::Unimplemented("get_transfer_data"))
    }

    ////////////////////////////////////////////////////////////////////////////
    // Copy pass
    ////////////////////////////////////////////////////////////////////////////

    fn begin_copy_pass(&mut self, _cb: Handle<CommandBuffer>) {}
    fn upload_to_texture(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _source: Handle<TransferBuffer>,
        _destination: &TextureRegion,
        _copy: &BufferImageCopy,
        _cycle: bool,
    ) {
    }
    fn upload_to_buffer(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _source: Handle<TransferBuffer>,
        _destination: Handle<Buffer>,
        _copy: &BufferCopy,
        _cycle: bool,
    ) {
    }
    fn copy_texture_to_texture(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _source: &TextureRegion,
        _destination: &TextureRegion,
        _cycle: bool,
    ) {
    }
    fn copy_buffer_to_buffer(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _source: Handle<Buffer>,
        _destination: Handle<Buffer>,
        _copy: &BufferCopy,
        _cycle: bool,
    ) {
    }
    fn generate_mipmaps(&mut self, _cb: Handle<CommandBuffer>, _texture: Handle<Texture>) {}
    fn download_from_texture(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _source: &TextureRegion,
        _destination: Handle<TransferBuffer>,
        _copy: &BufferImageCopy,
    ) {
    }
    fn download_from_buffer(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _source: Handle<Buffer>,
        _destination: Handle<TransferBuffer>,
        _copy: &BufferCopy,
    ) {
    }
    fn end_copy_pass(&mut self, _cb: Handle<CommandBuffer>) {}

    fn blit(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _source: &TextureRegion,
        _destination: &TextureRegion,
        _filter: Filter,
        _cycle: bool,
    ) {
    }

    ////////////////////////////////////////////////////////////////////////////
    // Swapchains
    ////////////////////////////////////////////////////////////////////////////

    fn supports_swapchain_composition(
        &self,
        _window: RawWindowHandle,
        _composition: SwapchainComposition,
    ) -> bool {
        false
    }
    fn supports_present_mode(&self, _window: RawWindowHandle, _mode: PresentMode) -> bool {
        false
    }
    fn claim_window(
        &mut self,
        _window: RawWindowHandle,
        _composition: SwapchainComposition,
        _mode: PresentMode,
    ) -> bool {
        false
    }
    fn unclaim_window(&mut self, _window: RawWindowHandle) {}
    fn set_swapchain_parameters(
        &mut self,
        _window: RawWindowHandle,
        _composition: SwapchainComposition,
        _mode: PresentMode,
    ) -> bool {
        false
    }
    fn swapchain_texture_format(&self, _window: RawWindowHandle) -> Option<TextureFormat> {
        None
    }
    fn acquire_swapchain_texture(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _window: RawWindowHandle,
    ) -> Option<SwapchainTexture> {
        None
    }

    ////////////////////////////////////////////////////////////////////////////
    // Submission and synchronization
    ////////////////////////////////////////////////////////////////////////////

    fn acquire_command_buffer(&mut self) -> Result<Handle<CommandBuffer>>;
    fn submit(&mut self, cb: Handle<CommandBuffer>) -> Result<()>;
    fn submit_and_acquire_fence(&mut self, cb: Handle<CommandBuffer>) -> Result<Handle<Fence>>;

    /// Block until all submitted work has finished.
    fn wait(&mut self) {}
    fn wait_for_fences(&mut self, _wait_all: bool, _fences: &[Handle<Fence>]) {}
    fn query_fence(&self, _fence: Handle<Fence>) -> bool {
        false
    }
    fn release_fence(&mut self, _fence: Handle<Fence>) {}

    fn occlusion_query_begin(&mut self, _cb: Handle<CommandBuffer>, _query: Handle<OcclusionQuery>) {
    }
    fn occlusion_query_end(&mut self, _cb: Handle<CommandBuffer>, _query: Handle<OcclusionQuery>) {}
    /// `None` while the query result is not yet available.
    fn occlusion_query_pixel_count(&self, _query: Handle<OcclusionQuery>) -> Option<u32> {
        None
    }
}
