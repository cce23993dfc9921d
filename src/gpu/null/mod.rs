//! Headless backend.
//!
//! Resources live in host memory. Copy-pass work touching buffers is recorded
//! per command buffer and replayed at submission, so uploads, downloads and
//! buffer copies move real bytes; every other command is a no-op that is
//! recorded into a [`CallTrace`] when one was requested. Work is complete as
//! soon as it is submitted.

mod trace;

pub use trace::CallTrace;

use log::{debug, error};
use raw_window_handle::RawWindowHandle;

use crate::gpu::device_selector::BackendEntry;
use crate::gpu::driver::types::*;
use crate::gpu::driver::Driver;
use crate::gpu::error::{GPUError, Result};
use crate::gpu::structs::*;
use crate::utils::Pool;

pub const NULL_BACKEND: BackendEntry = BackendEntry {
    name: "null",
    backend: Backend::Null,
    prepare: prepare_null,
    create: create_null,
};

fn prepare_null() -> bool {
    true
}

fn create_null(debug_mode: bool) -> Result<Box<dyn Driver>> {
    Ok(Box::new(NullDriver::new(debug_mode)))
}

#[derive(Debug)]
struct NullTexture {
    name: String,
    format: TextureFormat,
    usage: TextureUsage,
}

#[derive(Debug)]
struct NullBuffer {
    name: String,
    data: Vec<u8>,
}

#[derive(Debug)]
struct NullTransferBuffer {
    data: Vec<u8>,
    mapped: bool,
}

#[derive(Debug)]
struct NullShader {
    stage: ShaderStage,
}

#[derive(Debug)]
struct NullGraphicsPipeline {
    depth_stencil_format: Option<TextureFormat>,
}

#[derive(Debug, Default)]
struct NullQuery {
    active: bool,
    pixel_count: Option<u32>,
}

#[derive(Debug)]
struct NullFence {
    signaled: bool,
}

#[derive(Debug, Clone, Copy)]
enum NullCommand {
    UploadToBuffer {
        src: Handle<TransferBuffer>,
        dst: Handle<Buffer>,
        copy: BufferCopy,
        cycle: bool,
    },
    DownloadFromBuffer {
        src: Handle<Buffer>,
        dst: Handle<TransferBuffer>,
        copy: BufferCopy,
    },
    CopyBufferToBuffer {
        src: Handle<Buffer>,
        dst: Handle<Buffer>,
        copy: BufferCopy,
        cycle: bool,
    },
}

#[derive(Debug, Default)]
struct NullCommandBuffer {
    commands: Vec<NullCommand>,
}

/// Native window handles are only compared, never dereferenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WindowKey(RawWindowHandle);

// SAFETY: the wrapped handle is an opaque identifier here.
unsafe impl Send for WindowKey {}

#[derive(Debug)]
struct NullWindow {
    key: WindowKey,
    composition: SwapchainComposition,
    present_mode: PresentMode,
    backbuffer: Handle<Texture>,
}

fn copy_range(
    src: &[u8],
    src_offset: u32,
    dst: &mut [u8],
    dst_offset: u32,
    size: u32,
) -> Result<()> {
    let (src_offset, dst_offset, size) = (src_offset as usize, dst_offset as usize, size as usize);
    let out_of_bounds = |offset: usize, len: usize| GPUError::OutOfBounds {
        offset: offset as u64,
        size: size as u64,
        len: len as u64,
    };

    let src_range = src
        .get(src_offset..src_offset + size)
        .ok_or_else(|| out_of_bounds(src_offset, src.len()))?;
    let dst_len = dst.len();
    let dst_range = dst
        .get_mut(dst_offset..dst_offset + size)
        .ok_or_else(|| out_of_bounds(dst_offset, dst_len))?;
    dst_range.copy_from_slice(src_range);
    Ok(())
}

/// Fresh zeroed storage for a cycled allocation.
fn cycle_storage(data: &mut Vec<u8>) {
    let len = data.len();
    *data = vec![0; len];
}

/// In-process [`Driver`] with no GPU behind it.
pub struct NullDriver {
    debug_mode: bool,
    trace: Option<CallTrace>,
    unsupported_formats: Vec<TextureFormat>,
    shader_formats: ShaderFormat,
    swapchain_extent: [u32; 2],
    textures: Pool<NullTexture, Texture>,
    buffers: Pool<NullBuffer, Buffer>,
    transfer_buffers: Pool<NullTransferBuffer, TransferBuffer>,
    samplers: Pool<SamplerInfo, Sampler>,
    shaders: Pool<NullShader, Shader>,
    graphics_pipelines: Pool<NullGraphicsPipeline, GraphicsPipeline>,
    compute_pipelines: Pool<[u32; 3], ComputePipeline>,
    queries: Pool<NullQuery, OcclusionQuery>,
    fences: Pool<NullFence, Fence>,
    command_buffers: Pool<NullCommandBuffer, CommandBuffer>,
    windows: Vec<NullWindow>,
}

impl Default for NullDriver {
    fn default() -> Self {
        Self::new(false)
    }
}

impl NullDriver {
    pub fn new(debug_mode: bool) -> Self {
        Self {
            debug_mode,
            trace: None,
            unsupported_formats: Vec::new(),
            shader_formats: ShaderFormat::SPIRV,
            swapchain_extent: [1280, 1024],
            textures: Default::default(),
            buffers: Default::default(),
            transfer_buffers: Default::default(),
            samplers: Default::default(),
            shaders: Default::default(),
            graphics_pipelines: Default::default(),
            compute_pipelines: Default::default(),
            queries: Default::default(),
            fences: Default::default(),
            command_buffers: Default::default(),
            windows: Vec::new(),
        }
    }

    /// Report `formats` as unsupported for every type and usage.
    pub fn with_unsupported_formats(mut self, formats: &[TextureFormat]) -> Self {
        self.unsupported_formats = formats.to_vec();
        self
    }

    /// Shader encodings accepted by `create_shader`.
    pub fn with_shader_formats(mut self, formats: ShaderFormat) -> Self {
        self.shader_formats = formats;
        self
    }

    pub fn with_swapchain_extent(mut self, width: u32, height: u32) -> Self {
        self.swapchain_extent = [width, height];
        self
    }

    /// Record every call made on this driver from now on.
    pub fn with_trace(mut self) -> Self {
        self.trace = Some(CallTrace::default());
        self
    }

    /// Shared view of the recorded calls, `None` unless built
    /// [`with_trace`](Self::with_trace).
    pub fn trace(&self) -> Option<CallTrace> {
        self.trace.clone()
    }

    pub fn debug_mode(&self) -> bool {
        self.debug_mode
    }

    fn record(&self, call: &'static str) {
        if self.debug_mode {
            debug!("null: {}", call);
        }
        if let Some(trace) = &self.trace {
            trace.record(call);
        }
    }

    fn push_command(&mut self, cb: Handle<CommandBuffer>, command: NullCommand) {
        match self.command_buffers.get_mut_ref(cb) {
            Some(recording) => recording.commands.push(command),
            None => error!("null: {:?} is not a recording command buffer", cb),
        }
    }

    fn window(&self, window: RawWindowHandle) -> Option<&NullWindow> {
        self.windows.iter().find(|w| w.key == WindowKey(window))
    }

    fn run(&mut self, command: NullCommand) -> Result<()> {
        match command {
            NullCommand::UploadToBuffer {
                src,
                dst,
                copy,
                cycle,
            } => {
                let src = self
                    .transfer_buffers
                    .get_ref(src)
                    .ok_or(GPUError::InvalidHandle("transfer buffer"))?;
                let dst = self
                    .buffers
                    .get_mut_ref(dst)
                    .ok_or(GPUError::InvalidHandle("buffer"))?;
                if cycle {
                    cycle_storage(&mut dst.data);
                }
                copy_range(&src.data, copy.src_offset, &mut dst.data, copy.dst_offset, copy.size)
            }
            NullCommand::DownloadFromBuffer { src, dst, copy } => {
                let src = self
                    .buffers
                    .get_ref(src)
                    .ok_or(GPUError::InvalidHandle("buffer"))?;
                let dst = self
                    .transfer_buffers
                    .get_mut_ref(dst)
                    .ok_or(GPUError::InvalidHandle("transfer buffer"))?;
                copy_range(&src.data, copy.src_offset, &mut dst.data, copy.dst_offset, copy.size)
            }
            NullCommand::CopyBufferToBuffer {
                src,
                dst,
                copy,
                cycle,
            } => {
                let staged = {
                    let src = self
                        .buffers
                        .get_ref(src)
                        .ok_or(GPUError::InvalidHandle("buffer"))?;
                    let mut staged = vec![0; copy.size as usize];
                    copy_range(&src.data, copy.src_offset, &mut staged, 0, copy.size)?;
                    staged
                };
                let dst = self
                    .buffers
                    .get_mut_ref(dst)
                    .ok_or(GPUError::InvalidHandle("buffer"))?;
                if cycle {
                    cycle_storage(&mut dst.data);
                }
                copy_range(&staged, 0, &mut dst.data, copy.dst_offset, copy.size)
            }
        }
    }

    /// Replay and retire a command buffer.
    fn execute(&mut self, cb: Handle<CommandBuffer>) -> Result<()> {
        let recording = self
            .command_buffers
            .release(cb)
            .ok_or(GPUError::InvalidHandle("command buffer"))?;

        for command in recording.commands {
            self.run(command)?;
        }
        Ok(())
    }
}

impl Driver for NullDriver {
    fn is_texture_format_supported(
        &self,
        format: TextureFormat,
        _ty: TextureType,
        _usage: TextureUsage,
    ) -> bool {
        self.record("is_texture_format_supported");
        !self.unsupported_formats.contains(&format)
    }

    fn best_sample_count(&self, format: TextureFormat, desired: SampleCount) -> SampleCount {
        self.record("best_sample_count");
        if self.unsupported_formats.contains(&format) {
            SampleCount::S1
        } else {
            desired
        }
    }

    fn shader_formats(&self) -> ShaderFormat {
        self.shader_formats
    }

    fn destroy(&mut self) {
        self.record("destroy");
        self.command_buffers.clear();
        self.fences.clear();
        self.queries.clear();
        self.compute_pipelines.clear();
        self.graphics_pipelines.clear();
        self.shaders.clear();
        self.samplers.clear();
        self.transfer_buffers.clear();
        self.buffers.clear();
        self.textures.clear();
        self.windows.clear();
    }

    fn create_texture(&mut self, info: &TextureInfo) -> Result<Handle<Texture>> {
        self.record("create_texture");
        if !self.is_texture_format_supported(info.format, info.ty, info.usage) {
            return Err(GPUError::ResourceCreation(format!(
                "texture format {:?} is not supported",
                info.format
            )));
        }

        self.textures
            .insert(NullTexture {
                name: info.debug_name.to_string(),
                format: info.format,
                usage: info.usage,
            })
            .ok_or(GPUError::SlotError)
    }

    fn create_buffer(&mut self, info: &BufferInfo) -> Result<Handle<Buffer>> {
        self.record("create_buffer");
        self.buffers
            .insert(NullBuffer {
                name: info.debug_name.to_string(),
                data: vec![0; info.byte_size as usize],
            })
            .ok_or(GPUError::SlotError)
    }

    fn create_transfer_buffer(
        &mut self,
        info: &TransferBufferInfo,
    ) -> Result<Handle<TransferBuffer>> {
        self.record("create_transfer_buffer");
        self.transfer_buffers
            .insert(NullTransferBuffer {
                data: vec![0; info.byte_size as usize],
                mapped: false,
            })
            .ok_or(GPUError::SlotError)
    }

    fn create_sampler(&mut self, info: &SamplerInfo) -> Result<Handle<Sampler>> {
        self.record("create_sampler");
        self.samplers.insert(*info).ok_or(GPUError::SlotError)
    }

    fn create_shader(&mut self, info: &ShaderInfo) -> Result<Handle<Shader>> {
        self.record("create_shader");
        if !self.shader_formats.contains(info.format) || info.format.is_empty() {
            return Err(GPUError::UnsupportedShaderFormat);
        }

        self.shaders
            .insert(NullShader { stage: info.stage })
            .ok_or(GPUError::SlotError)
    }

    fn compile_translated_shader(
        &mut self,
        stage: ShaderStage,
        _entry_point: &str,
        source: &str,
    ) -> Result<Handle<Shader>> {
        self.record("compile_translated_shader");
        if source.is_empty() {
            return Err(GPUError::ResourceCreation("empty shader source".to_string()));
        }

        self.shaders
            .insert(NullShader { stage })
            .ok_or(GPUError::SlotError)
    }

    fn create_compute_pipeline(
        &mut self,
        info: &ComputePipelineInfo,
    ) -> Result<Handle<ComputePipeline>> {
        self.record("create_compute_pipeline");
        if !self.shader_formats.contains(info.format) || info.format.is_empty() {
            return Err(GPUError::UnsupportedShaderFormat);
        }

        self.compute_pipelines
            .insert(info.thread_count)
            .ok_or(GPUError::SlotError)
    }

    fn create_graphics_pipeline(
        &mut self,
        info: &GraphicsPipelineInfo,
    ) -> Result<Handle<GraphicsPipeline>> {
        self.record("create_graphics_pipeline");
        let stages = (
            self.shaders.get_ref(info.vertex_shader).map(|s| s.stage),
            self.shaders.get_ref(info.fragment_shader).map(|s| s.stage),
        );
        if stages != (Some(ShaderStage::Vertex), Some(ShaderStage::Fragment)) {
            return Err(GPUError::InvalidHandle("shader"));
        }

        let attachments = &info.attachment_info;
        let depth_stencil_format = attachments
            .has_depth_stencil_attachment
            .then_some(attachments.depth_stencil_format);

        self.graphics_pipelines
            .insert(NullGraphicsPipeline {
                depth_stencil_format,
            })
            .ok_or(GPUError::SlotError)
    }

    fn create_occlusion_query(&mut self) -> Result<Handle<OcclusionQuery>> {
        self.record("create_occlusion_query");
        self.queries
            .insert(NullQuery::default())
            .ok_or(GPUError::SlotError)
    }

    fn set_buffer_name(&mut self, buffer: Handle<Buffer>, name: &str) {
        self.record("set_buffer_name");
        if let Some(buffer) = self.buffers.get_mut_ref(buffer) {
            buffer.name = name.to_string();
        }
    }

    fn set_texture_name(&mut self, texture: Handle<Texture>, name: &str) {
        self.record("set_texture_name");
        if let Some(texture) = self.textures.get_mut_ref(texture) {
            texture.name = name.to_string();
        }
    }

    fn texture_format(&self, texture: Handle<Texture>) -> Option<TextureFormat> {
        self.record("texture_format");
        self.textures.get_ref(texture).map(|t| t.format)
    }

    fn set_string_marker(&mut self, _cb: Handle<CommandBuffer>, text: &str) {
        self.record("set_string_marker");
        if self.debug_mode {
            debug!("null marker: {}", text);
        }
    }

    fn release_texture(&mut self, texture: Handle<Texture>) {
        self.record("release_texture");
        if let Some(texture) = self.textures.release(texture) {
            if self.debug_mode {
                debug!(
                    "null: released texture '{}' ({:?}, {:?})",
                    texture.name, texture.format, texture.usage
                );
            }
        }
    }

    fn release_sampler(&mut self, sampler: Handle<Sampler>) {
        self.record("release_sampler");
        self.samplers.release(sampler);
    }

    fn release_buffer(&mut self, buffer: Handle<Buffer>) {
        self.record("release_buffer");
        if let Some(buffer) = self.buffers.release(buffer) {
            if self.debug_mode {
                debug!("null: released buffer '{}'", buffer.name);
            }
        }
    }

    fn release_transfer_buffer(&mut self, buffer: Handle<TransferBuffer>) {
        self.record("release_transfer_buffer");
        self.transfer_buffers.release(buffer);
    }

    fn release_shader(&mut self, shader: Handle<Shader>) {
        self.record("release_shader");
        self.shaders.release(shader);
    }

    fn release_compute_pipeline(&mut self, pipeline: Handle<ComputePipeline>) {
        self.record("release_compute_pipeline");
        self.compute_pipelines.release(pipeline);
    }

    fn release_graphics_pipeline(&mut self, pipeline: Handle<GraphicsPipeline>) {
        self.record("release_graphics_pipeline");
        if let Some(pipeline) = self.graphics_pipelines.release(pipeline) {
            if self.debug_mode {
                debug!(
                    "null: released graphics pipeline (depth {:?})",
                    pipeline.depth_stencil_format
                );
            }
        }
    }

    fn release_occlusion_query(&mut self, query: Handle<OcclusionQuery>) {
        self.record("release_occlusion_query");
        self.queries.release(query);
    }

    fn begin_render_pass(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _color_attachments: &[ColorAttachmentInfo],
        _depth_stencil_attachment: Option<&DepthStencilAttachmentInfo>,
    ) {
        self.record("begin_render_pass");
    }

    fn bind_graphics_pipeline(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _pipeline: Handle<GraphicsPipeline>,
    ) {
        self.record("bind_graphics_pipeline");
    }

    fn set_viewport(&mut self, _cb: Handle<CommandBuffer>, _viewport: &Viewport) {
        self.record("set_viewport");
    }

    fn set_scissor(&mut self, _cb: Handle<CommandBuffer>, _scissor: &Rect2D) {
        self.record("set_scissor");
    }

    fn bind_vertex_buffers(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _first_binding: u32,
        _bindings: &[BufferBinding],
    ) {
        self.record("bind_vertex_buffers");
    }

    fn bind_index_buffer(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _binding: &BufferBinding,
        _index_size: IndexElementSize,
    ) {
        self.record("bind_index_buffer");
    }

    fn bind_vertex_samplers(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _first_slot: u32,
        _bindings: &[TextureSamplerBinding],
    ) {
        self.record("bind_vertex_samplers");
    }

    fn bind_vertex_storage_textures(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _first_slot: u32,
        _slices: &[TextureSlice],
    ) {
        self.record("bind_vertex_storage_textures");
    }

    fn bind_vertex_storage_buffers(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _first_slot: u32,
        _buffers: &[Handle<Buffer>],
    ) {
        self.record("bind_vertex_storage_buffers");
    }

    fn bind_fragment_samplers(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _first_slot: u32,
        _bindings: &[TextureSamplerBinding],
    ) {
        self.record("bind_fragment_samplers");
    }

    fn bind_fragment_storage_textures(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _first_slot: u32,
        _slices: &[TextureSlice],
    ) {
        self.record("bind_fragment_storage_textures");
    }

    fn bind_fragment_storage_buffers(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _first_slot: u32,
        _buffers: &[Handle<Buffer>],
    ) {
        self.record("bind_fragment_storage_buffers");
    }

    fn push_vertex_uniform_data(&mut self, _cb: Handle<CommandBuffer>, _slot: u32, _data: &[u8]) {
        self.record("push_vertex_uniform_data");
    }

    fn push_fragment_uniform_data(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _slot: u32,
        _data: &[u8],
    ) {
        self.record("push_fragment_uniform_data");
    }

    fn draw_indexed_primitives(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _base_vertex: u32,
        _start_index: u32,
        _primitive_count: u32,
        _instance_count: u32,
    ) {
        self.record("draw_indexed_primitives");
    }

    fn draw_primitives(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _vertex_start: u32,
        _primitive_count: u32,
    ) {
        self.record("draw_primitives");
    }

    fn draw_primitives_indirect(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _buffer: Handle<Buffer>,
        _offset: u32,
        _draw_count: u32,
        _stride: u32,
    ) {
        self.record("draw_primitives_indirect");
    }

    fn draw_indexed_primitives_indirect(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _buffer: Handle<Buffer>,
        _offset: u32,
        _draw_count: u32,
        _stride: u32,
    ) {
        self.record("draw_indexed_primitives_indirect");
    }

    fn end_render_pass(&mut self, _cb: Handle<CommandBuffer>) {
        self.record("end_render_pass");
    }

    fn begin_compute_pass(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _storage_textures: &[StorageTextureReadWriteBinding],
        _storage_buffers: &[StorageBufferReadWriteBinding],
    ) {
        self.record("begin_compute_pass");
    }

    fn bind_compute_pipeline(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _pipeline: Handle<ComputePipeline>,
    ) {
        self.record("bind_compute_pipeline");
    }

    fn bind_compute_storage_textures(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _first_slot: u32,
        _slices: &[TextureSlice],
    ) {
        self.record("bind_compute_storage_textures");
    }

    fn bind_compute_storage_buffers(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _first_slot: u32,
        _buffers: &[Handle<Buffer>],
    ) {
        self.record("bind_compute_storage_buffers");
    }

    fn push_compute_uniform_data(&mut self, _cb: Handle<CommandBuffer>, _slot: u32, _data: &[u8]) {
        self.record("push_compute_uniform_data");
    }

    fn dispatch_compute(&mut self, _cb: Handle<CommandBuffer>, _x: u32, _y: u32, _z: u32) {
        self.record("dispatch_compute");
    }

    fn end_compute_pass(&mut self, _cb: Handle<CommandBuffer>) {
        self.record("end_compute_pass");
    }

    fn map_transfer_buffer(
        &mut self,
        buffer: Handle<TransferBuffer>,
        cycle: bool,
    ) -> Result<&mut [u8]> {
        self.record("map_transfer_buffer");
        let buffer = self
            .transfer_buffers
            .get_mut_ref(buffer)
            .ok_or(GPUError::InvalidHandle("transfer buffer"))?;
        if cycle {
            cycle_storage(&mut buffer.data);
        }
        buffer.mapped = true;
        Ok(buffer.data.as_mut_slice())
    }

    fn unmap_transfer_buffer(&mut self, buffer: Handle<TransferBuffer>) {
        self.record("unmap_transfer_buffer");
        if let Some(buffer) = self.transfer_buffers.get_mut_ref(buffer) {
            buffer.mapped = false;
        }
    }

    fn set_transfer_data(
        &mut self,
        data: &[u8],
        buffer: Handle<TransferBuffer>,
        copy: &BufferCopy,
        cycle: bool,
    ) -> Result<()> {
        self.record("set_transfer_data");
        let buffer = self
            .transfer_buffers
            .get_mut_ref(buffer)
            .ok_or(GPUError::InvalidHandle("transfer buffer"))?;
        if buffer.mapped {
            return Err(GPUError::TransferBufferMapped);
        }
        if cycle {
            cycle_storage(&mut buffer.data);
        }
        copy_range(data, copy.src_offset, &mut buffer.data, copy.dst_offset, copy.size)
    }

    fn get_transfer_data(
        &mut self,
        buffer: Handle<TransferBuffer>,
        data: &mut [u8],
        copy: &BufferCopy,
    ) -> Result<()> {
        self.record("get_transfer_data");
        let buffer = self
            .transfer_buffers
            .get_ref(buffer)
            .ok_or(GPUError::InvalidHandle("transfer buffer"))?;
        copy_range(&buffer.data, copy.src_offset, data, copy.dst_offset, copy.size)
    }

    fn begin_copy_pass(&mut self, _cb: Handle<CommandBuffer>) {
        self.record("begin_copy_pass");
    }

    fn upload_to_texture(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _source: Handle<TransferBuffer>,
        _destination: &TextureRegion,
        _copy: &BufferImageCopy,
        _cycle: bool,
    ) {
        self.record("upload_to_texture");
    }

    fn upload_to_buffer(
        &mut self,
        cb: Handle<CommandBuffer>,
        source: Handle<TransferBuffer>,
        destination: Handle<Buffer>,
        copy: &BufferCopy,
        cycle: bool,
    ) {
        self.record("upload_to_buffer");
        self.push_command(
            cb,
            NullCommand::UploadToBuffer {
                src: source,
                dst: destination,
                copy: *copy,
                cycle,
            },
        );
    }

    fn copy_texture_to_texture(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _source: &TextureRegion,
        _destination: &TextureRegion,
        _cycle: bool,
    ) {
        self.record("copy_texture_to_texture");
    }

    fn copy_buffer_to_buffer(
        &mut self,
        cb: Handle<CommandBuffer>,
        source: Handle<Buffer>,
        destination: Handle<Buffer>,
        copy: &BufferCopy,
        cycle: bool,
    ) {
        self.record("copy_buffer_to_buffer");
        self.push_command(
            cb,
            NullCommand::CopyBufferToBuffer {
                src: source,
                dst: destination,
                copy: *copy,
                cycle,
            },
        );
    }

    fn generate_mipmaps(&mut self, _cb: Handle<CommandBuffer>, _texture: Handle<Texture>) {
        self.record("generate_mipmaps");
    }

    fn download_from_texture(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _source: &TextureRegion,
        _destination: Handle<TransferBuffer>,
        _copy: &BufferImageCopy,
    ) {
        self.record("download_from_texture");
    }

    fn download_from_buffer(
        &mut self,
        cb: Handle<CommandBuffer>,
        source: Handle<Buffer>,
        destination: Handle<TransferBuffer>,
        copy: &BufferCopy,
    ) {
        self.record("download_from_buffer");
        self.push_command(
            cb,
            NullCommand::DownloadFromBuffer {
                src: source,
                dst: destination,
                copy: *copy,
            },
        );
    }

    fn end_copy_pass(&mut self, _cb: Handle<CommandBuffer>) {
        self.record("end_copy_pass");
    }

    fn blit(
        &mut self,
        _cb: Handle<CommandBuffer>,
        _source: &TextureRegion,
        _destination: &TextureRegion,
        _filter: Filter,
        _cycle: bool,
    ) {
        self.record("blit");
    }

    fn supports_swapchain_composition(
        &self,
        _window: RawWindowHandle,
        composition: SwapchainComposition,
    ) -> bool {
        self.record("supports_swapchain_composition");
        matches!(
            composition,
            SwapchainComposition::Sdr | SwapchainComposition::SdrLinear
        )
    }

    fn supports_present_mode(&self, _window: RawWindowHandle, mode: PresentMode) -> bool {
        self.record("supports_present_mode");
        matches!(mode, PresentMode::Vsync | PresentMode::Immediate)
    }

    fn claim_window(
        &mut self,
        window: RawWindowHandle,
        composition: SwapchainComposition,
        mode: PresentMode,
    ) -> bool {
        self.record("claim_window");
        if self.window(window).is_some() {
            error!("Window already claimed!");
            return false;
        }
        if !self.supports_swapchain_composition(window, composition)
            || !self.supports_present_mode(window, mode)
        {
            return false;
        }

        let format = swapchain_format(composition);
        let Some(backbuffer) = self.textures.insert(NullTexture {
            name: "swapchain".to_string(),
            format,
            usage: TextureUsage::COLOR_TARGET,
        }) else {
            return false;
        };

        self.windows.push(NullWindow {
            key: WindowKey(window),
            composition,
            present_mode: mode,
            backbuffer,
        });
        true
    }

    fn unclaim_window(&mut self, window: RawWindowHandle) {
        self.record("unclaim_window");
        if let Some(index) = self.windows.iter().position(|w| w.key == WindowKey(window)) {
            let window = self.windows.swap_remove(index);
            self.textures.release(window.backbuffer);
        }
    }

    fn set_swapchain_parameters(
        &mut self,
        window: RawWindowHandle,
        composition: SwapchainComposition,
        mode: PresentMode,
    ) -> bool {
        self.record("set_swapchain_parameters");
        if !self.supports_swapchain_composition(window, composition)
            || !self.supports_present_mode(window, mode)
        {
            return false;
        }

        let Some(claimed) = self.windows.iter_mut().find(|w| w.key == WindowKey(window)) else {
            error!("Cannot set swapchain parameters, window has not been claimed!");
            return false;
        };
        claimed.composition = composition;
        claimed.present_mode = mode;
        let backbuffer = claimed.backbuffer;
        if let Some(texture) = self.textures.get_mut_ref(backbuffer) {
            texture.format = swapchain_format(composition);
        }
        true
    }

    fn swapchain_texture_format(&self, window: RawWindowHandle) -> Option<TextureFormat> {
        self.record("swapchain_texture_format");
        self.window(window).map(|w| swapchain_format(w.composition))
    }

    fn acquire_swapchain_texture(
        &mut self,
        _cb: Handle<CommandBuffer>,
        window: RawWindowHandle,
    ) -> Option<SwapchainTexture> {
        self.record("acquire_swapchain_texture");
        let claimed = self.window(window)?;
        if self.debug_mode {
            debug!("null: presenting with {:?}", claimed.present_mode);
        }
        Some(SwapchainTexture {
            texture: claimed.backbuffer,
            width: self.swapchain_extent[0],
            height: self.swapchain_extent[1],
        })
    }

    fn acquire_command_buffer(&mut self) -> Result<Handle<CommandBuffer>> {
        self.record("acquire_command_buffer");
        self.command_buffers
            .insert(NullCommandBuffer::default())
            .ok_or(GPUError::SlotError)
    }

    fn submit(&mut self, cb: Handle<CommandBuffer>) -> Result<()> {
        self.record("submit");
        self.execute(cb)
    }

    fn submit_and_acquire_fence(&mut self, cb: Handle<CommandBuffer>) -> Result<Handle<Fence>> {
        self.record("submit_and_acquire_fence");
        self.execute(cb)?;
        self.fences
            .insert(NullFence { signaled: true })
            .ok_or(GPUError::SlotError)
    }

    fn wait(&mut self) {
        self.record("wait");
    }

    fn wait_for_fences(&mut self, wait_all: bool, fences: &[Handle<Fence>]) {
        self.record("wait_for_fences");
        let signaled = |f: &Handle<Fence>| self.fences.get_ref(*f).map_or(false, |f| f.signaled);
        let done = if wait_all {
            fences.iter().all(signaled)
        } else {
            fences.iter().any(signaled)
        };
        if !done {
            error!("null: waited on fences that can never signal");
        }
    }

    fn query_fence(&self, fence: Handle<Fence>) -> bool {
        self.record("query_fence");
        self.fences.get_ref(fence).map_or(false, |f| f.signaled)
    }

    fn release_fence(&mut self, fence: Handle<Fence>) {
        self.record("release_fence");
        self.fences.release(fence);
    }

    fn occlusion_query_begin(&mut self, _cb: Handle<CommandBuffer>, query: Handle<OcclusionQuery>) {
        self.record("occlusion_query_begin");
        if let Some(query) = self.queries.get_mut_ref(query) {
            query.active = true;
            query.pixel_count = None;
        }
    }

    fn occlusion_query_end(&mut self, _cb: Handle<CommandBuffer>, query: Handle<OcclusionQuery>) {
        self.record("occlusion_query_end");
        if let Some(query) = self.queries.get_mut_ref(query) {
            if query.active {
                query.active = false;
                query.pixel_count = Some(0);
            }
        }
    }

    fn occlusion_query_pixel_count(&self, query: Handle<OcclusionQuery>) -> Option<u32> {
        self.record("occlusion_query_pixel_count");
        self.queries.get_ref(query).and_then(|q| q.pixel_count)
    }
}

fn swapchain_format(composition: SwapchainComposition) -> TextureFormat {
    match composition {
        SwapchainComposition::SdrLinear => TextureFormat::B8G8R8A8Srgb,
        _ => TextureFormat::B8G8R8A8,
    }
}
