use std::sync::Arc;

use log::{debug, error};
use raw_window_handle::RawWindowHandle;

use super::cmd::CommandBufferHeader;
use super::device_selector::{debug_forced, BackendEntry, BackendSelector};
use super::driver::state::{PassError, PassState};
use super::driver::types::*;
use super::driver::Driver;
use super::error::{GPUError, Result};
use super::format::{is_depth_format, negotiate_depth_format};
use super::spirv::{ShaderLanguage, ShaderTranslator};
use super::structs::*;
use crate::utils::Pool;

/// A selected backend plus the recording state of every command buffer
/// acquired from it.
pub struct Device {
    pub(crate) backend: Backend,
    pub(crate) driver: Box<dyn Driver>,
    pub(crate) command_buffers: Pool<CommandBufferHeader, CommandBuffer>,
    translator: Option<Arc<dyn ShaderTranslator>>,
}

impl Device {
    /// Create a device on the best backend compiled into the crate.
    pub fn new(info: &DeviceInfo) -> Result<Self> {
        Self::with_selector(&BackendSelector::new(), info)
    }

    /// Create a device from a caller-provided backend registry.
    pub fn with_registry(registry: &[BackendEntry], info: &DeviceInfo) -> Result<Self> {
        Self::with_selector(&BackendSelector::with_registry(registry), info)
    }

    pub fn with_selector(selector: &BackendSelector<'_>, info: &DeviceInfo) -> Result<Self> {
        let debug_mode = info.debug_mode || debug_forced();
        let (backend, driver) = selector.create_driver(info.preferred_backends, debug_mode)?;
        Ok(Self::with_driver(backend, driver))
    }

    /// Wrap an already constructed driver.
    ///
    /// When the backend needs SPIR-V translated and the `gpucmd-spirv`
    /// feature is on, the shared SPIRV-Cross translator is loaded here.
    pub fn with_driver(backend: Backend, driver: Box<dyn Driver>) -> Self {
        let mut device = Self {
            backend,
            driver,
            command_buffers: Pool::default(),
            translator: None,
        };

        if !device.driver.shader_formats().contains(ShaderFormat::SPIRV)
            && ShaderLanguage::for_backend(backend).is_some()
        {
            device.translator = default_translator();
        }

        device
    }

    /// Tear down the backend. Resources still alive are the caller's leak.
    pub fn destroy(mut self) {
        self.command_buffers.clear();
        self.driver.destroy();
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Replace the translator used for SPIR-V on non-SPIR-V backends.
    pub fn set_shader_translator(&mut self, translator: Option<Arc<dyn ShaderTranslator>>) {
        self.translator = translator;
    }

    pub fn has_shader_translator(&self) -> bool {
        self.translator.is_some()
    }

    ////////////////////////////////////////////////////////////////////////////
    // Queries
    ////////////////////////////////////////////////////////////////////////////

    pub fn is_texture_format_supported(
        &self,
        format: TextureFormat,
        ty: TextureType,
        usage: TextureUsage,
    ) -> bool {
        self.driver.is_texture_format_supported(format, ty, usage)
    }

    pub fn best_sample_count(&self, format: TextureFormat, desired: SampleCount) -> SampleCount {
        self.driver.best_sample_count(format, desired)
    }

    /// Shader encodings the backend consumes without translation.
    pub fn shader_formats(&self) -> ShaderFormat {
        self.driver.shader_formats()
    }

    ////////////////////////////////////////////////////////////////////////////
    // Resource creation
    ////////////////////////////////////////////////////////////////////////////

    /// Unsupported depth formats are replaced by their fallback partner.
    pub fn create_texture(&mut self, info: &TextureInfo) -> Result<Handle<Texture>> {
        let mut info = *info;
        if is_depth_format(info.format) {
            let driver = &self.driver;
            info.format = negotiate_depth_format(info.format, info.usage, |f, ty, usage| {
                driver.is_texture_format_supported(f, ty, usage)
            });
        }

        self.driver.create_texture(&info)
    }

    pub fn create_buffer(&mut self, info: &BufferInfo) -> Result<Handle<Buffer>> {
        self.driver.create_buffer(info)
    }

    pub fn create_transfer_buffer(
        &mut self,
        info: &TransferBufferInfo,
    ) -> Result<Handle<TransferBuffer>> {
        self.driver.create_transfer_buffer(info)
    }

    pub fn create_sampler(&mut self, info: &SamplerInfo) -> Result<Handle<Sampler>> {
        self.driver.create_sampler(info)
    }

    /// SPIR-V is translated first when the backend does not consume it.
    pub fn create_shader(&mut self, info: &ShaderInfo) -> Result<Handle<Shader>> {
        if info.format == ShaderFormat::SPIRV
            && !self.driver.shader_formats().contains(ShaderFormat::SPIRV)
        {
            return self.create_shader_from_spirv(info);
        }

        self.driver.create_shader(info)
    }

    fn create_shader_from_spirv(&mut self, info: &ShaderInfo) -> Result<Handle<Shader>> {
        let language = ShaderLanguage::for_backend(self.backend).ok_or_else(|| {
            GPUError::Translation(format!("no SPIR-V translation target for {}", self.backend))
        })?;
        let translator = self
            .translator
            .clone()
            .ok_or_else(|| GPUError::Translation("no SPIR-V translator loaded".to_string()))?;

        let source = translator.translate(info.code, language)?;
        debug!(
            "Translated {:?} shader '{}' to {:?}",
            info.stage, info.debug_name, language
        );
        self.driver
            .compile_translated_shader(info.stage, info.entry_point, &source)
    }

    pub fn create_compute_pipeline(
        &mut self,
        info: &ComputePipelineInfo,
    ) -> Result<Handle<ComputePipeline>> {
        self.driver.create_compute_pipeline(info)
    }

    /// The depth attachment format goes through the same fallback as
    /// [`Device::create_texture`].
    pub fn create_graphics_pipeline(
        &mut self,
        info: &GraphicsPipelineInfo,
    ) -> Result<Handle<GraphicsPipeline>> {
        let mut info = *info;
        if info.attachment_info.has_depth_stencil_attachment {
            let driver = &self.driver;
            info.attachment_info.depth_stencil_format = negotiate_depth_format(
                info.attachment_info.depth_stencil_format,
                TextureUsage::DEPTH_STENCIL_TARGET,
                |f, ty, usage| driver.is_texture_format_supported(f, ty, usage),
            );
        }

        self.driver.create_graphics_pipeline(&info)
    }

    pub fn create_occlusion_query(&mut self) -> Result<Handle<OcclusionQuery>> {
        self.driver.create_occlusion_query()
    }

    pub fn set_buffer_name(&mut self, buffer: Handle<Buffer>, name: &str) {
        self.driver.set_buffer_name(buffer, name);
    }

    pub fn set_texture_name(&mut self, texture: Handle<Texture>, name: &str) {
        self.driver.set_texture_name(texture, name);
    }

    /// Format the backend actually created `texture` with.
    pub fn texture_format(&self, texture: Handle<Texture>) -> Option<TextureFormat> {
        self.driver.texture_format(texture)
    }

    ////////////////////////////////////////////////////////////////////////////
    // Resource release
    ////////////////////////////////////////////////////////////////////////////

    pub fn release_texture(&mut self, texture: Handle<Texture>) {
        self.driver.release_texture(texture);
    }

    pub fn release_sampler(&mut self, sampler: Handle<Sampler>) {
        self.driver.release_sampler(sampler);
    }

    pub fn release_buffer(&mut self, buffer: Handle<Buffer>) {
        self.driver.release_buffer(buffer);
    }

    pub fn release_transfer_buffer(&mut self, buffer: Handle<TransferBuffer>) {
        self.driver.release_transfer_buffer(buffer);
    }

    pub fn release_shader(&mut self, shader: Handle<Shader>) {
        self.driver.release_shader(shader);
    }

    pub fn release_compute_pipeline(&mut self, pipeline: Handle<ComputePipeline>) {
        self.driver.release_compute_pipeline(pipeline);
    }

    pub fn release_graphics_pipeline(&mut self, pipeline: Handle<GraphicsPipeline>) {
        self.driver.release_graphics_pipeline(pipeline);
    }

    pub fn release_occlusion_query(&mut self, query: Handle<OcclusionQuery>) {
        self.driver.release_occlusion_query(query);
    }

    ////////////////////////////////////////////////////////////////////////////
    // Transfer buffers
    ////////////////////////////////////////////////////////////////////////////

    pub fn map_transfer_buffer(
        &mut self,
        buffer: Handle<TransferBuffer>,
        cycle: bool,
    ) -> Result<&mut [u8]> {
        self.driver.map_transfer_buffer(buffer, cycle)
    }

    pub fn unmap_transfer_buffer(&mut self, buffer: Handle<TransferBuffer>) {
        self.driver.unmap_transfer_buffer(buffer);
    }

    pub fn set_transfer_data(
        &mut self,
        data: &[u8],
        buffer: Handle<TransferBuffer>,
        copy: &BufferCopy,
        cycle: bool,
    ) -> Result<()> {
        self.driver.set_transfer_data(data, buffer, copy, cycle)
    }

    pub fn get_transfer_data(
        &mut self,
        buffer: Handle<TransferBuffer>,
        data: &mut [u8],
        copy: &BufferCopy,
    ) -> Result<()> {
        self.driver.get_transfer_data(buffer, data, copy)
    }

    /// Copy `values` into `buffer` starting at byte `offset`.
    pub fn write_transfer<T: bytemuck::Pod>(
        &mut self,
        buffer: Handle<TransferBuffer>,
        offset: u32,
        values: &[T],
        cycle: bool,
    ) -> Result<()> {
        let bytes: &[u8] = bytemuck::cast_slice(values);
        let copy = BufferCopy {
            src_offset: 0,
            dst_offset: offset,
            size: bytes.len() as u32,
        };
        self.driver.set_transfer_data(bytes, buffer, &copy, cycle)
    }

    /// Read `out.len()` values from `buffer` starting at byte `offset`.
    pub fn read_transfer<T: bytemuck::Pod>(
        &mut self,
        buffer: Handle<TransferBuffer>,
        offset: u32,
        out: &mut [T],
    ) -> Result<()> {
        let bytes: &mut [u8] = bytemuck::cast_slice_mut(out);
        let copy = BufferCopy {
            src_offset: offset,
            dst_offset: 0,
            size: bytes.len() as u32,
        };
        self.driver.get_transfer_data(buffer, bytes, &copy)
    }

    ////////////////////////////////////////////////////////////////////////////
    // Swapchains
    ////////////////////////////////////////////////////////////////////////////

    pub fn supports_swapchain_composition(
        &self,
        window: RawWindowHandle,
        composition: SwapchainComposition,
    ) -> bool {
        self.driver.supports_swapchain_composition(window, composition)
    }

    pub fn supports_present_mode(&self, window: RawWindowHandle, mode: PresentMode) -> bool {
        self.driver.supports_present_mode(window, mode)
    }

    pub fn claim_window(
        &mut self,
        window: RawWindowHandle,
        composition: SwapchainComposition,
        mode: PresentMode,
    ) -> bool {
        self.driver.claim_window(window, composition, mode)
    }

    pub fn unclaim_window(&mut self, window: RawWindowHandle) {
        self.driver.unclaim_window(window);
    }

    pub fn set_swapchain_parameters(
        &mut self,
        window: RawWindowHandle,
        composition: SwapchainComposition,
        mode: PresentMode,
    ) -> bool {
        self.driver.set_swapchain_parameters(window, composition, mode)
    }

    pub fn swapchain_texture_format(&self, window: RawWindowHandle) -> Option<TextureFormat> {
        self.driver.swapchain_texture_format(window)
    }

    ////////////////////////////////////////////////////////////////////////////
    // Fences and queries
    ////////////////////////////////////////////////////////////////////////////

    /// Block until the backend is idle.
    pub fn wait(&mut self) {
        self.driver.wait();
    }

    /// Block until all (`wait_all`) or any of `fences` have signaled.
    pub fn wait_for_fences(&mut self, wait_all: bool, fences: &[Handle<Fence>]) {
        self.driver.wait_for_fences(wait_all, fences);
    }

    pub fn query_fence(&self, fence: Handle<Fence>) -> bool {
        self.driver.query_fence(fence)
    }

    pub fn release_fence(&mut self, fence: Handle<Fence>) {
        self.driver.release_fence(fence);
    }

    pub fn occlusion_query_pixel_count(&self, query: Handle<OcclusionQuery>) -> Option<u32> {
        self.driver.occlusion_query_pixel_count(query)
    }

    ////////////////////////////////////////////////////////////////////////////
    // Command buffer state
    ////////////////////////////////////////////////////////////////////////////

    /// Start a new recording session. Fails only when the backend does.
    pub fn acquire_command_buffer(&mut self) -> Result<Handle<CommandBuffer>> {
        if !self.command_buffers.has_room() {
            error!("Out of command buffer slots, submit pending work first");
            return Err(GPUError::SlotError);
        }

        let raw = self.driver.acquire_command_buffer()?;
        self.command_buffers
            .insert(CommandBufferHeader::new(raw))
            .ok_or(GPUError::SlotError)
    }

    /// Recording state of `cb`, or `None` once it has been submitted.
    pub fn pass_state(&self, cb: Handle<CommandBuffer>) -> Option<PassState> {
        self.command_buffers.get_ref(cb).map(|h| h.pass)
    }

    pub fn is_submitted(&self, cb: Handle<CommandBuffer>) -> bool {
        self.command_buffers.is_retired(cb)
    }

    pub(crate) fn header(
        &self,
        cb: Handle<CommandBuffer>,
    ) -> std::result::Result<CommandBufferHeader, PassError> {
        if !cb.valid() {
            return Err(PassError::InvalidCommandBuffer);
        }

        match self.command_buffers.get_ref(cb) {
            Some(header) => Ok(*header),
            None if self.command_buffers.is_retired(cb) => Err(PassError::AlreadySubmitted),
            None => Err(PassError::InvalidCommandBuffer),
        }
    }

    pub(crate) fn set_pass(&mut self, cb: Handle<CommandBuffer>, pass: PassState) {
        if let Some(header) = self.command_buffers.get_mut_ref(cb) {
            header.pass = pass;
        }
    }
}

#[cfg(feature = "gpucmd-spirv")]
fn default_translator() -> Option<Arc<dyn ShaderTranslator>> {
    match super::spirv::SpirvCross::load() {
        Ok(translator) => Some(Arc::new(translator)),
        Err(err) => {
            debug!("SPIR-V translation unavailable: {}", err);
            None
        }
    }
}

#[cfg(not(feature = "gpucmd-spirv"))]
fn default_translator() -> Option<Arc<dyn ShaderTranslator>> {
    None
}
