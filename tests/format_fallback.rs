mod common;

use std::sync::{Arc, Mutex};

use gpucmd::*;

/// Driver that rejects a fixed set of formats and records what it is asked.
#[derive(Default, Clone)]
struct ProbeDriver {
    unsupported: Vec<TextureFormat>,
    probes: Arc<Mutex<Vec<(TextureFormat, TextureType, TextureUsage)>>>,
    created: Arc<Mutex<Vec<TextureFormat>>>,
}

impl ProbeDriver {
    fn rejecting(formats: &[TextureFormat]) -> Self {
        Self {
            unsupported: formats.to_vec(),
            ..Default::default()
        }
    }
}

impl Driver for ProbeDriver {
    fn is_texture_format_supported(
        &self,
        format: TextureFormat,
        ty: TextureType,
        usage: TextureUsage,
    ) -> bool {
        self.probes.lock().unwrap().push((format, ty, usage));
        !self.unsupported.contains(&format)
    }

    fn shader_formats(&self) -> ShaderFormat {
        ShaderFormat::SPIRV
    }

    fn create_texture(&mut self, info: &TextureInfo) -> Result<Handle<Texture>> {
        self.created.lock().unwrap().push(info.format);
        Ok(Handle::new(0, 1))
    }

    fn create_graphics_pipeline(
        &mut self,
        info: &GraphicsPipelineInfo,
    ) -> Result<Handle<GraphicsPipeline>> {
        self.created
            .lock()
            .unwrap()
            .push(info.attachment_info.depth_stencil_format);
        Ok(Handle::new(0, 1))
    }

    fn acquire_command_buffer(&mut self) -> Result<Handle<CommandBuffer>> {
        Ok(Handle::new(0, 1))
    }

    fn submit(&mut self, _cb: Handle<CommandBuffer>) -> Result<()> {
        Ok(())
    }

    fn submit_and_acquire_fence(&mut self, _cb: Handle<CommandBuffer>) -> Result<Handle<Fence>> {
        Ok(Handle::new(0, 1))
    }
}

fn device(driver: &ProbeDriver) -> Device {
    common::take_logs();
    Device::with_driver(Backend::Vulkan, Box::new(driver.clone()))
}

fn depth_texture(format: TextureFormat, ty: TextureType) -> TextureInfo<'static> {
    TextureInfo {
        debug_name: "depth",
        ty,
        format,
        usage: TextureUsage::DEPTH_STENCIL_TARGET | TextureUsage::SAMPLER,
        ..Default::default()
    }
}

#[test]
fn unsupported_depth_texture_uses_partner() {
    let driver = ProbeDriver::rejecting(&[TextureFormat::D24Unorm]);
    let mut device = device(&driver);

    device
        .create_texture(&depth_texture(TextureFormat::D24Unorm, TextureType::Cube))
        .unwrap();
    assert_eq!(*driver.created.lock().unwrap(), vec![TextureFormat::D32Sfloat]);
    assert_eq!(
        common::warnings(),
        vec!["Requested unsupported depth format D24Unorm, falling back to format D32Sfloat!"]
    );

    // The probe is always made as a 2D texture with the texture's usage.
    let probes = driver.probes.lock().unwrap();
    assert_eq!(
        probes[0],
        (
            TextureFormat::D24Unorm,
            TextureType::TwoD,
            TextureUsage::DEPTH_STENCIL_TARGET | TextureUsage::SAMPLER
        )
    );
}

#[test]
fn stencil_formats_pair_up() {
    let driver = ProbeDriver::rejecting(&[TextureFormat::D32SfloatS8Uint]);
    let mut device = device(&driver);

    device
        .create_texture(&depth_texture(
            TextureFormat::D32SfloatS8Uint,
            TextureType::TwoD,
        ))
        .unwrap();
    assert_eq!(
        *driver.created.lock().unwrap(),
        vec![TextureFormat::D24UnormS8Uint]
    );
}

#[test]
fn supported_and_color_formats_pass_through() {
    let driver = ProbeDriver::rejecting(&[TextureFormat::R8G8B8A8]);
    let mut device = device(&driver);

    device
        .create_texture(&depth_texture(TextureFormat::D24Unorm, TextureType::TwoD))
        .unwrap();
    device
        .create_texture(&TextureInfo {
            format: TextureFormat::R8G8B8A8,
            usage: TextureUsage::SAMPLER,
            ..Default::default()
        })
        .unwrap();

    assert_eq!(
        *driver.created.lock().unwrap(),
        vec![TextureFormat::D24Unorm, TextureFormat::R8G8B8A8]
    );
    assert!(common::warnings().is_empty());
    // Color formats are never probed.
    assert_eq!(driver.probes.lock().unwrap().len(), 1);
}

#[test]
fn pipeline_depth_attachment_falls_back() {
    let driver = ProbeDriver::rejecting(&[TextureFormat::D24UnormS8Uint]);
    let mut device = device(&driver);

    let mut info = GraphicsPipelineInfo::default();
    info.attachment_info.has_depth_stencil_attachment = true;
    info.attachment_info.depth_stencil_format = TextureFormat::D24UnormS8Uint;
    device.create_graphics_pipeline(&info).unwrap();

    assert_eq!(
        *driver.created.lock().unwrap(),
        vec![TextureFormat::D32SfloatS8Uint]
    );
    let warnings = common::warnings();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("D24UnormS8Uint"));
    assert!(warnings[0].contains("D32SfloatS8Uint"));
    assert_eq!(
        driver.probes.lock().unwrap()[0],
        (
            TextureFormat::D24UnormS8Uint,
            TextureType::TwoD,
            TextureUsage::DEPTH_STENCIL_TARGET
        )
    );
}

#[test]
fn pipeline_without_depth_is_not_probed() {
    let driver = ProbeDriver::rejecting(&[TextureFormat::D16Unorm]);
    let mut device = device(&driver);

    device
        .create_graphics_pipeline(&GraphicsPipelineInfo::default())
        .unwrap();
    assert!(driver.probes.lock().unwrap().is_empty());
}

#[test]
fn null_driver_creates_the_fallback() {
    let (mut device, trace) = common::device_on(
        NullDriver::default().with_unsupported_formats(&[TextureFormat::D32Sfloat]),
    );
    common::take_logs();

    let texture = device
        .create_texture(&depth_texture(TextureFormat::D32Sfloat, TextureType::TwoD))
        .unwrap();
    assert_eq!(trace.count("create_texture"), 1);
    assert_eq!(device.texture_format(texture), Some(TextureFormat::D24Unorm));
    assert_eq!(common::warnings().len(), 1);

    let supported = device
        .create_texture(&depth_texture(TextureFormat::D16Unorm, TextureType::TwoD))
        .unwrap();
    assert_eq!(device.texture_format(supported), Some(TextureFormat::D16Unorm));
    assert!(common::warnings().is_empty());
}
