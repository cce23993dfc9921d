mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use common::*;
use gpucmd::*;

/// Driver with unlimited command buffers that counts acquisitions.
#[derive(Default)]
struct CountingDriver {
    acquired: Arc<AtomicUsize>,
}

impl Driver for CountingDriver {
    fn is_texture_format_supported(&self, _: TextureFormat, _: TextureType, _: TextureUsage) -> bool {
        true
    }

    fn shader_formats(&self) -> ShaderFormat {
        ShaderFormat::SPIRV
    }

    fn acquire_command_buffer(&mut self) -> Result<Handle<CommandBuffer>> {
        self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(Handle::new(0, 1))
    }

    fn submit(&mut self, _cb: Handle<CommandBuffer>) -> Result<()> {
        Ok(())
    }

    fn submit_and_acquire_fence(&mut self, _cb: Handle<CommandBuffer>) -> Result<Handle<Fence>> {
        Ok(Handle::new(0, 1))
    }
}

#[test]
fn passes_are_exclusive() {
    let (mut device, trace) = null_device();
    let cb = device.acquire_command_buffer().unwrap();

    let pass = device.begin_render_pass(cb, &[], None);
    assert!(pass.is_some());
    assert!(device.begin_compute_pass(cb, &[], &[]).is_none());
    assert!(device.begin_copy_pass(cb).is_none());
    assert!(device.begin_render_pass(cb, &[], None).is_none());
    assert_eq!(trace.count("begin_render_pass"), 1);
    assert!(!trace.contains("begin_compute_pass"));
    assert!(!trace.contains("begin_copy_pass"));

    device.end_render_pass(pass.unwrap());
    assert_eq!(device.pass_state(cb), Some(PassState::Idle));
    assert!(device.begin_copy_pass(cb).is_some());
}

#[test]
fn draws_need_a_bound_pipeline() {
    let (mut device, trace) = null_device();
    let pipeline = make_graphics_pipeline(&mut device);
    let cb = device.acquire_command_buffer().unwrap();

    let pass = device.begin_render_pass(cb, &[], None).unwrap();
    device.set_viewport(pass, &Viewport::default());
    device.draw_primitives(pass, 0, 3);
    device.push_vertex_uniform(pass, 0, &[1.0f32; 4]);
    assert!(trace.contains("set_viewport"));
    assert!(!trace.contains("draw_primitives"));
    assert!(!trace.contains("push_vertex_uniform_data"));

    device.bind_graphics_pipeline(pass, pipeline);
    assert!(device.pass_state(cb).unwrap().graphics_pipeline_bound());
    device.draw_primitives(pass, 0, 3);
    device.push_vertex_uniform(pass, 0, &[1.0f32; 4]);
    assert_eq!(trace.count("draw_primitives"), 1);
    assert_eq!(trace.count("push_vertex_uniform_data"), 1);
    device.end_render_pass(pass);

    // The binding does not survive the pass.
    let pass = device.begin_render_pass(cb, &[], None).unwrap();
    assert!(!device.pass_state(cb).unwrap().graphics_pipeline_bound());
    device.draw_primitives(pass, 0, 3);
    assert_eq!(trace.count("draw_primitives"), 1);
    device.end_render_pass(pass);
    assert!(device.submit(cb));
}

#[test]
fn compute_dispatch_needs_a_bound_pipeline() {
    let (mut device, trace) = null_device();
    let pipeline = make_compute_pipeline(&mut device);
    let cb = device.acquire_command_buffer().unwrap();

    let pass = device.begin_compute_pass(cb, &[], &[]).unwrap();
    device.dispatch_compute(pass, 1, 1, 1);
    assert!(!trace.contains("dispatch_compute"));

    device.bind_compute_pipeline(pass, pipeline);
    device.push_compute_uniform(pass, 0, &7u32);
    device.dispatch_compute(pass, 4, 4, 1);
    assert_eq!(trace.count("dispatch_compute"), 1);
    assert_eq!(trace.count("push_compute_uniform_data"), 1);

    device.end_compute_pass(pass);
    assert_eq!(device.pass_state(cb), Some(PassState::Idle));
    assert!(device.submit(cb));
}

#[test]
fn pass_tokens_check_the_open_pass() {
    let (mut device, trace) = null_device();
    let cb = device.acquire_command_buffer().unwrap();

    let copy = device.begin_copy_pass(cb).unwrap();
    device.end_copy_pass(copy);
    // Ending twice is refused.
    device.end_copy_pass(copy);
    assert_eq!(trace.count("end_copy_pass"), 1);

    let render = device.begin_render_pass(cb, &[], None).unwrap();
    device.generate_mipmaps(copy, Handle::default());
    assert!(!trace.contains("generate_mipmaps"));
    device.end_render_pass(render);
    assert!(device.submit(cb));
}

#[test]
fn submit_refused_while_pass_open() {
    let (mut device, trace) = null_device();
    let cb = device.acquire_command_buffer().unwrap();

    let pass = device.begin_copy_pass(cb).unwrap();
    assert!(!device.submit(cb));
    assert!(device.submit_and_acquire_fence(cb).is_none());
    assert!(!trace.contains("submit"));
    assert!(!device.is_submitted(cb));

    device.end_copy_pass(pass);
    assert!(device.submit(cb));
    assert_eq!(trace.count("submit"), 1);
    assert!(device.is_submitted(cb));
}

#[test]
fn submitted_buffers_reject_everything() {
    let (mut device, trace) = null_device();
    let cb = device.acquire_command_buffer().unwrap();
    assert!(device.submit(cb));

    assert!(!device.submit(cb));
    assert_eq!(trace.count("submit"), 1);
    assert!(device.begin_render_pass(cb, &[], None).is_none());
    assert!(device.begin_copy_pass(cb).is_none());
    device.set_string_marker(cb, "late");
    assert!(!trace.contains("set_string_marker"));
    assert_eq!(device.pass_state(cb), None);
}

#[test]
fn null_command_buffer_is_rejected() {
    let (mut device, trace) = null_device();
    let cb = Handle::<CommandBuffer>::default();

    assert!(device.begin_render_pass(cb, &[], None).is_none());
    assert!(!device.submit(cb));
    device.blit(
        cb,
        &TextureRegion::default(),
        &TextureRegion::default(),
        Filter::Linear,
        false,
    );
    assert!(!trace.contains("begin_render_pass"));
    assert!(!trace.contains("blit"));
    assert!(!device.is_submitted(cb));
}

#[test]
fn commands_outside_passes_only_need_a_live_buffer() {
    let (mut device, trace) = null_device();
    let query = device.create_occlusion_query().unwrap();
    let cb = device.acquire_command_buffer().unwrap();

    let pass = device.begin_render_pass(cb, &[], None).unwrap();
    device.occlusion_query_begin(cb, query);
    device.occlusion_query_end(cb, query);
    device.set_string_marker(cb, "frame");
    device.end_render_pass(pass);
    device.blit(
        cb,
        &TextureRegion::default(),
        &TextureRegion::default(),
        Filter::Nearest,
        false,
    );

    assert!(trace.contains("occlusion_query_end"));
    assert!(trace.contains("set_string_marker"));
    assert!(trace.contains("blit"));
    assert_eq!(device.occlusion_query_pixel_count(query), Some(0));
    assert!(device.submit(cb));
}

#[test]
fn full_header_pool_does_not_touch_the_driver() {
    init_logging();
    let driver = CountingDriver::default();
    let acquired = Arc::clone(&driver.acquired);
    let mut device = Device::with_driver(Backend::Null, Box::new(driver));

    let slots = u16::MAX as usize + 1;
    for _ in 0..slots {
        device.acquire_command_buffer().unwrap();
    }
    assert_eq!(acquired.load(Ordering::SeqCst), slots);

    assert!(matches!(
        device.acquire_command_buffer(),
        Err(GPUError::SlotError)
    ));
    assert_eq!(acquired.load(Ordering::SeqCst), slots);
}

#[test]
fn submitted_buffer_stays_submitted_across_slot_reuse() {
    init_logging();
    let mut device = Device::with_driver(Backend::Null, Box::new(NullDriver::default()));
    let first = device.acquire_command_buffer().unwrap();
    assert!(device.submit(first));

    for _ in 0..u16::MAX {
        let cb = device.acquire_command_buffer().unwrap();
        assert!(device.submit(cb));
    }

    assert!(device.is_submitted(first));
    assert_eq!(device.pass_state(first), None);
    assert!(!device.submit(first));
    assert!(device.begin_copy_pass(first).is_none());
}
