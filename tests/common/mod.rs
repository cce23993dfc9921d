#![allow(dead_code)]

use std::cell::RefCell;
use std::sync::OnceLock;

use gpucmd::*;
use log::{Level, LevelFilter, Log, Metadata, Record};

thread_local! {
    static CAPTURED: RefCell<Vec<(Level, String)>> = RefCell::new(Vec::new());
}

/// Keeps every record emitted on the calling test's thread and forwards to
/// `env_logger` for the usual output.
struct CaptureLogger {
    inner: env_logger::Logger,
}

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        CAPTURED.with(|logs| {
            logs.borrow_mut()
                .push((record.level(), record.args().to_string()))
        });
        if self.inner.enabled(record.metadata()) {
            self.inner.log(record);
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

static LOGGER: OnceLock<CaptureLogger> = OnceLock::new();

pub fn init_logging() {
    let logger = LOGGER.get_or_init(|| CaptureLogger {
        inner: env_logger::Builder::from_default_env().is_test(true).build(),
    });
    if log::set_logger(logger).is_ok() {
        log::set_max_level(LevelFilter::Trace);
    }
}

/// Drain the records logged so far on this thread.
pub fn take_logs() -> Vec<(Level, String)> {
    init_logging();
    CAPTURED.with(|logs| logs.borrow_mut().drain(..).collect())
}

pub fn warnings() -> Vec<String> {
    take_logs()
        .into_iter()
        .filter(|(level, _)| *level == Level::Warn)
        .map(|(_, message)| message)
        .collect()
}

/// Device on a fresh null driver plus a view of the calls it receives.
pub fn null_device() -> (Device, CallTrace) {
    device_on(NullDriver::default())
}

pub fn device_on(driver: NullDriver) -> (Device, CallTrace) {
    init_logging();
    let driver = driver.with_trace();
    let trace = driver.trace().expect("tracing enabled");
    (Device::with_driver(Backend::Null, Box::new(driver)), trace)
}

pub fn make_buffer(device: &mut Device, byte_size: u32) -> Handle<Buffer> {
    device
        .create_buffer(&BufferInfo {
            debug_name: "test buffer",
            usage: BufferUsage::VERTEX,
            byte_size,
        })
        .unwrap()
}

pub fn make_transfer_buffer(
    device: &mut Device,
    usage: TransferUsage,
    byte_size: u32,
) -> Handle<TransferBuffer> {
    device
        .create_transfer_buffer(&TransferBufferInfo {
            debug_name: "test transfer buffer",
            usage,
            byte_size,
            ..Default::default()
        })
        .unwrap()
}

pub fn make_graphics_pipeline(device: &mut Device) -> Handle<GraphicsPipeline> {
    let code = [0u8; 4];
    let vertex = device
        .create_shader(&ShaderInfo {
            debug_name: "vs",
            code: &code,
            stage: ShaderStage::Vertex,
            ..Default::default()
        })
        .unwrap();
    let fragment = device
        .create_shader(&ShaderInfo {
            debug_name: "fs",
            code: &code,
            stage: ShaderStage::Fragment,
            ..Default::default()
        })
        .unwrap();

    device
        .create_graphics_pipeline(&GraphicsPipelineInfo {
            debug_name: "test pipeline",
            vertex_shader: vertex,
            fragment_shader: fragment,
            ..Default::default()
        })
        .unwrap()
}

pub fn make_compute_pipeline(device: &mut Device) -> Handle<ComputePipeline> {
    device
        .create_compute_pipeline(&ComputePipelineInfo {
            debug_name: "test compute",
            code: &[0u8; 4],
            thread_count: [8, 8, 1],
            ..Default::default()
        })
        .unwrap()
}
