mod common;

use std::sync::{Arc, Mutex};

use gpucmd::*;

/// Translator that wraps the blob length in a fake source string.
#[derive(Default)]
struct RecordingTranslator {
    requests: Mutex<Vec<(usize, ShaderLanguage)>>,
}

impl ShaderTranslator for RecordingTranslator {
    fn translate(&self, spirv: &[u8], language: ShaderLanguage) -> Result<String> {
        let words = spirv_words(spirv)?;
        self.requests.lock().unwrap().push((words.len(), language));
        Ok(format!("// {} words", words.len()))
    }
}

fn hlsl_device() -> (Device, CallTrace) {
    common::init_logging();
    let driver = NullDriver::default()
        .with_shader_formats(ShaderFormat::DXBC)
        .with_trace();
    let trace = driver.trace().unwrap();
    let mut device = Device::with_driver(Backend::D3D11, Box::new(driver));
    // Never depend on a SPIRV-Cross install in tests.
    device.set_shader_translator(None);
    (device, trace)
}

#[test]
fn spirv_is_translated_for_hlsl_backends() {
    let (mut device, trace) = hlsl_device();
    let translator = Arc::new(RecordingTranslator::default());
    device.set_shader_translator(Some(translator.clone()));

    let code = [0u8; 8];
    let shader = device.create_shader(&ShaderInfo {
        debug_name: "translated",
        code: &code,
        stage: ShaderStage::Fragment,
        ..Default::default()
    });

    assert!(shader.is_ok());
    assert!(trace.contains("compile_translated_shader"));
    assert!(!trace.contains("create_shader"));
    assert_eq!(
        *translator.requests.lock().unwrap(),
        vec![(2, ShaderLanguage::Hlsl)]
    );
}

#[test]
fn native_formats_skip_translation() {
    let (mut device, trace) = hlsl_device();
    let translator = Arc::new(RecordingTranslator::default());
    device.set_shader_translator(Some(translator.clone()));

    let shader = device.create_shader(&ShaderInfo {
        code: &[1, 2, 3],
        format: ShaderFormat::DXBC,
        ..Default::default()
    });

    assert!(shader.is_ok());
    assert!(trace.contains("create_shader"));
    assert!(translator.requests.lock().unwrap().is_empty());
}

#[test]
fn missing_translator_is_an_error() {
    let (mut device, trace) = hlsl_device();
    assert!(!device.has_shader_translator());

    let err = device
        .create_shader(&ShaderInfo {
            code: &[0u8; 4],
            ..Default::default()
        })
        .err();
    assert!(matches!(err, Some(GPUError::Translation(_))));
    assert!(!trace.contains("compile_translated_shader"));
}

#[test]
fn malformed_spirv_is_rejected() {
    let (mut device, _trace) = hlsl_device();
    device.set_shader_translator(Some(Arc::new(RecordingTranslator::default())));

    let err = device
        .create_shader(&ShaderInfo {
            code: &[0u8; 6],
            ..Default::default()
        })
        .err();
    assert!(matches!(err, Some(GPUError::Translation(_))));
}

#[test]
fn spirv_backends_take_spirv_directly() {
    let (mut device, trace) = common::null_device();
    assert!(!device.has_shader_translator());

    let shader = device.create_shader(&ShaderInfo {
        code: &[0u8; 4],
        ..Default::default()
    });
    assert!(shader.is_ok());
    assert!(trace.contains("create_shader"));
}

#[test]
fn unsupported_formats_are_refused() {
    let (mut device, _trace) = common::null_device();
    let err = device
        .create_shader(&ShaderInfo {
            code: &[0u8; 4],
            format: ShaderFormat::MSL,
            ..Default::default()
        })
        .err();
    assert!(matches!(err, Some(GPUError::UnsupportedShaderFormat)));
}
