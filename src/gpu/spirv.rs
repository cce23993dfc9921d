//! SPIR-V translation for backends that do not consume SPIR-V directly.
//!
//! The [`SpirvCross`] translator drives the SPIRV-Cross C API from a shared
//! library loaded at runtime, so the crate builds and runs without it and only
//! shader creation fails when it is missing.

use super::driver::types::Backend;
use super::error::{GPUError, Result};

/// Source language a translator produces.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShaderLanguage {
    /// HLSL shader model 5.0.
    Hlsl,
    Msl,
}

impl ShaderLanguage {
    /// Translation target for `backend`, if SPIR-V must be translated for it.
    pub fn for_backend(backend: Backend) -> Option<ShaderLanguage> {
        match backend {
            Backend::D3D11 => Some(ShaderLanguage::Hlsl),
            Backend::Metal => Some(ShaderLanguage::Msl),
            _ => None,
        }
    }
}

/// Converts SPIR-V bytecode into backend source text.
pub trait ShaderTranslator: Send + Sync {
    fn translate(&self, spirv: &[u8], language: ShaderLanguage) -> Result<String>;
}

/// Reassemble a SPIR-V byte blob into native-endian words.
pub fn spirv_words(spirv: &[u8]) -> Result<Vec<u32>> {
    if spirv.is_empty() || spirv.len() % 4 != 0 {
        return Err(GPUError::Translation(format!(
            "SPIR-V blob of {} bytes is not a whole number of words",
            spirv.len()
        )));
    }

    Ok(spirv
        .chunks_exact(4)
        .map(|w| u32::from_ne_bytes([w[0], w[1], w[2], w[3]]))
        .collect())
}

#[cfg(feature = "gpucmd-spirv")]
pub use spirv_cross::SpirvCross;

#[cfg(feature = "gpucmd-spirv")]
mod spirv_cross {
    use std::ffi::{c_char, c_int, c_uint, c_void, CStr};
    use std::ptr;
    use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

    use libloading::Library;
    use log::{debug, info};

    use super::{spirv_words, ShaderLanguage, ShaderTranslator};
    use crate::gpu::error::{GPUError, Result};

    #[cfg(target_os = "windows")]
    const LIBRARY_NAME: &str = "spirv-cross-c-shared.dll";
    #[cfg(target_os = "macos")]
    const LIBRARY_NAME: &str = "libspirv-cross-c-shared.dylib";
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    const LIBRARY_NAME: &str = "libspirv-cross-c-shared.so";

    type SpvcContext = *mut c_void;
    type SpvcParsedIr = *mut c_void;
    type SpvcCompiler = *mut c_void;
    type SpvcCompilerOptions = *mut c_void;
    type SpvcResult = c_int;

    const SPVC_BACKEND_HLSL: c_int = 2;
    const SPVC_BACKEND_MSL: c_int = 3;
    const SPVC_CAPTURE_MODE_TAKE_OWNERSHIP: c_int = 1;
    const SPVC_COMPILER_OPTION_HLSL_BIT: c_int = 0x4000000;
    const SPVC_COMPILER_OPTION_HLSL_SHADER_MODEL: c_int = 13 | SPVC_COMPILER_OPTION_HLSL_BIT;
    const SPVC_COMPILER_OPTION_HLSL_NONWRITABLE_UAV_TEXTURE_AS_SRV: c_int =
        55 | SPVC_COMPILER_OPTION_HLSL_BIT;

    type ContextCreateFn = unsafe extern "C" fn(*mut SpvcContext) -> SpvcResult;
    type ContextDestroyFn = unsafe extern "C" fn(SpvcContext);
    type ParseSpirvFn =
        unsafe extern "C" fn(SpvcContext, *const u32, usize, *mut SpvcParsedIr) -> SpvcResult;
    type CreateCompilerFn =
        unsafe extern "C" fn(SpvcContext, c_int, SpvcParsedIr, c_int, *mut SpvcCompiler) -> SpvcResult;
    type CreateOptionsFn =
        unsafe extern "C" fn(SpvcCompiler, *mut SpvcCompilerOptions) -> SpvcResult;
    type OptionsSetUintFn = unsafe extern "C" fn(SpvcCompilerOptions, c_int, c_uint) -> SpvcResult;
    type InstallOptionsFn = unsafe extern "C" fn(SpvcCompiler, SpvcCompilerOptions) -> SpvcResult;
    type CompileFn = unsafe extern "C" fn(SpvcCompiler, *mut *const c_char) -> SpvcResult;
    type LastErrorFn = unsafe extern "C" fn(SpvcContext) -> *const c_char;

    /// The shared library and every entry point the translator calls.
    struct LoadedLibrary {
        context_create: ContextCreateFn,
        context_destroy: ContextDestroyFn,
        parse_spirv: ParseSpirvFn,
        create_compiler: CreateCompilerFn,
        create_options: CreateOptionsFn,
        options_set_uint: OptionsSetUintFn,
        install_options: InstallOptionsFn,
        compile: CompileFn,
        last_error: LastErrorFn,
        // Keeps the function pointers above valid.
        _library: Library,
    }

    macro_rules! resolve {
        ($library:expr, $name:literal, $ty:ty) => {
            // SAFETY: the signature matches the SPIRV-Cross C API declaration.
            *unsafe { $library.get::<$ty>(concat!($name, "\0").as_bytes()) }
                .map_err(|e| GPUError::Library(format!("{}: {}", $name, e)))?
        };
    }

    impl LoadedLibrary {
        fn open() -> Result<Self> {
            // SAFETY: SPIRV-Cross has no load-time initialisers with
            // preconditions.
            let library = unsafe { Library::new(LIBRARY_NAME) }?;

            let context_create = resolve!(library, "spvc_context_create", ContextCreateFn);
            let context_destroy = resolve!(library, "spvc_context_destroy", ContextDestroyFn);
            let parse_spirv = resolve!(library, "spvc_context_parse_spirv", ParseSpirvFn);
            let create_compiler =
                resolve!(library, "spvc_context_create_compiler", CreateCompilerFn);
            let create_options =
                resolve!(library, "spvc_compiler_create_compiler_options", CreateOptionsFn);
            let options_set_uint =
                resolve!(library, "spvc_compiler_options_set_uint", OptionsSetUintFn);
            let install_options =
                resolve!(library, "spvc_compiler_install_compiler_options", InstallOptionsFn);
            let compile = resolve!(library, "spvc_compiler_compile", CompileFn);
            let last_error = resolve!(library, "spvc_context_get_last_error_string", LastErrorFn);

            Ok(Self {
                context_create,
                context_destroy,
                parse_spirv,
                create_compiler,
                create_options,
                options_set_uint,
                install_options,
                compile,
                last_error,
                _library: library,
            })
        }
    }

    static SPIRV_CROSS: OnceLock<Mutex<Option<Arc<LoadedLibrary>>>> = OnceLock::new();

    fn loaded() -> MutexGuard<'static, Option<Arc<LoadedLibrary>>> {
        SPIRV_CROSS
            .get_or_init(|| Mutex::new(None))
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Destroys a SPIRV-Cross context, and everything it owns, on scope exit.
    struct ContextGuard<'a> {
        library: &'a LoadedLibrary,
        context: SpvcContext,
    }

    impl ContextGuard<'_> {
        fn error(&self, func: &str) -> GPUError {
            // SAFETY: the context is live and the string is copied before the
            // context is destroyed.
            let message = unsafe {
                let raw = (self.library.last_error)(self.context);
                if raw.is_null() {
                    String::new()
                } else {
                    CStr::from_ptr(raw).to_string_lossy().into_owned()
                }
            };
            GPUError::Translation(format!("{} failed: {}", func, message))
        }

        fn check(&self, result: SpvcResult, func: &str) -> Result<()> {
            if result < 0 {
                Err(self.error(func))
            } else {
                Ok(())
            }
        }
    }

    impl Drop for ContextGuard<'_> {
        fn drop(&mut self) {
            // SAFETY: created by spvc_context_create and destroyed only here.
            unsafe { (self.library.context_destroy)(self.context) };
        }
    }

    /// SPIRV-Cross backed [`ShaderTranslator`].
    ///
    /// The library is loaded once per process and shared by every instance.
    #[derive(Clone)]
    pub struct SpirvCross {
        library: Arc<LoadedLibrary>,
    }

    impl std::fmt::Debug for SpirvCross {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("SpirvCross")
        }
    }

    impl SpirvCross {
        /// Load the library, or reuse it if it is already loaded.
        pub fn load() -> Result<SpirvCross> {
            let mut slot = loaded();
            if let Some(library) = slot.as_ref() {
                return Ok(SpirvCross {
                    library: Arc::clone(library),
                });
            }

            let library = Arc::new(LoadedLibrary::open()?);
            info!("Loaded {}", LIBRARY_NAME);
            *slot = Some(Arc::clone(&library));
            Ok(SpirvCross { library })
        }

        /// Drop the process-wide handle. Live translators keep the library
        /// mapped until they are dropped.
        pub fn unload() {
            if loaded().take().is_some() {
                debug!("Released {}", LIBRARY_NAME);
            }
        }

        pub fn is_loaded() -> bool {
            loaded().is_some()
        }
    }

    impl ShaderTranslator for SpirvCross {
        fn translate(&self, spirv: &[u8], language: ShaderLanguage) -> Result<String> {
            let words = spirv_words(spirv)?;
            let lib = &*self.library;

            let mut context: SpvcContext = ptr::null_mut();
            // SAFETY: out-pointer to a local.
            let result = unsafe { (lib.context_create)(&mut context) };
            if result < 0 {
                return Err(GPUError::Translation(format!(
                    "spvc_context_create failed: {:X}",
                    result
                )));
            }
            let ctx = ContextGuard {
                library: lib,
                context,
            };

            let mut ir: SpvcParsedIr = ptr::null_mut();
            // SAFETY: `words` outlives the call and the IR is owned by `ctx`.
            let result = unsafe { (lib.parse_spirv)(context, words.as_ptr(), words.len(), &mut ir) };
            ctx.check(result, "spvc_context_parse_spirv")?;

            let backend = match language {
                ShaderLanguage::Hlsl => SPVC_BACKEND_HLSL,
                ShaderLanguage::Msl => SPVC_BACKEND_MSL,
            };
            let mut compiler: SpvcCompiler = ptr::null_mut();
            // SAFETY: the compiler takes ownership of `ir`, both live in `ctx`.
            let result = unsafe {
                (lib.create_compiler)(
                    context,
                    backend,
                    ir,
                    SPVC_CAPTURE_MODE_TAKE_OWNERSHIP,
                    &mut compiler,
                )
            };
            ctx.check(result, "spvc_context_create_compiler")?;

            let mut options: SpvcCompilerOptions = ptr::null_mut();
            // SAFETY: `compiler` is live.
            let result = unsafe { (lib.create_options)(compiler, &mut options) };
            ctx.check(result, "spvc_compiler_create_compiler_options")?;

            if language == ShaderLanguage::Hlsl {
                // SAFETY: `options` is live.
                unsafe {
                    (lib.options_set_uint)(options, SPVC_COMPILER_OPTION_HLSL_SHADER_MODEL, 50);
                    (lib.options_set_uint)(
                        options,
                        SPVC_COMPILER_OPTION_HLSL_NONWRITABLE_UAV_TEXTURE_AS_SRV,
                        1,
                    );
                }
            }

            // SAFETY: `compiler` and `options` are live.
            let result = unsafe { (lib.install_options)(compiler, options) };
            ctx.check(result, "spvc_compiler_install_compiler_options")?;

            let mut translated: *const c_char = ptr::null();
            // SAFETY: the output string is owned by `ctx`.
            let result = unsafe { (lib.compile)(compiler, &mut translated) };
            ctx.check(result, "spvc_compiler_compile")?;

            if translated.is_null() {
                return Err(GPUError::Translation(
                    "spvc_compiler_compile returned no source".to_string(),
                ));
            }

            // SAFETY: non-null, NUL-terminated and valid until `ctx` drops.
            let source = unsafe { CStr::from_ptr(translated) }
                .to_string_lossy()
                .into_owned();
            Ok(source)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translation_targets() {
        assert_eq!(ShaderLanguage::for_backend(Backend::D3D11), Some(ShaderLanguage::Hlsl));
        assert_eq!(ShaderLanguage::for_backend(Backend::Metal), Some(ShaderLanguage::Msl));
        assert_eq!(ShaderLanguage::for_backend(Backend::Vulkan), None);
        assert_eq!(ShaderLanguage::for_backend(Backend::Null), None);
    }

    #[test]
    fn words_require_whole_blob() {
        let magic = 0x0723_0203u32.to_ne_bytes();
        assert_eq!(spirv_words(&magic).unwrap(), vec![0x0723_0203]);
        assert!(matches!(spirv_words(&magic[..3]), Err(GPUError::Translation(_))));
        assert!(spirv_words(&[]).is_err());
    }
}
