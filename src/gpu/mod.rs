//! Command recording on top of a swappable native backend.
//!
//! A [`Device`] owns one [`Driver`] picked from the backend registry and
//! validates every recording call against the command buffer's pass state
//! before the driver sees it.

pub(crate) mod cmd;
mod commands;
pub mod device;
pub mod device_selector;
pub mod driver;
pub mod error;
pub mod format;
pub mod null;
pub mod spirv;
pub mod structs;

pub use cmd::{ComputePass, CopyPass, RenderPass};
pub use device::Device;
pub use device_selector::{
    backend_override, debug_forced, select_backend, BackendEntry, BackendSelector, CreateFn,
    PrepareFn, BACKENDS, BACKEND_ENV, DEBUG_ENV,
};
pub use driver::state::{PassError, PassKind, PassState};
pub use driver::types::*;
pub use driver::Driver;
pub use error::{GPUError, Result};
pub use null::{CallTrace, NullDriver, NULL_BACKEND};
#[cfg(feature = "gpucmd-spirv")]
pub use spirv::SpirvCross;
pub use spirv::{spirv_words, ShaderLanguage, ShaderTranslator};
pub use structs::*;
