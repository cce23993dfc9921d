use thiserror::Error;

#[derive(Debug, Error)]
pub enum GPUError {
    #[error("no supported backend found")]
    NoBackend,
    #[error("device creation failed: {0}")]
    DeviceCreation(String),
    #[error("resource creation failed: {0}")]
    ResourceCreation(String),
    #[error("transfer buffer is mapped")]
    TransferBufferMapped,
    #[error("ran out of slots")]
    SlotError,
    #[error("invalid {0} handle")]
    InvalidHandle(&'static str),
    #[error("shader format is neither native nor translatable for this backend")]
    UnsupportedShaderFormat,
    #[error("shader translation failed: {0}")]
    Translation(String),
    #[error("library error: {0}")]
    Library(String),
    #[error("range {offset}+{size} exceeds allocation of {len} bytes")]
    OutOfBounds { offset: u64, size: u64, len: u64 },
    #[error("{0} is not implemented by this backend")]
    Unimplemented(&'static str),
}

#[cfg(feature = "gpucmd-spirv")]
impl From<libloading::Error> for GPUError {
    fn from(err: libloading::Error) -> Self {
        GPUError::Library(err.to_string())
    }
}

pub type Result<T, E = GPUError> = std::result::Result<T, E>;
