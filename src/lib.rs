pub mod gpu;
pub mod utils;

pub use gpu::*;
