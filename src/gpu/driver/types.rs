use bitflags::bitflags;
#[cfg(feature = "gpucmd-serde")]
use serde::{Deserialize, Serialize};

pub use crate::utils::Handle;

macro_rules! resource_markers {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug)]
            pub enum $name {}
        )*
    };
}

resource_markers!(
    /// Sampled, storage or attachment image.
    Texture,
    /// GPU-resident buffer.
    Buffer,
    /// CPU-visible staging allocation for uploads and downloads.
    TransferBuffer,
    Sampler,
    Shader,
    GraphicsPipeline,
    ComputePipeline,
    /// Completion point of a submitted command buffer.
    Fence,
    OcclusionQuery,
    /// One recording session, consumed by submission.
    CommandBuffer,
);

/// Native graphics API behind a [`Device`](crate::Device).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "gpucmd-serde", derive(Serialize, Deserialize))]
pub enum Backend {
    Vulkan,
    D3D11,
    Metal,
    /// Headless in-process backend, see [`crate::null`].
    Null,
}

impl Backend {
    pub const ALL: [Backend; 4] = [Backend::Vulkan, Backend::D3D11, Backend::Metal, Backend::Null];

    pub fn name(self) -> &'static str {
        match self {
            Backend::Vulkan => "vulkan",
            Backend::D3D11 => "d3d11",
            Backend::Metal => "metal",
            Backend::Null => "null",
        }
    }

    pub fn flag(self) -> BackendFlags {
        match self {
            Backend::Vulkan => BackendFlags::VULKAN,
            Backend::D3D11 => BackendFlags::D3D11,
            Backend::Metal => BackendFlags::METAL,
            Backend::Null => BackendFlags::NULL,
        }
    }

    /// Case-insensitive lookup by [`Backend::name`].
    pub fn from_name(name: &str) -> Option<Backend> {
        Self::ALL
            .into_iter()
            .find(|backend| backend.name().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// Set of backends a caller is willing to use.
    #[repr(C)]
    #[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "gpucmd-serde", derive(Serialize, Deserialize))]
    pub struct BackendFlags: u32 {
        const VULKAN = 0x1;
        const D3D11  = 0x2;
        const METAL  = 0x4;
        const NULL   = 0x8;
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "gpucmd-serde", derive(Serialize, Deserialize))]
pub enum TextureFormat {
    #[default]
    R8G8B8A8,
    B8G8R8A8,
    R5G6B5,
    A1R5G5B5,
    B4G4R4A4,
    A2R10G10B10,
    R16G16,
    R16G16B16A16,
    R8,
    A8,
    Bc1,
    Bc2,
    Bc3,
    Bc7,
    R8G8Snorm,
    R8G8B8A8Snorm,
    R16Sfloat,
    R16G16Sfloat,
    R16G16B16A16Sfloat,
    R32Sfloat,
    R32G32Sfloat,
    R32G32B32A32Sfloat,
    R8Uint,
    R8G8Uint,
    R8G8B8A8Uint,
    R16Uint,
    R16G16Uint,
    R16G16B16A16Uint,
    R8G8B8A8Srgb,
    B8G8R8A8Srgb,
    Bc3Srgb,
    Bc7Srgb,
    D16Unorm,
    D24Unorm,
    D32Sfloat,
    D24UnormS8Uint,
    D32SfloatS8Uint,
}

impl TextureFormat {
    pub fn is_depth(self) -> bool {
        matches!(
            self,
            TextureFormat::D16Unorm
                | TextureFormat::D24Unorm
                | TextureFormat::D32Sfloat
                | TextureFormat::D24UnormS8Uint
                | TextureFormat::D32SfloatS8Uint
        )
    }

    pub fn has_stencil(self) -> bool {
        matches!(
            self,
            TextureFormat::D24UnormS8Uint | TextureFormat::D32SfloatS8Uint
        )
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "gpucmd-serde", derive(Serialize, Deserialize))]
pub enum TextureType {
    #[default]
    TwoD,
    TwoDArray,
    ThreeD,
    Cube,
}

bitflags! {
    #[repr(C)]
    #[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "gpucmd-serde", derive(Serialize, Deserialize))]
    pub struct TextureUsage: u32 {
        const SAMPLER               = 0x1;
        const COLOR_TARGET          = 0x2;
        const DEPTH_STENCIL_TARGET  = 0x4;
        const GRAPHICS_STORAGE_READ = 0x8;
        const COMPUTE_STORAGE_READ  = 0x10;
        const COMPUTE_STORAGE_WRITE = 0x20;
    }
}

#[repr(C)]
#[derive(Hash, Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "gpucmd-serde", derive(Serialize, Deserialize))]
pub enum SampleCount {
    #[default]
    S1,
    S2,
    S4,
    S8,
}

impl SampleCount {
    pub fn as_u32(self) -> u32 {
        match self {
            Self::S1 => 1,
            Self::S2 => 2,
            Self::S4 => 4,
            Self::S8 => 8,
        }
    }
}

bitflags! {
    #[repr(C)]
    #[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "gpucmd-serde", derive(Serialize, Deserialize))]
    pub struct BufferUsage: u32 {
        const VERTEX                = 0x1;
        const INDEX                 = 0x2;
        const INDIRECT              = 0x4;
        const GRAPHICS_STORAGE_READ = 0x8;
        const COMPUTE_STORAGE_READ  = 0x10;
        const COMPUTE_STORAGE_WRITE = 0x20;
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "gpucmd-serde", derive(Serialize, Deserialize))]
pub enum TransferUsage {
    #[default]
    Upload,
    Download,
}

bitflags! {
    #[repr(C)]
    #[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "gpucmd-serde", derive(Serialize, Deserialize))]
    pub struct TransferBufferMapFlags: u32 {
        const READ  = 0x1;
        const WRITE = 0x2;
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "gpucmd-serde", derive(Serialize, Deserialize))]
pub enum ShaderStage {
    #[default]
    Vertex,
    Fragment,
    Compute,
}

bitflags! {
    /// Shader bytecode/source encodings. Requests use a single flag, drivers
    /// report the set they consume natively.
    #[repr(C)]
    #[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "gpucmd-serde", derive(Serialize, Deserialize))]
    pub struct ShaderFormat: u32 {
        const SECRET   = 0x1;
        const SPIRV    = 0x2;
        const HLSL     = 0x4;
        const DXBC     = 0x8;
        const DXIL     = 0x10;
        const MSL      = 0x20;
        const METALLIB = 0x40;
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "gpucmd-serde", derive(Serialize, Deserialize))]
pub enum IndexElementSize {
    #[default]
    U16,
    U32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "gpucmd-serde", derive(Serialize, Deserialize))]
pub enum Filter {
    #[default]
    Nearest,
    Linear,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "gpucmd-serde", derive(Serialize, Deserialize))]
pub enum SamplerMipmapMode {
    #[default]
    Nearest,
    Linear,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "gpucmd-serde", derive(Serialize, Deserialize))]
pub enum SamplerAddressMode {
    #[default]
    Repeat,
    MirroredRepeat,
    ClampToEdge,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "gpucmd-serde", derive(Serialize, Deserialize))]
pub enum CompareOp {
    Never,
    Less,
    Equal,
    #[default]
    LessOrEqual,
    Greater,
    NotEqual,
    GreaterOrEqual,
    Always,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "gpucmd-serde", derive(Serialize, Deserialize))]
pub enum LoadOp {
    Load,
    Clear,
    #[default]
    DontCare,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "gpucmd-serde", derive(Serialize, Deserialize))]
pub enum StoreOp {
    #[default]
    Store,
    DontCare,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "gpucmd-serde", derive(Serialize, Deserialize))]
pub enum PrimitiveType {
    PointList,
    LineList,
    LineStrip,
    #[default]
    TriangleList,
    TriangleStrip,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "gpucmd-serde", derive(Serialize, Deserialize))]
pub enum CullMode {
    #[default]
    None,
    Front,
    Back,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "gpucmd-serde", derive(Serialize, Deserialize))]
pub enum FrontFace {
    #[default]
    CounterClockwise,
    Clockwise,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "gpucmd-serde", derive(Serialize, Deserialize))]
pub enum BlendFactor {
    Zero,
    #[default]
    One,
    SrcColor,
    OneMinusSrcColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstColor,
    OneMinusDstColor,
    DstAlpha,
    OneMinusDstAlpha,
    ConstantColor,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "gpucmd-serde", derive(Serialize, Deserialize))]
pub enum BlendOp {
    #[default]
    Add,
    Subtract,
    ReverseSubtract,
    Min,
    Max,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "gpucmd-serde", derive(Serialize, Deserialize))]
pub enum VertexElementFormat {
    Uint,
    #[default]
    Float,
    Vector2,
    Vector3,
    Vector4,
    Color,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "gpucmd-serde", derive(Serialize, Deserialize))]
pub enum VertexInputRate {
    #[default]
    Vertex,
    Instance,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "gpucmd-serde", derive(Serialize, Deserialize))]
pub enum SwapchainComposition {
    #[default]
    Sdr,
    SdrLinear,
    HdrExtendedLinear,
    Hdr10St2084,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "gpucmd-serde", derive(Serialize, Deserialize))]
pub enum PresentMode {
    #[default]
    Vsync,
    Immediate,
    Mailbox,
}
