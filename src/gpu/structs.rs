use super::driver::types::*;

#[cfg(feature = "gpucmd-serde")]
use serde::{Deserialize, Serialize};

/// Device construction options. `GPUCMD_DEBUG=1` forces `debug_mode`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "gpucmd-serde", derive(Serialize, Deserialize))]
pub struct DeviceInfo {
    /// Backends to try before falling back to registry order. Empty means no
    /// preference.
    pub preferred_backends: BackendFlags,
    pub debug_mode: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureInfo<'a> {
    pub debug_name: &'a str,
    pub ty: TextureType,
    pub format: TextureFormat,
    pub usage: TextureUsage,
    pub width: u32,
    pub height: u32,
    pub layer_count_or_depth: u32,
    pub level_count: u32,
    pub sample_count: SampleCount,
}

impl<'a> Default for TextureInfo<'a> {
    fn default() -> Self {
        Self {
            debug_name: "",
            ty: TextureType::TwoD,
            format: TextureFormat::R8G8B8A8,
            usage: TextureUsage::SAMPLER,
            width: 1280,
            height: 1024,
            layer_count_or_depth: 1,
            level_count: 1,
            sample_count: SampleCount::S1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferInfo<'a> {
    pub debug_name: &'a str,
    pub usage: BufferUsage,
    pub byte_size: u32,
}

impl<'a> Default for BufferInfo<'a> {
    fn default() -> Self {
        Self {
            debug_name: "",
            usage: BufferUsage::VERTEX,
            byte_size: 1024,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferBufferInfo<'a> {
    pub debug_name: &'a str,
    pub usage: TransferUsage,
    pub map_flags: TransferBufferMapFlags,
    pub byte_size: u32,
}

impl<'a> Default for TransferBufferInfo<'a> {
    fn default() -> Self {
        Self {
            debug_name: "",
            usage: TransferUsage::Upload,
            map_flags: TransferBufferMapFlags::WRITE,
            byte_size: 1024,
        }
    }
}

#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "gpucmd-serde", derive(Serialize, Deserialize))]
pub struct SamplerInfo {
    pub min_filter: Filter,
    pub mag_filter: Filter,
    pub mipmap_mode: SamplerMipmapMode,
    pub address_mode_u: SamplerAddressMode,
    pub address_mode_v: SamplerAddressMode,
    pub address_mode_w: SamplerAddressMode,
    pub mip_lod_bias: f32,
    pub anisotropy_enable: bool,
    pub max_anisotropy: f32,
    pub compare_enable: bool,
    pub compare_op: CompareOp,
    pub min_lod: f32,
    pub max_lod: f32,
}

impl Default for SamplerInfo {
    fn default() -> Self {
        SamplerInfo {
            min_filter: Filter::Linear,
            mag_filter: Filter::Linear,
            mipmap_mode: SamplerMipmapMode::Linear,
            address_mode_u: SamplerAddressMode::Repeat,
            address_mode_v: SamplerAddressMode::Repeat,
            address_mode_w: SamplerAddressMode::Repeat,
            mip_lod_bias: 0.0,
            anisotropy_enable: false,
            max_anisotropy: 1.0,
            compare_enable: false,
            compare_op: CompareOp::Always,
            min_lod: 0.0,
            max_lod: 1000.0,
        }
    }
}

/// Shader source or bytecode. `format` must name exactly one encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderInfo<'a> {
    pub debug_name: &'a str,
    pub code: &'a [u8],
    pub entry_point: &'a str,
    pub format: ShaderFormat,
    pub stage: ShaderStage,
    pub sampler_count: u32,
    pub storage_texture_count: u32,
    pub storage_buffer_count: u32,
    pub uniform_buffer_count: u32,
}

impl<'a> Default for ShaderInfo<'a> {
    fn default() -> Self {
        Self {
            debug_name: "",
            code: &[],
            entry_point: "main",
            format: ShaderFormat::SPIRV,
            stage: ShaderStage::Vertex,
            sampler_count: 0,
            storage_texture_count: 0,
            storage_buffer_count: 0,
            uniform_buffer_count: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComputePipelineInfo<'a> {
    pub debug_name: &'a str,
    pub code: &'a [u8],
    pub entry_point: &'a str,
    pub format: ShaderFormat,
    pub read_only_storage_texture_count: u32,
    pub read_only_storage_buffer_count: u32,
    pub read_write_storage_texture_count: u32,
    pub read_write_storage_buffer_count: u32,
    pub uniform_buffer_count: u32,
    pub thread_count: [u32; 3],
}

impl<'a> Default for ComputePipelineInfo<'a> {
    fn default() -> Self {
        Self {
            debug_name: "",
            code: &[],
            entry_point: "main",
            format: ShaderFormat::SPIRV,
            read_only_storage_texture_count: 0,
            read_only_storage_buffer_count: 0,
            read_write_storage_texture_count: 0,
            read_write_storage_buffer_count: 0,
            uniform_buffer_count: 0,
            thread_count: [1, 1, 1],
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "gpucmd-serde", derive(Serialize, Deserialize))]
pub struct VertexBinding {
    pub binding: u32,
    pub stride: u32,
    pub input_rate: VertexInputRate,
    pub step_rate: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "gpucmd-serde", derive(Serialize, Deserialize))]
pub struct VertexAttribute {
    pub location: u32,
    pub binding: u32,
    pub format: VertexElementFormat,
    pub offset: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VertexInputState<'a> {
    pub bindings: &'a [VertexBinding],
    pub attributes: &'a [VertexAttribute],
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "gpucmd-serde", derive(Serialize, Deserialize))]
pub struct RasterizerState {
    pub cull_mode: CullMode,
    pub front_face: FrontFace,
    pub depth_bias_enable: bool,
    pub depth_bias_constant_factor: f32,
    pub depth_bias_clamp: f32,
    pub depth_bias_slope_factor: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "gpucmd-serde", derive(Serialize, Deserialize))]
pub struct DepthStencilState {
    pub depth_test_enable: bool,
    pub depth_write_enable: bool,
    pub compare_op: CompareOp,
    pub stencil_test_enable: bool,
    pub compare_mask: u8,
    pub write_mask: u8,
    pub reference: u32,
}

impl Default for DepthStencilState {
    fn default() -> Self {
        Self {
            depth_test_enable: false,
            depth_write_enable: false,
            compare_op: CompareOp::LessOrEqual,
            stencil_test_enable: false,
            compare_mask: 0xFF,
            write_mask: 0xFF,
            reference: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "gpucmd-serde", derive(Serialize, Deserialize))]
pub struct ColorAttachmentBlendState {
    pub blend_enable: bool,
    pub src_color_blend_factor: BlendFactor,
    pub dst_color_blend_factor: BlendFactor,
    pub color_blend_op: BlendOp,
    pub src_alpha_blend_factor: BlendFactor,
    pub dst_alpha_blend_factor: BlendFactor,
    pub alpha_blend_op: BlendOp,
    pub color_write_mask: u8,
}

impl Default for ColorAttachmentBlendState {
    fn default() -> Self {
        Self {
            blend_enable: false,
            src_color_blend_factor: BlendFactor::One,
            dst_color_blend_factor: BlendFactor::Zero,
            color_blend_op: BlendOp::Add,
            src_alpha_blend_factor: BlendFactor::One,
            dst_alpha_blend_factor: BlendFactor::Zero,
            alpha_blend_op: BlendOp::Add,
            color_write_mask: 0xF,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "gpucmd-serde", derive(Serialize, Deserialize))]
pub struct ColorAttachmentDescription {
    pub format: TextureFormat,
    pub blend_state: ColorAttachmentBlendState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphicsPipelineAttachmentInfo<'a> {
    pub color_attachments: &'a [ColorAttachmentDescription],
    pub has_depth_stencil_attachment: bool,
    pub depth_stencil_format: TextureFormat,
}

impl<'a> Default for GraphicsPipelineAttachmentInfo<'a> {
    fn default() -> Self {
        Self {
            color_attachments: &[],
            has_depth_stencil_attachment: false,
            depth_stencil_format: TextureFormat::D16Unorm,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphicsPipelineInfo<'a> {
    pub debug_name: &'a str,
    pub vertex_shader: Handle<Shader>,
    pub fragment_shader: Handle<Shader>,
    pub vertex_input: VertexInputState<'a>,
    pub primitive_type: PrimitiveType,
    pub rasterizer: RasterizerState,
    pub sample_count: SampleCount,
    pub sample_mask: u32,
    pub depth_stencil: DepthStencilState,
    pub attachment_info: GraphicsPipelineAttachmentInfo<'a>,
    pub blend_constants: [f32; 4],
}

impl<'a> Default for GraphicsPipelineInfo<'a> {
    fn default() -> Self {
        Self {
            debug_name: "",
            vertex_shader: Default::default(),
            fragment_shader: Default::default(),
            vertex_input: Default::default(),
            primitive_type: PrimitiveType::TriangleList,
            rasterizer: Default::default(),
            sample_count: SampleCount::S1,
            sample_mask: 0xFFFF_FFFF,
            depth_stencil: Default::default(),
            attachment_info: Default::default(),
            blend_constants: [0.0; 4],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "gpucmd-serde", derive(Serialize, Deserialize))]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            w: 1280.0,
            h: 1024.0,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

#[derive(Debug, Hash, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "gpucmd-serde", derive(Serialize, Deserialize))]
pub struct Rect2D {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BufferCopy {
    pub src_offset: u32,
    pub dst_offset: u32,
    pub size: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BufferBinding {
    pub buffer: Handle<Buffer>,
    pub offset: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TextureSlice {
    pub texture: Handle<Texture>,
    pub mip_level: u32,
    pub layer: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TextureRegion {
    pub slice: TextureSlice,
    pub x: u32,
    pub y: u32,
    pub z: u32,
    pub w: u32,
    pub h: u32,
    pub d: u32,
}

/// Layout of texel data inside a transfer buffer. Zero stride/height means
/// tightly packed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BufferImageCopy {
    pub buffer_offset: u32,
    pub buffer_stride: u32,
    pub buffer_image_height: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TextureSamplerBinding {
    pub texture: Handle<Texture>,
    pub sampler: Handle<Sampler>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct StorageTextureReadWriteBinding {
    pub slice: TextureSlice,
    pub cycle: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct StorageBufferReadWriteBinding {
    pub buffer: Handle<Buffer>,
    pub cycle: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ColorAttachmentInfo {
    pub slice: TextureSlice,
    pub clear_color: [f32; 4],
    pub load_op: LoadOp,
    pub store_op: StoreOp,
    pub cycle: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DepthStencilAttachmentInfo {
    pub slice: TextureSlice,
    pub clear_depth: f32,
    pub clear_stencil: u32,
    pub load_op: LoadOp,
    pub store_op: StoreOp,
    pub stencil_load_op: LoadOp,
    pub stencil_store_op: StoreOp,
    pub cycle: bool,
}

#[repr(C)]
#[derive(Debug, Default, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct IndirectDrawCommand {
    pub vertex_count: u32,
    pub instance_count: u32,
    pub first_vertex: u32,
    pub first_instance: u32,
}

#[repr(C)]
#[derive(Debug, Default, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct IndexedIndirectDrawCommand {
    pub index_count: u32,
    pub instance_count: u32,
    pub first_index: u32,
    pub vertex_offset: i32,
    pub first_instance: u32,
}

/// Backbuffer handed out for one frame of a claimed window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SwapchainTexture {
    pub texture: Handle<Texture>,
    pub width: u32,
    pub height: u32,
}
