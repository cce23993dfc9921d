use crate::gpu::driver::state::PassState;
use crate::gpu::driver::types::{CommandBuffer, Handle};

/// Validation header the device keeps for every acquired command buffer.
///
/// The slot is released on submission, which is what makes a submitted
/// buffer unusable: its handle no longer resolves.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CommandBufferHeader {
    /// Driver-side command buffer the header shadows.
    pub raw: Handle<CommandBuffer>,
    pub pass: PassState,
}

impl CommandBufferHeader {
    pub fn new(raw: Handle<CommandBuffer>) -> Self {
        Self {
            raw,
            pass: PassState::Idle,
        }
    }
}

macro_rules! pass_token {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
            pub struct $name {
                command_buffer: Handle<CommandBuffer>,
            }

            impl $name {
                pub(crate) fn new(command_buffer: Handle<CommandBuffer>) -> Self {
                    Self { command_buffer }
                }

                /// Command buffer this pass records into.
                pub fn command_buffer(&self) -> Handle<CommandBuffer> {
                    self.command_buffer
                }
            }
        )*
    };
}

pass_token!(
    /// Returned by `begin_render_pass`. Holding one does not mean the pass is
    /// still open; every use is checked against the command buffer's state.
    RenderPass,
    /// Returned by `begin_compute_pass`.
    ComputePass,
    /// Returned by `begin_copy_pass`.
    CopyPass,
);
