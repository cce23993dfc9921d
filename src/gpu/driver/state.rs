use thiserror::Error;

/// Recording misuse caught before it reaches a driver.
///
/// These are logged and turned into no-ops by [`Device`](crate::Device); they
/// are public so callers can inspect [`PassState`] transitions directly.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PassError {
    #[error("Invalid command buffer!")]
    InvalidCommandBuffer,
    #[error("Command buffer already submitted!")]
    AlreadySubmitted,
    #[error("Pass already in progress!")]
    PassInProgress,
    #[error("Render pass not in progress!")]
    RenderPassNotInProgress,
    #[error("Graphics pipeline not bound!")]
    GraphicsPipelineNotBound,
    #[error("Compute pass not in progress!")]
    ComputePassNotInProgress,
    #[error("Compute pipeline not bound!")]
    ComputePipelineNotBound,
    #[error("Copy pass not in progress!")]
    CopyPassNotInProgress,
    #[error("Copy passes have no pipeline to bind!")]
    NoPipelineForCopyPass,
    #[error("Cannot submit command buffer while a pass is in progress!")]
    SubmitWhilePassInProgress,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PassKind {
    Render,
    Compute,
    Copy,
}

impl PassKind {
    fn not_in_progress(self) -> PassError {
        match self {
            PassKind::Render => PassError::RenderPassNotInProgress,
            PassKind::Compute => PassError::ComputePassNotInProgress,
            PassKind::Copy => PassError::CopyPassNotInProgress,
        }
    }

    fn not_bound(self) -> PassError {
        match self {
            PassKind::Render => PassError::GraphicsPipelineNotBound,
            PassKind::Compute => PassError::ComputePipelineNotBound,
            PassKind::Copy => PassError::NoPipelineForCopyPass,
        }
    }
}

/// Recording state of one command buffer.
///
/// Only one pass can be active at a time and the pipeline gate lives inside
/// the pass that owns it, so leaving a pass always drops its binding.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum PassState {
    #[default]
    Idle,
    Render {
        pipeline_bound: bool,
    },
    Compute {
        pipeline_bound: bool,
    },
    Copy,
}

impl PassState {
    pub fn started(kind: PassKind) -> Self {
        match kind {
            PassKind::Render => PassState::Render {
                pipeline_bound: false,
            },
            PassKind::Compute => PassState::Compute {
                pipeline_bound: false,
            },
            PassKind::Copy => PassState::Copy,
        }
    }

    pub fn kind(&self) -> Option<PassKind> {
        match self {
            PassState::Idle => None,
            PassState::Render { .. } => Some(PassKind::Render),
            PassState::Compute { .. } => Some(PassKind::Compute),
            PassState::Copy => Some(PassKind::Copy),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, PassState::Idle)
    }

    pub fn in_progress(&self, kind: PassKind) -> bool {
        self.kind() == Some(kind)
    }

    pub fn graphics_pipeline_bound(&self) -> bool {
        matches!(
            self,
            PassState::Render {
                pipeline_bound: true
            }
        )
    }

    pub fn compute_pipeline_bound(&self) -> bool {
        matches!(
            self,
            PassState::Compute {
                pipeline_bound: true
            }
        )
    }

    /// Guard for beginning a pass.
    pub fn ensure_idle(&self) -> Result<(), PassError> {
        if self.is_idle() {
            Ok(())
        } else {
            Err(PassError::PassInProgress)
        }
    }

    /// Guard for submission.
    pub fn ensure_submittable(&self) -> Result<(), PassError> {
        if self.is_idle() {
            Ok(())
        } else {
            Err(PassError::SubmitWhilePassInProgress)
        }
    }

    pub fn require_pass(&self, kind: PassKind) -> Result<(), PassError> {
        if self.in_progress(kind) {
            Ok(())
        } else {
            Err(kind.not_in_progress())
        }
    }

    /// Pass first, then the pipeline gate.
    pub fn require_pipeline(&self, kind: PassKind) -> Result<(), PassError> {
        self.require_pass(kind)?;
        let bound = match kind {
            PassKind::Render => self.graphics_pipeline_bound(),
            PassKind::Compute => self.compute_pipeline_bound(),
            PassKind::Copy => false,
        };

        if bound {
            Ok(())
        } else {
            Err(kind.not_bound())
        }
    }

    /// Record a pipeline bind. Only valid while `kind` is the active pass.
    pub fn mark_pipeline_bound(&mut self, kind: PassKind) -> Result<(), PassError> {
        self.require_pass(kind)?;
        match self {
            PassState::Render { pipeline_bound } | PassState::Compute { pipeline_bound } => {
                *pipeline_bound = true;
                Ok(())
            }
            _ => Err(kind.not_bound()),
        }
    }

    /// Leave `kind`, dropping its pipeline binding.
    pub fn end(&mut self, kind: PassKind) -> Result<(), PassError> {
        self.require_pass(kind)?;
        *self = PassState::Idle;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_are_exclusive() {
        let state = PassState::started(PassKind::Compute);
        assert_eq!(state.ensure_idle(), Err(PassError::PassInProgress));
        assert!(state.in_progress(PassKind::Compute));
        assert!(!state.in_progress(PassKind::Render));
        assert!(!state.in_progress(PassKind::Copy));
    }

    #[test]
    fn pipeline_gate_checks_pass_first() {
        let idle = PassState::Idle;
        assert_eq!(
            idle.require_pipeline(PassKind::Render),
            Err(PassError::RenderPassNotInProgress)
        );

        let render = PassState::started(PassKind::Render);
        assert_eq!(
            render.require_pipeline(PassKind::Render),
            Err(PassError::GraphicsPipelineNotBound)
        );
        assert_eq!(
            render.require_pipeline(PassKind::Compute),
            Err(PassError::ComputePassNotInProgress)
        );
    }

    #[test]
    fn ending_clears_binding() {
        let mut state = PassState::started(PassKind::Render);
        state.mark_pipeline_bound(PassKind::Render).unwrap();
        assert!(state.graphics_pipeline_bound());
        assert!(state.require_pipeline(PassKind::Render).is_ok());

        state.end(PassKind::Render).unwrap();
        assert!(state.is_idle());
        assert!(!state.graphics_pipeline_bound());

        state = PassState::started(PassKind::Render);
        assert!(!state.graphics_pipeline_bound());
    }

    #[test]
    fn binding_requires_matching_pass() {
        let mut state = PassState::started(PassKind::Copy);
        assert_eq!(
            state.mark_pipeline_bound(PassKind::Compute),
            Err(PassError::ComputePassNotInProgress)
        );
        assert_eq!(
            state.mark_pipeline_bound(PassKind::Copy),
            Err(PassError::NoPipelineForCopyPass)
        );
        assert_eq!(state, PassState::Copy);
    }

    #[test]
    fn end_without_pass_is_rejected() {
        let mut state = PassState::started(PassKind::Copy);
        assert_eq!(
            state.end(PassKind::Render),
            Err(PassError::RenderPassNotInProgress)
        );
        assert!(state.in_progress(PassKind::Copy));
        assert_eq!(
            state.ensure_submittable(),
            Err(PassError::SubmitWhilePassInProgress)
        );
        state.end(PassKind::Copy).unwrap();
        assert!(state.ensure_submittable().is_ok());
    }
}
