// src/engine/mod.rs

//! Deployment orchestration engine.
//!
//! The pure state machine lives in [`core`]; the async shell that runs the
//! stages and feeds their results back into it is [`runtime`].
//!
//! ```text
//! Idle -> Acquiring -> Provisioning -> Running -> Succeeded
//!            |              |             |
//!            +--------------+-------------+----> Failed(stage, cause)
//! ```

use std::fmt;

use crate::errors::StageFailure;

pub mod core;
pub mod notify;
pub mod runtime;

pub use core::CorePipeline;
pub use notify::{Notifier, TracingNotifier};
pub use runtime::{DeployOrchestrator, DeployPlan, PipelineRun};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineState {
    Idle,
    Acquiring,
    Provisioning,
    Running,
    Succeeded,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Succeeded | PipelineState::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::Idle => "idle",
            PipelineState::Acquiring => "acquiring",
            PipelineState::Provisioning => "provisioning",
            PipelineState::Running => "running",
            PipelineState::Succeeded => "succeeded",
            PipelineState::Failed => "failed",
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal result of one run. Produced once; never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// All stages completed; carries the script's stdout.
    Success { stdout: String },
    Failure(StageFailure),
}

impl PipelineOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PipelineOutcome::Success { .. })
    }

    pub fn failure(&self) -> Option<&StageFailure> {
        match self {
            PipelineOutcome::Failure(f) => Some(f),
            PipelineOutcome::Success { .. } => None,
        }
    }
}

/// Inputs to the core state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreEvent {
    Start,
    /// The current stage finished; `stdout` is only set by the script stage.
    StageSucceeded { stdout: Option<String> },
    StageFailed(StageFailure),
}

impl CoreEvent {
    pub fn name(&self) -> &'static str {
        match self {
            CoreEvent::Start => "start",
            CoreEvent::StageSucceeded { .. } => "stage-succeeded",
            CoreEvent::StageFailed(_) => "stage-failed",
        }
    }
}

/// What the shell should do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    RunAcquisition,
    RunProvisioning,
    RunScript,
    Finish(PipelineOutcome),
}
