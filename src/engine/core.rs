// src/engine/core.rs

//! Pure pipeline state machine.
//!
//! Consumes [`CoreEvent`]s and returns the [`CoreCommand`] the IO shell must
//! execute next. No Tokio, no processes, no filesystem; it can be driven
//! entirely from unit tests.

use tracing::debug;

use crate::engine::{CoreCommand, CoreEvent, PipelineOutcome, PipelineState};
use crate::errors::{DeployError, Result};

#[derive(Debug, Clone)]
pub struct CorePipeline {
    state: PipelineState,
    history: Vec<PipelineState>,
}

impl Default for CorePipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl CorePipeline {
    pub fn new() -> Self {
        Self {
            state: PipelineState::Idle,
            history: vec![PipelineState::Idle],
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Every state visited so far, starting with `Idle`.
    pub fn history(&self) -> &[PipelineState] {
        &self.history
    }

    /// Apply one event.
    ///
    /// Terminal states accept nothing; a new run needs a new `CorePipeline`.
    pub fn step(&mut self, event: CoreEvent) -> Result<CoreCommand> {
        use PipelineState::*;

        let (next, command) = match (self.state, event) {
            (Idle, CoreEvent::Start) => (Acquiring, CoreCommand::RunAcquisition),
            (Acquiring, CoreEvent::StageSucceeded { .. }) => {
                (Provisioning, CoreCommand::RunProvisioning)
            }
            (Provisioning, CoreEvent::StageSucceeded { .. }) => (Running, CoreCommand::RunScript),
            (Running, CoreEvent::StageSucceeded { stdout }) => (
                Succeeded,
                CoreCommand::Finish(PipelineOutcome::Success {
                    stdout: stdout.unwrap_or_default(),
                }),
            ),
            (Acquiring | Provisioning | Running, CoreEvent::StageFailed(failure)) => {
                (Failed, CoreCommand::Finish(PipelineOutcome::Failure(failure)))
            }
            (state, event) => {
                return Err(DeployError::InvalidTransition {
                    state: state.to_string(),
                    event: event.name().to_string(),
                });
            }
        };

        debug!(from = %self.state, to = %next, "pipeline transition");
        self.state = next;
        self.history.push(next);
        Ok(command)
    }
}
