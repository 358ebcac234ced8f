// tests/pipeline_properties.rs

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use deployagent::engine::{
    CoreCommand, CoreEvent, CorePipeline, DeployOrchestrator, PipelineOutcome, PipelineState,
};
use deployagent::env::EnvironmentVariables;
use deployagent::errors::{FailureStage, StageFailure};
use deployagent::exec::HostPlatform;
use deployagent::fs::mock::MockFileSystem;
use deployagent_test_utils::builders::ConfigBuilder;
use deployagent_test_utils::fake_runner::{failed, ok, FakeCommandRunner};
use proptest::prelude::*;

const STAGES: [FailureStage; 3] = [
    FailureStage::Acquisition,
    FailureStage::Environment,
    FailureStage::Script,
];

proptest! {
    // Feed the core a success/failure verdict per stage; it must stop at the
    // first failure and never ask for another stage afterwards.
    #[test]
    fn core_stops_at_first_failure(verdicts in proptest::collection::vec(any::<bool>(), 3)) {
        let mut core = CorePipeline::new();
        let mut command = core.step(CoreEvent::Start).unwrap();
        let mut stages_run = 0;

        let outcome = loop {
            match command {
                CoreCommand::Finish(outcome) => break outcome,
                _ => {
                    let idx = stages_run;
                    stages_run += 1;
                    let event = if verdicts[idx] {
                        CoreEvent::StageSucceeded { stdout: Some("out".to_string()) }
                    } else {
                        CoreEvent::StageFailed(StageFailure::new(STAGES[idx], "boom"))
                    };
                    command = core.step(event).unwrap();
                }
            }
        };

        match verdicts.iter().position(|ok| !ok) {
            Some(first_bad) => {
                prop_assert_eq!(stages_run, first_bad + 1);
                prop_assert_eq!(outcome.failure().map(|f| f.stage), Some(STAGES[first_bad]));
                prop_assert_eq!(core.state(), PipelineState::Failed);
            }
            None => {
                prop_assert_eq!(stages_run, 3);
                prop_assert!(outcome.is_success());
                prop_assert_eq!(core.state(), PipelineState::Succeeded);
            }
        }

        // Terminal: nothing else is accepted.
        prop_assert!(core.step(CoreEvent::Start).is_err());
        let late_success = core.step(CoreEvent::StageSucceeded { stdout: None });
        prop_assert!(late_success.is_err());
        prop_assert_eq!(core.history().first(), Some(&PipelineState::Idle));
        prop_assert!(core.history().last().is_some_and(|s| s.is_terminal()));
    }

    // Fail the N-th external command of a full run; every later command
    // must never be issued and the failure tag must match the command's stage.
    #[test]
    fn orchestrator_issues_no_command_after_a_failure(fail_at in 0usize..7) {
        let fs = MockFileSystem::new();
        fs.add_dir("/work/myproj");

        let counter = Arc::new(AtomicUsize::new(0));
        let responder_fs = fs.clone();
        let responder_counter = Arc::clone(&counter);
        let runner = FakeCommandRunner::new(move |spec| {
            let n = responder_counter.fetch_add(1, Ordering::SeqCst);
            if spec.arg_strings().first().map(String::as_str) == Some("clone") {
                responder_fs.add_file(
                    "/work/myproj/ai-hackathon-25/requirements.txt",
                    "requests\n",
                );
            }
            if n == fail_at {
                Ok(failed(1, "injected failure\n"))
            } else {
                Ok(ok("done\n"))
            }
        });
        let log = runner.log();
        let locks = tempfile::tempdir().unwrap();

        let orchestrator = DeployOrchestrator::new(ConfigBuilder::new().build(), runner)
            .with_fs(Arc::new(fs))
            .with_platform(HostPlatform::Unix)
            .with_ambient_env(EnvironmentVariables::new())
            .with_lock_dir(locks.path());

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let run = rt.block_on(orchestrator.deploy("/work/myproj")).unwrap();

        // clone, checkout, venv, pip, script
        let expected_stage = match fail_at {
            0 | 1 => Some(FailureStage::Acquisition),
            2 => Some(FailureStage::Environment),
            3 => Some(FailureStage::Dependencies),
            4 => Some(FailureStage::Script),
            _ => None,
        };

        match expected_stage {
            Some(stage) => {
                prop_assert_eq!(log.len(), fail_at + 1);
                let failure = run.outcome.failure().unwrap();
                prop_assert_eq!(failure.stage, stage);
                prop_assert_eq!(failure.cause.as_str(), "injected failure\n");
            }
            None => {
                prop_assert_eq!(log.len(), 5);
                prop_assert_eq!(
                    run.outcome,
                    PipelineOutcome::Success { stdout: "done\n".to_string() }
                );
            }
        }
    }
}
