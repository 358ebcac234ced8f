// tests/cli_entry.rs

use clap::Parser;
use deployagent::cli::CliArgs;
use deployagent::errors::DeployError;

#[tokio::test]
async fn dry_run_resolves_plan_without_touching_project() {
    let project = tempfile::tempdir().unwrap();
    let args = CliArgs::try_parse_from([
        "deployagent",
        "--project",
        project.path().to_str().unwrap(),
        "--repo-url",
        "https://github.com/example/ai-hackathon-25.git",
        "--dry-run",
    ])
    .unwrap();

    let ok = deployagent::run(args).await.unwrap();

    assert!(ok);
    assert!(!project.path().join("ai-hackathon-25").exists());
}

#[tokio::test]
async fn dry_run_reads_project_config_file() {
    let project = tempfile::tempdir().unwrap();
    std::fs::write(
        project.path().join("deployagent.toml"),
        "[repository]\nurl = \"https://github.com/example/ai-hackathon-25.git\"\n\n[script]\nrequired_env = [\"DEPLOYAGENT_TEST_SURELY_UNSET_KEY\"]\n",
    )
    .unwrap();
    let args = CliArgs::try_parse_from([
        "deployagent",
        "--project",
        project.path().to_str().unwrap(),
        "--dry-run",
    ])
    .unwrap();

    let err = deployagent::run(args).await.unwrap_err();

    match err.downcast_ref::<DeployError>() {
        Some(DeployError::ConfigError(msg)) => {
            assert!(msg.contains("DEPLOYAGENT_TEST_SURELY_UNSET_KEY"))
        }
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_project_directory_is_an_error() {
    let parent = tempfile::tempdir().unwrap();
    let missing = parent.path().join("does-not-exist");
    let args = CliArgs::try_parse_from([
        "deployagent",
        "--project",
        missing.to_str().unwrap(),
        "--repo-url",
        "https://github.com/example/ai-hackathon-25.git",
        "--dry-run",
    ])
    .unwrap();

    let err = deployagent::run(args).await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<DeployError>(),
        Some(DeployError::InvalidRequest(_))
    ));
}
