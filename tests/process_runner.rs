// tests/process_runner.rs
#![cfg(unix)]

use std::path::Path;
use std::time::{Duration, Instant};

use deployagent::env::EnvironmentVariables;
use deployagent::exec::{CommandRunner, CommandSpec, TokioCommandRunner};
use deployagent::stages::ScriptRunner;
use deployagent_test_utils::{init_tracing, with_timeout};

fn sh(script: &str, cwd: &Path) -> CommandSpec {
    CommandSpec::new("/bin/sh", cwd).arg("-c").arg(script)
}

#[tokio::test]
async fn captures_stdout_stderr_and_exit_code() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let runner = TokioCommandRunner::new();

    let out = with_timeout(runner.run(&sh("echo generated; echo oops >&2; exit 4", dir.path())))
        .await
        .unwrap();

    assert_eq!(out.exit_code, Some(4));
    assert_eq!(out.stdout, "generated\n");
    assert_eq!(out.stderr, "oops\n");
    assert!(!out.success());
}

#[tokio::test]
async fn runs_in_requested_working_directory() {
    let dir = tempfile::tempdir().unwrap();
    let canonical = dir.path().canonicalize().unwrap();
    let runner = TokioCommandRunner::new();

    let out = runner.run(&sh("pwd -P", &canonical)).await.unwrap();

    assert_eq!(out.stdout.trim_end(), canonical.to_string_lossy());
}

#[tokio::test]
async fn explicit_env_replaces_inherited_environment() {
    let dir = tempfile::tempdir().unwrap();
    let runner = TokioCommandRunner::new();
    let mut env = EnvironmentVariables::new();
    env.insert("PINECONE_INDEX", "docs");

    let spec = sh(
        "printf '%s|%s' \"$PINECONE_INDEX\" \"${HOME:-unset}\"",
        dir.path(),
    )
    .env(env);
    let out = runner.run(&spec).await.unwrap();

    assert_eq!(out.stdout, "docs|unset");
}

#[tokio::test]
async fn extra_env_is_layered_on_inherited_environment() {
    let dir = tempfile::tempdir().unwrap();
    let runner = TokioCommandRunner::new();

    let spec = sh(
        "printf '%s|%s' \"$GIT_TERMINAL_PROMPT\" \"${HOME:+set}\"",
        dir.path(),
    )
    .extra_env("GIT_TERMINAL_PROMPT", "0");
    let out = runner.run(&spec).await.unwrap();

    assert_eq!(out.stdout, "0|set");
}

#[tokio::test]
async fn missing_program_is_an_error_not_an_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let runner = TokioCommandRunner::new();

    let spec = CommandSpec::new("/nonexistent/bin/python3", dir.path()).arg("-V");
    let err = runner.run(&spec).await.unwrap_err();

    assert!(err.to_string().contains("/nonexistent/bin/python3"));
}

#[tokio::test]
async fn script_timeout_kills_the_child() {
    let dir = tempfile::tempdir().unwrap();
    let runner = TokioCommandRunner::new();
    let script = ScriptRunner::new(&runner, Duration::from_millis(200));

    let mut env = EnvironmentVariables::new();
    env.insert("PATH", "/usr/bin:/bin");
    let started = Instant::now();
    let err = with_timeout(script.run(
        Path::new("/bin/sh"),
        dir.path(),
        &["-c".to_string(), "sleep 30".to_string()],
        env,
    ))
    .await
    .unwrap_err();

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(err.exit_code, None);
    assert!(err.message.contains("timed out"));
}
