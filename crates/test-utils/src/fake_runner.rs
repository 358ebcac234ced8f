use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use deployagent::engine::Notifier;
use deployagent::errors::Result;
use deployagent::exec::{CapturedOutput, CommandRunner, CommandSpec};

type Responder = dyn Fn(&CommandSpec) -> Result<CapturedOutput> + Send + Sync;

/// Shared, cloneable record of every command a fake runner was asked to run.
#[derive(Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<CommandSpec>>>,
}

impl CallLog {
    fn push(&self, spec: CommandSpec) {
        self.calls.lock().unwrap().push(spec);
    }

    pub fn all(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `"<program name> <first arg>"` per call, e.g. `"git clone"`.
    pub fn summary(&self) -> Vec<String> {
        self.all()
            .iter()
            .map(|c| match c.arg_strings().first() {
                Some(first) => format!("{} {}", c.program_name(), first),
                None => c.program_name(),
            })
            .collect()
    }

    pub fn count_matching(&self, pred: impl Fn(&CommandSpec) -> bool) -> usize {
        self.all().iter().filter(|c| pred(c)).count()
    }
}

/// A fake runner that:
/// - records every `CommandSpec` it receives
/// - answers with whatever the responder returns (no real processes).
pub struct FakeCommandRunner {
    log: CallLog,
    responder: Box<Responder>,
}

impl FakeCommandRunner {
    pub fn new(
        responder: impl Fn(&CommandSpec) -> Result<CapturedOutput> + Send + Sync + 'static,
    ) -> Self {
        Self {
            log: CallLog::default(),
            responder: Box::new(responder),
        }
    }

    /// Every command exits 0 with empty output.
    pub fn succeeding() -> Self {
        Self::new(|_| Ok(ok("")))
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }
}

impl CommandRunner for FakeCommandRunner {
    fn run<'a>(
        &'a self,
        spec: &'a CommandSpec,
    ) -> Pin<Box<dyn Future<Output = Result<CapturedOutput>> + Send + 'a>> {
        self.log.push(spec.clone());
        let result = (self.responder)(spec);
        Box::pin(async move { result })
    }
}

pub fn ok(stdout: &str) -> CapturedOutput {
    CapturedOutput {
        exit_code: Some(0),
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

pub fn failed(code: i32, stderr: &str) -> CapturedOutput {
    CapturedOutput {
        exit_code: Some(code),
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}

/// Notifier that keeps every message for assertions.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    infos: Arc<Mutex<Vec<String>>>,
    errors: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    pub fn infos(&self) -> Vec<String> {
        self.infos.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn info(&self, message: &str) {
        self.infos.lock().unwrap().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}
