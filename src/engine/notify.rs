// src/engine/notify.rs

//! Operator-facing messages.
//!
//! The orchestrator emits one `info` per completed stage, one `info` on
//! success, and exactly one `error` on failure. What the messages turn into
//! (log lines, console output, editor pop-ups) is the caller's business.

use tracing::{error, info};

pub trait Notifier: Send + Sync {
    fn info(&self, message: &str);
    fn error(&self, message: &str);
}

/// Forwards messages to `tracing`.
#[derive(Debug, Clone, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn info(&self, message: &str) {
        info!(target: "deployagent::notify", "{message}");
    }

    fn error(&self, message: &str) {
        error!(target: "deployagent::notify", "{message}");
    }
}
