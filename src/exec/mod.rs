// src/exec/mod.rs

//! Process execution layer.
//!
//! Everything the pipeline does to the outside world beyond the filesystem is
//! a child process: `git`, the Python interpreter that creates the isolated
//! environment, pip, and finally the generation script.
//!
//! - [`command`] holds the structured [`CommandSpec`] and [`CapturedOutput`].
//! - [`backend`] provides the [`CommandRunner`] trait and the production
//!   [`TokioCommandRunner`]; tests swap in a fake runner.
//! - [`platform`] is the per-OS strategy table that builds the
//!   interpreter/environment commands.

pub mod backend;
pub mod command;
pub mod platform;

pub use backend::{CommandRunner, TokioCommandRunner};
pub use command::{CapturedOutput, CommandSpec};
pub use platform::{HostPlatform, PlatformCommands};
