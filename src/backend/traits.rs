use crate::{domain::wireless::WirelessState, error::IwError};
use anyhow::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub program: String,
    pub args: Vec<String>,
    /// Exit code; `None` when the process was killed by a signal.
    pub status: Option<i32>,
    /// stdout and stderr, merged in the order they were written.
    pub output: String,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Runs one external program with an argument vector.
///
/// Runners are shared with blocking worker threads, hence `Send + Sync`.
pub trait CommandRunner: Send + Sync {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandResult, IwError>;
}

pub trait WirelessBackend {
    fn query_state(&self) -> Result<WirelessState>;
}
