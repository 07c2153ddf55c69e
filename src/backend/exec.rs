use crate::{
    backend::traits::{CommandResult, CommandRunner},
    error::IwError,
};
use std::{
    io::{self, Read},
    process::{Command, Stdio},
    sync::mpsc::{self, RecvTimeoutError},
    thread,
    time::{Duration, Instant},
};
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(5);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Runs programs directly (no shell) with stdout and stderr sharing one pipe,
/// so the captured text reads like `cmd 2>&1`.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    timeout: Duration,
}

impl SystemRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandResult, IwError> {
        let io_err = |source: io::Error| IwError::Io {
            program: program.to_string(),
            source,
        };
        debug!("executing command: {program} {}", args.join(" "));

        let (mut reader, writer) = io::pipe().map_err(io_err)?;
        let mut child = {
            let mut cmd = Command::new(program);
            cmd.args(args)
                .stdin(Stdio::null())
                .stdout(writer.try_clone().map_err(io_err)?)
                .stderr(writer);
            cmd.spawn().map_err(|source| IwError::Spawn {
                program: program.to_string(),
                source,
            })?
            // `cmd` holds our copies of the write end; they close here so the
            // reader sees EOF once the child exits.
        };

        // A background child can inherit the write end and hold the pipe open
        // after the tool exits; reading shares the process deadline.
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = tx.send(reader.read_to_end(&mut buf).map(|_| buf));
        });

        let timed_out = || IwError::Timeout {
            program: program.to_string(),
            timeout: self.timeout,
        };
        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if Instant::now() >= deadline => {
                    warn!("killing `{program}` after {:?}", self.timeout);
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(timed_out());
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(source) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(io_err(source));
                }
            }
        };

        let bytes = match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
            Ok(read) => read.map_err(io_err)?,
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    "`{program}` exited but its output stayed open past {:?}",
                    self.timeout
                );
                return Err(timed_out());
            }
            Err(RecvTimeoutError::Disconnected) => {
                return Err(io_err(io::Error::other("output reader stopped")));
            }
        };
        let output = String::from_utf8_lossy(&bytes).into_owned();

        if !status.success() {
            debug!(
                "`{program}` exited with {:?}: {:?}",
                status.code(),
                output.trim()
            );
        }

        Ok(CommandResult {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            status: status.code(),
            output,
        })
    }
}
