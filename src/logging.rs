use std::{
    env,
    fs::{self, OpenOptions},
    path::PathBuf,
    sync::Mutex,
};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the tracing filter, e.g. `IWTUI_LOG=debug`.
pub const LOG_ENV: &str = "IWTUI_LOG";

/// Starts tracing into the log file; the terminal belongs to the TUI.
///
/// Returns the log path, or `None` when no file could be opened and logging
/// stays off.
pub fn init() -> Option<PathBuf> {
    let path = log_path()?;
    fs::create_dir_all(path.parent()?).ok()?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .ok()?;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_file(true)
        .with_line_number(true)
        .compact()
        .try_init()
        .ok()?;

    Some(path)
}

fn log_path() -> Option<PathBuf> {
    let base = env::var_os("XDG_STATE_HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".local/state")))?;
    Some(base.join("iwtui/iwtui.log"))
}
