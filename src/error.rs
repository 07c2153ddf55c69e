use std::time::Duration;
use thiserror::Error;

/// Everything that can go wrong talking to `iwconfig`/`iwgetid`.
///
/// A label missing from the tool's output is not an error: getters return
/// the field's default value in that case.
#[derive(Error, Debug)]
pub enum IwError {
    /// The program could not be started (missing, not executable, ...).
    #[error("unable to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The program did not exit in time and was killed.
    #[error("`{program}` did not finish within {timeout:?}")]
    Timeout { program: String, timeout: Duration },

    /// Reading the captured output failed.
    #[error("unable to read output of `{program}`: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The label was found but the value next to it is malformed.
    #[error("unable to parse {field} from {text:?}")]
    UnparseableField { field: &'static str, text: String },

    #[error("invalid interface name {0:?}")]
    InvalidInterface(String),
}

impl IwError {
    pub(crate) fn unparseable(field: &'static str, text: &str) -> Self {
        Self::UnparseableField {
            field,
            text: text.to_string(),
        }
    }

    /// True when the tool itself could not be run to completion.
    pub fn is_executor_failure(&self) -> bool {
        matches!(self, Self::Spawn { .. } | Self::Timeout { .. } | Self::Io { .. })
    }
}
