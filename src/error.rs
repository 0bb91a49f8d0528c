//! Domain errors raised by the report pipeline.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    /// The benchmark run could not be started or exited abnormally.
    #[error("external process failure: `{command}` {reason}")]
    ExternalProcessFailure { command: String, reason: String },

    /// A line inside a `Logs:` block does not follow the measurement grammar.
    #[error("malformed log line {line}: {reason}: {text:?}")]
    MalformedLogLine {
        line: usize,
        reason: &'static str,
        text: String,
    },

    #[error("empty result set: no markets or tests were recorded")]
    EmptyResultSet,

    #[error("RPC not set: pass --rpc <url> or --log <file>")]
    MissingRpc,
}

impl ReportError {
    pub(crate) fn malformed(reason: &'static str, text: &str) -> Self {
        ReportError::MalformedLogLine {
            line: 0,
            reason,
            text: text.to_string(),
        }
    }

    /// Attach a 1-based line number to a malformed-line error.
    pub(crate) fn at_line(self, lno: usize) -> Self {
        match self {
            ReportError::MalformedLogLine { reason, text, .. } => ReportError::MalformedLogLine {
                line: lno,
                reason,
                text,
            },
            other => other,
        }
    }
}
