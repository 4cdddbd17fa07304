//! Command error types.

use ntcan_driver::{NtcanDriver, NtcanError};
use thiserror::Error;

/// Errors a command invocation can produce.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("invalid command name \"{name}\"")]
    UnknownCommand { name: String },

    #[error("wrong # args: should be \"{}\"", usage_line(.command, .usage))]
    Usage {
        command: String,
        usage: &'static str,
    },

    #[error("{command}: expected {expected} for {name} but got \"{value}\"")]
    InvalidArgument {
        command: String,
        name: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("NTCAN {call}() failed with error: {code} / {text}")]
    Driver {
        call: &'static str,
        code: i32,
        text: String,
    },

    #[error("NTCAN {call}() returned timeout")]
    Timeout { call: &'static str },

    #[error("NTCAN {call}() {verb} only {granted} instead of {requested} IDs")]
    CountMismatch {
        call: &'static str,
        verb: &'static str,
        granted: i32,
        requested: i32,
    },

    #[error("NTCAN {call}() data length > {max}")]
    LengthExceeded { call: &'static str, max: usize },
}

impl CommandError {
    /// Render a failed vendor call, using the driver's own error text.
    pub fn driver(err: NtcanError, driver: &dyn NtcanDriver) -> Self {
        tracing::warn!(call = err.call, code = %err.code, "driver call failed");
        Self::Driver {
            call: err.call,
            code: err.code.as_signed(),
            text: driver.format_error(err.code),
        }
    }

    /// Raised before any driver call was made.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            Self::UnknownCommand { .. } | Self::Usage { .. } | Self::InvalidArgument { .. }
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Short machine-readable tag for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnknownCommand { .. } => "unknown_command",
            Self::Usage { .. } => "usage",
            Self::InvalidArgument { .. } => "invalid_argument",
            Self::Driver { .. } => "driver",
            Self::Timeout { .. } => "timeout",
            Self::CountMismatch { .. } => "count_mismatch",
            Self::LengthExceeded { .. } => "length_exceeded",
        }
    }
}

fn usage_line(command: &str, usage: &str) -> String {
    if usage.is_empty() {
        command.to_string()
    } else {
        format!("{command} {usage}")
    }
}

/// Convenience alias for command results.
pub type CommandResult<T> = Result<T, CommandError>;
