//! Driver call error types.

use thiserror::Error;

use crate::codes::ResultCode;

/// A vendor call that returned something other than `NTCAN_SUCCESS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{call}() returned {code}")]
pub struct NtcanError {
    /// Vendor entry point that failed (e.g. `canIoctl`).
    pub call: &'static str,
    /// Raw result code.
    pub code: ResultCode,
}

impl NtcanError {
    pub fn new(call: &'static str, code: ResultCode) -> Self {
        Self { call, code }
    }

    pub fn is_rx_timeout(&self) -> bool {
        self.code == ResultCode::RX_TIMEOUT
    }
}

/// Convenience alias for driver results.
pub type NtcanResult<T> = Result<T, NtcanError>;

/// Map a raw return value onto `NtcanResult`.
pub fn check(call: &'static str, code: ResultCode) -> NtcanResult<()> {
    if code.is_success() {
        Ok(())
    } else {
        Err(NtcanError::new(call, code))
    }
}
