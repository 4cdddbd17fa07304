//! NTCAN result codes (`NTCAN_RESULT`).
//!
//! Numbering follows the vendor header: generic failures reuse the host's
//! system error numbers, CAN specific failures sit above `ERRNO_BASE`.

use std::fmt;

/// Base of the CAN specific error range.
const ERRNO_BASE: u32 = 0xE000_0000;

/// Raw return value of an NTCAN call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResultCode(pub u32);

impl ResultCode {
    pub const SUCCESS: Self = Self(0);

    // ── Generic ────────────────────────────────────────────────
    pub const INVALID_HANDLE: Self = Self(6);
    pub const NET_NOT_FOUND: Self = Self(67);
    pub const INVALID_PARAMETER: Self = Self(87);
    pub const OPERATION_ABORTED: Self = Self(995);
    pub const IO_PENDING: Self = Self(997);
    pub const INSUFFICIENT_RESOURCES: Self = Self(1450);

    // ── CAN specific ───────────────────────────────────────────
    pub const RX_TIMEOUT: Self = Self(ERRNO_BASE + 1);
    pub const TX_TIMEOUT: Self = Self(ERRNO_BASE + 2);
    pub const TX_ERROR: Self = Self(ERRNO_BASE + 4);
    pub const CONTR_OFF_BUS: Self = Self(ERRNO_BASE + 5);
    pub const CONTR_BUSY: Self = Self(ERRNO_BASE + 6);
    pub const CONTR_WARN: Self = Self(ERRNO_BASE + 7);
    pub const NO_ID_ENABLED: Self = Self(ERRNO_BASE + 9);
    pub const ID_ALREADY_ENABLED: Self = Self(ERRNO_BASE + 10);
    pub const ID_NOT_ENABLED: Self = Self(ERRNO_BASE + 11);
    pub const INVALID_FIRMWARE: Self = Self(ERRNO_BASE + 13);
    pub const MESSAGE_LOST: Self = Self(ERRNO_BASE + 14);
    pub const INVALID_HARDWARE: Self = Self(ERRNO_BASE + 15);
    pub const PENDING_WRITE: Self = Self(ERRNO_BASE + 16);
    pub const PENDING_READ: Self = Self(ERRNO_BASE + 17);
    pub const INVALID_DRIVER: Self = Self(ERRNO_BASE + 18);
    pub const WRONG_DEVICE_STATE: Self = Self(ERRNO_BASE + 19);
    pub const HANDLE_FORCED_CLOSE: Self = Self(ERRNO_BASE + 20);
    pub const NOT_IMPLEMENTED: Self = Self(ERRNO_BASE + 21);
    pub const NOT_SUPPORTED: Self = Self(ERRNO_BASE + 22);
    pub const CONTR_ERR_PASSIVE: Self = Self(ERRNO_BASE + 23);

    pub fn is_success(self) -> bool {
        self == Self::SUCCESS
    }

    /// The code as the C `%d` conversion prints it.
    pub fn as_signed(self) -> i32 {
        self.0 as i32
    }

    /// Symbolic name, e.g. `NTCAN_RX_TIMEOUT`.
    pub fn name(self) -> &'static str {
        self.entry().map_or("NTCAN_UNKNOWN", |(name, _)| name)
    }

    /// Long description, as `canFormatError(NTCAN_ERROR_FORMAT_LONG)` words it.
    pub fn describe(self) -> &'static str {
        self.entry().map_or("Unknown error", |(_, text)| text)
    }

    fn entry(self) -> Option<(&'static str, &'static str)> {
        let entry = match self {
            Self::SUCCESS => ("NTCAN_SUCCESS", "Operation finished successfully"),
            Self::INVALID_HANDLE => ("NTCAN_INVALID_HANDLE", "Invalid handle"),
            Self::NET_NOT_FOUND => ("NTCAN_NET_NOT_FOUND", "Logical net number not found"),
            Self::INVALID_PARAMETER => ("NTCAN_INVALID_PARAMETER", "Invalid parameter"),
            Self::OPERATION_ABORTED => ("NTCAN_OPERATION_ABORTED", "Operation aborted"),
            Self::IO_PENDING => ("NTCAN_IO_PENDING", "Operation pending"),
            Self::INSUFFICIENT_RESOURCES => (
                "NTCAN_INSUFFICIENT_RESOURCES",
                "Insufficient resources to complete the request",
            ),
            Self::RX_TIMEOUT => ("NTCAN_RX_TIMEOUT", "Timeout while waiting for receive data"),
            Self::TX_TIMEOUT => ("NTCAN_TX_TIMEOUT", "Timeout while transmitting data"),
            Self::TX_ERROR => ("NTCAN_TX_ERROR", "Transmission error"),
            Self::CONTR_OFF_BUS => ("NTCAN_CONTR_OFF_BUS", "CAN controller is off bus"),
            Self::CONTR_BUSY => ("NTCAN_CONTR_BUSY", "CAN controller is busy"),
            Self::CONTR_WARN => ("NTCAN_CONTR_WARN", "CAN controller is in warning state"),
            Self::NO_ID_ENABLED => ("NTCAN_NO_ID_ENABLED", "No CAN-ID enabled for reception"),
            Self::ID_ALREADY_ENABLED => ("NTCAN_ID_ALREADY_ENABLED", "CAN-ID is already enabled"),
            Self::ID_NOT_ENABLED => ("NTCAN_ID_NOT_ENABLED", "CAN-ID is not enabled"),
            Self::INVALID_FIRMWARE => ("NTCAN_INVALID_FIRMWARE", "Invalid firmware"),
            Self::MESSAGE_LOST => ("NTCAN_MESSAGE_LOST", "Messages lost due to FIFO overrun"),
            Self::INVALID_HARDWARE => ("NTCAN_INVALID_HARDWARE", "Invalid hardware"),
            Self::PENDING_WRITE => ("NTCAN_PENDING_WRITE", "Another write is pending"),
            Self::PENDING_READ => ("NTCAN_PENDING_READ", "Another read is pending"),
            Self::INVALID_DRIVER => ("NTCAN_INVALID_DRIVER", "Driver and library are incompatible"),
            Self::WRONG_DEVICE_STATE => (
                "NTCAN_WRONG_DEVICE_STATE",
                "Device is in a state that does not allow this operation",
            ),
            Self::HANDLE_FORCED_CLOSE => ("NTCAN_HANDLE_FORCED_CLOSE", "Handle was closed forcibly"),
            Self::NOT_IMPLEMENTED => ("NTCAN_NOT_IMPLEMENTED", "Function not implemented"),
            Self::NOT_SUPPORTED => ("NTCAN_NOT_SUPPORTED", "Function not supported by hardware"),
            Self::CONTR_ERR_PASSIVE => (
                "NTCAN_CONTR_ERR_PASSIVE",
                "CAN controller is in error passive state",
            ),
            _ => return None,
        };
        Some(entry)
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:08X})", self.name(), self.0)
    }
}
