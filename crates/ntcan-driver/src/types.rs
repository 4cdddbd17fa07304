//! NTCAN record types and constants.

use std::fmt;

use crate::dlc;

// ── Limits ──────────────────────────────────────────────────────

/// Highest logical net number the driver accepts.
pub const MAX_NETS: i32 = 255;

/// Payload bound of a classic CAN frame.
pub const MAX_CLASSIC_DATA: usize = 8;

/// Payload bound of a CAN-FD frame.
pub const MAX_FD_DATA: usize = 64;

// ── `len` field flags (upper nibble) ───────────────────────────

/// Remote transmission request.
pub const LEN_RTR: u8 = 0x10;
/// Frame was sent by this handle (interaction).
pub const LEN_INTERACTION: u8 = 0x20;
/// CAN-FD frame without bit rate switch.
pub const LEN_NO_BRS: u8 = 0x40;
/// CAN-FD frame.
pub const LEN_FD: u8 = 0x80;
/// Mask of all flag bits.
pub const LEN_FLAGS_MASK: u8 = 0xF0;

// ── Handle ──────────────────────────────────────────────────────

/// Opaque channel token returned by `canOpen`.
///
/// Owned by the driver. Callers forward it unchanged and must not use it
/// after `canClose`; the driver rejects stale handles itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(pub i64);

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── canOpen parameters ──────────────────────────────────────────

/// Arguments of `canOpen`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenParams {
    pub net: i32,
    pub mode: u32,
    pub tx_queue: i32,
    pub rx_queue: i32,
    /// Transmit timeout in milliseconds.
    pub tx_timeout: i32,
    /// Receive timeout in milliseconds.
    pub rx_timeout: i32,
}

impl OpenParams {
    /// Parameters used to briefly probe a net (smallest queues, no timeouts).
    pub fn probe(net: i32) -> Self {
        Self {
            net,
            mode: 0,
            tx_queue: 1,
            rx_queue: 1,
            tx_timeout: 0,
            rx_timeout: 0,
        }
    }
}

// ── Frames ──────────────────────────────────────────────────────

/// Classic CAN message (`CMSG`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CanMsg {
    pub id: i32,
    /// Flags in the upper nibble, DLC in the lower nibble.
    pub len: u8,
    pub data: [u8; MAX_CLASSIC_DATA],
}

impl CanMsg {
    /// Build a frame from a payload of at most 8 bytes; `None` if longer.
    pub fn new(id: i32, flags: u8, payload: &[u8]) -> Option<Self> {
        if payload.len() > MAX_CLASSIC_DATA {
            return None;
        }
        let mut data = [0u8; MAX_CLASSIC_DATA];
        data[..payload.len()].copy_from_slice(payload);
        Some(Self {
            id,
            len: flags | payload.len() as u8,
            data,
        })
    }

    pub fn flags(&self) -> u8 {
        self.len & LEN_FLAGS_MASK
    }

    /// Payload size, never more than the 8 data bytes a classic frame holds,
    /// even when `len` carries the FD flag with a DLC above 8.
    pub fn datasize(&self) -> usize {
        dlc::len_to_datasize(self.len).min(MAX_CLASSIC_DATA)
    }

    pub fn payload(&self) -> &[u8] {
        &self.data[..self.datasize()]
    }
}

/// CAN-FD capable message (`CMSG_X`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanMsgX {
    pub id: i32,
    /// Flags in the upper nibble, DLC code in the lower nibble.
    pub len: u8,
    pub data: [u8; MAX_FD_DATA],
}

impl Default for CanMsgX {
    fn default() -> Self {
        Self {
            id: 0,
            len: 0,
            data: [0u8; MAX_FD_DATA],
        }
    }
}

impl CanMsgX {
    /// Build a frame from a payload of at most 64 bytes; `None` if longer.
    ///
    /// The lower nibble of `len` carries the DLC code for the payload size,
    /// so payload sizes between two DLC steps are padded with zeros.
    pub fn new(id: i32, flags: u8, payload: &[u8]) -> Option<Self> {
        if payload.len() > MAX_FD_DATA {
            return None;
        }
        let mut data = [0u8; MAX_FD_DATA];
        data[..payload.len()].copy_from_slice(payload);
        Some(Self {
            id,
            len: flags | dlc::datasize_to_dlc(payload.len()),
            data,
        })
    }

    pub fn flags(&self) -> u8 {
        self.len & LEN_FLAGS_MASK
    }

    pub fn datasize(&self) -> usize {
        dlc::len_to_datasize(self.len)
    }

    pub fn payload(&self) -> &[u8] {
        &self.data[..self.datasize()]
    }
}

// ── Configuration and status records ───────────────────────────

/// CAN-FD bit rate configuration (`NTCAN_BAUDRATE_X`), rate-index encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BaudrateX {
    pub mode: u16,
    pub flags: u16,
    /// Nominal (arbitration phase) rate.
    pub nominal: u32,
    /// Data phase rate.
    pub data: u32,
}

/// Bus statistic snapshot (`NTCAN_BUS_STATISTIC`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BusStatistic {
    pub rcv_count: u32,
    pub xmit_count: u32,
    pub ctrl_ovr: u32,
    pub fifo_ovr: u32,
    pub err_frames: u32,
    pub aborted_frames: u32,
}

/// Controller state (`NTCAN_CTRL_STATE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CtrlState {
    pub rcv_err_counter: u8,
    pub xmit_err_counter: u8,
    pub status: u8,
    pub controller_type: u8,
}

/// Interface status (`CAN_IF_STATUS`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IfStatus {
    pub hardware: u16,
    pub firmware: u16,
    pub driver: u16,
    pub dll: u16,
    pub boardstatus: u32,
    pub boardid: String,
    pub features: u16,
}

/// A `major.minor.revision` quartet packed into 16 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version(pub u16);

impl Version {
    pub fn major(self) -> u16 {
        self.0 >> 12
    }

    pub fn minor(self) -> u16 {
        (self.0 >> 8) & 0xF
    }

    pub fn revision(self) -> u16 {
        self.0 & 0xFF
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:X}.{:X}.{:02X}",
            self.major(),
            self.minor(),
            self.revision()
        )
    }
}
