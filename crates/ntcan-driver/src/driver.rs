//! The `NtcanDriver` seam.
//!
//! One method per vendor call. Implementations:
//! - `NativeDriver`: links the vendor `ntcan` library (feature `native`)
//! - `MockDriver`: in-memory simulation with call recording (in `mock.rs`)
//!
//! Every method blocks for as long as the underlying call does. Read and
//! write are bounded by the channel timeouts, there is no cancellation.

use crate::codes::ResultCode;
use crate::error::NtcanResult;
use crate::types::{
    BaudrateX, BusStatistic, CanMsg, CanMsgX, CtrlState, Handle, IfStatus, OpenParams,
};

/// Vendor entry point names, as reported in `NtcanError::call`.
pub mod calls {
    pub const OPEN: &str = "canOpen";
    pub const CLOSE: &str = "canClose";
    pub const SET_BAUDRATE: &str = "canSetBaudrate";
    pub const GET_BAUDRATE: &str = "canGetBaudrate";
    pub const SET_BAUDRATE_X: &str = "canSetBaudrateX";
    pub const GET_BAUDRATE_X: &str = "canGetBaudrateX";
    pub const ID_ADD: &str = "canIdAdd";
    pub const ID_DELETE: &str = "canIdDelete";
    pub const ID_REGION_ADD: &str = "canIdRegionAdd";
    pub const ID_REGION_DELETE: &str = "canIdRegionDelete";
    pub const IOCTL: &str = "canIoctl";
    pub const READ: &str = "canRead";
    pub const WRITE: &str = "canWrite";
    pub const READ_X: &str = "canReadX";
    pub const WRITE_X: &str = "canWriteX";
    pub const STATUS: &str = "canStatus";
}

/// Blocking access to an NTCAN driver.
pub trait NtcanDriver: Send + Sync {
    fn open(&self, params: OpenParams) -> NtcanResult<Handle>;

    fn close(&self, handle: Handle) -> NtcanResult<()>;

    fn set_baudrate(&self, handle: Handle, baud: u32) -> NtcanResult<()>;

    fn get_baudrate(&self, handle: Handle) -> NtcanResult<u32>;

    fn set_baudrate_x(&self, handle: Handle, baud: &BaudrateX) -> NtcanResult<()>;

    fn get_baudrate_x(&self, handle: Handle) -> NtcanResult<BaudrateX>;

    fn id_add(&self, handle: Handle, id: i32) -> NtcanResult<()>;

    fn id_delete(&self, handle: Handle, id: i32) -> NtcanResult<()>;

    /// Enable `count` consecutive ids. Returns how many the driver granted,
    /// which may be fewer than requested.
    fn id_region_add(&self, handle: Handle, start: i32, count: i32) -> NtcanResult<i32>;

    /// Disable `count` consecutive ids. Returns how many were removed.
    fn id_region_delete(&self, handle: Handle, start: i32, count: i32) -> NtcanResult<i32>;

    fn flush_rx_fifo(&self, handle: Handle) -> NtcanResult<()>;

    fn rx_msg_count(&self, handle: Handle) -> NtcanResult<u32>;

    fn tx_msg_count(&self, handle: Handle) -> NtcanResult<u32>;

    fn rx_timeout(&self, handle: Handle) -> NtcanResult<u32>;

    fn tx_timeout(&self, handle: Handle) -> NtcanResult<u32>;

    fn set_rx_timeout(&self, handle: Handle, timeout_ms: u32) -> NtcanResult<()>;

    fn set_tx_timeout(&self, handle: Handle, timeout_ms: u32) -> NtcanResult<()>;

    fn abort_rx(&self, handle: Handle) -> NtcanResult<()>;

    fn abort_tx(&self, handle: Handle) -> NtcanResult<()>;

    fn bus_statistic(&self, handle: Handle) -> NtcanResult<BusStatistic>;

    fn ctrl_status(&self, handle: Handle) -> NtcanResult<CtrlState>;

    /// Receive exactly one classic frame.
    fn read(&self, handle: Handle) -> NtcanResult<CanMsg>;

    /// Transmit exactly one classic frame.
    fn write(&self, handle: Handle, msg: &CanMsg) -> NtcanResult<()>;

    /// Receive exactly one CAN-FD capable frame.
    fn read_x(&self, handle: Handle) -> NtcanResult<CanMsgX>;

    /// Transmit exactly one CAN-FD capable frame.
    fn write_x(&self, handle: Handle, msg: &CanMsgX) -> NtcanResult<()>;

    fn status(&self, handle: Handle) -> NtcanResult<IfStatus>;

    /// Long human readable text for a result code.
    fn format_error(&self, code: ResultCode) -> String {
        code.describe().to_string()
    }
}
