//! Driver seam for the esd NTCAN CAN/CAN-FD library.
//!
//! Provides the NTCAN record types (`CMSG`, `CMSG_X`, bit rate, statistic
//! and status records), result codes, DLC mapping, and the `NtcanDriver`
//! trait with two backends:
//! - `MockDriver`: in-memory simulation, builds on any host
//! - `NativeDriver`: links the vendor library (feature `native`)

pub mod codes;
pub mod dlc;
pub mod driver;
pub mod error;
pub mod mock;
#[cfg(feature = "native")]
pub mod native;
pub mod types;

// Re-export key types for convenience
pub use codes::ResultCode;
pub use driver::{NtcanDriver, calls};
pub use error::{NtcanError, NtcanResult};
pub use mock::{MAX_REGION_GRANT, MockDriver};
#[cfg(feature = "native")]
pub use native::NativeDriver;
pub use types::{
    BaudrateX, BusStatistic, CanMsg, CanMsgX, CtrlState, Handle, IfStatus, OpenParams, Version,
};
