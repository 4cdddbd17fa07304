//! Command handlers, one per vendor entry point.
//!
//! - scan: enumerate reachable nets
//! - channel: Open, Close, Status
//! - baudrate: classic and CAN-FD bit rate
//! - filter: id acceptance filter
//! - ioctl: FIFO, counters, timeouts, abort, statistics
//! - frame: Read, Write, ReadX, WriteX

pub mod baudrate;
pub mod channel;
pub mod filter;
pub mod frame;
pub mod ioctl;
pub mod scan;

use ntcan_driver::{NtcanDriver, NtcanError};

use crate::error::CommandError;
use crate::registry::CommandSpec;

/// Every command in registration order.
pub fn all_commands() -> Vec<CommandSpec> {
    let mut commands = Vec::new();
    commands.extend(scan::commands());
    commands.extend(channel::commands());
    commands.extend(baudrate::commands());
    commands.extend(filter::commands());
    commands.extend(ioctl::commands());
    commands.extend(frame::commands());
    commands
}

/// `map_err` adapter turning a driver failure into `CommandError::Driver`.
pub(crate) fn failed(driver: &dyn NtcanDriver) -> impl FnOnce(NtcanError) -> CommandError + '_ {
    move |err| CommandError::driver(err, driver)
}
