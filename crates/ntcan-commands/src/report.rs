//! Text renderings of interface status, shared by `Status` and `Scan`.

use std::fmt::Write;

use ntcan_driver::{IfStatus, ResultCode, Version};

/// Multi-line status block returned by `ntcan::Status`.
pub fn status_text(status: &IfStatus) -> String {
    format!(
        "ID={}\nDll={}\nDrv={}\nFW={}\nHW={}\nStatus={:08x}\nFeatures={:04x}",
        status.boardid,
        Version(status.dll),
        Version(status.driver),
        Version(status.firmware),
        Version(status.hardware),
        status.boardstatus,
        status.features,
    )
}

/// Append the scan entry of a reachable net.
pub fn push_scan_entry(report: &mut String, net: i32, status: &IfStatus) {
    // Writing into a String cannot fail.
    let _ = write!(
        report,
        "Net {net:3}: ID={}\n         Versions (hex): Dll={}  Drv={} FW={} HW={}\n         Status={:08x} Features={:04x}\n",
        status.boardid,
        Version(status.dll),
        Version(status.driver),
        Version(status.firmware),
        Version(status.hardware),
        status.boardstatus,
        status.features,
    );
}

/// Append the line for a net that opened but could not report its status.
pub fn push_scan_failure(report: &mut String, net: i32, code: ResultCode) {
    let _ = writeln!(
        report,
        "Cannot get Status of Net-Device {net:02X} (ret = 0x{:x})",
        code.0
    );
}
