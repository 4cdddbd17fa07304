//! `ntcan::Scan`: probe every logical net and report what answers.

use ntcan_driver::types::MAX_NETS;
use ntcan_driver::{NtcanDriver, OpenParams};

use crate::args::Args;
use crate::error::CommandResult;
use crate::registry::CommandSpec;
use crate::report;
use crate::value::Value;

pub fn commands() -> Vec<CommandSpec> {
    vec![CommandSpec {
        name: "Scan",
        usage: "",
        arity: 0,
        summary: "List every reachable net with board id, versions and status",
        handler: scan,
    }]
}

/// Nets that cannot be opened are not present and are skipped without a
/// line. A net that opens but fails `canStatus` gets a failure line. The
/// scan itself always succeeds.
fn scan(_args: &Args<'_>, driver: &dyn NtcanDriver) -> CommandResult<Value> {
    let mut report = String::new();

    for net in 0..=MAX_NETS {
        let Ok(handle) = driver.open(OpenParams::probe(net)) else {
            continue;
        };
        let status = driver.status(handle);
        if let Err(err) = driver.close(handle) {
            tracing::debug!(net, code = %err.code, "close after probe failed");
        }

        match status {
            Ok(status) => {
                tracing::info!(net, board = %status.boardid, "net found");
                report::push_scan_entry(&mut report, net, &status);
            }
            Err(err) => {
                tracing::warn!(net, code = %err.code, "net status unavailable");
                report::push_scan_failure(&mut report, net, err.code);
            }
        }
    }

    Ok(Value::Text(report))
}
