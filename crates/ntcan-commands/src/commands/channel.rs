//! Channel lifecycle and interface status.

use ntcan_driver::{NtcanDriver, OpenParams};

use super::failed;
use crate::args::Args;
use crate::error::CommandResult;
use crate::registry::CommandSpec;
use crate::report;
use crate::value::Value;

pub fn commands() -> Vec<CommandSpec> {
    vec![
        CommandSpec {
            name: "Open",
            usage: "net mode txqueuesize rxqueuesize txtimeout rxtimeout",
            arity: 6,
            summary: "Open a channel on a logical net and return its handle",
            handler: open,
        },
        CommandSpec {
            name: "Close",
            usage: "handle",
            arity: 1,
            summary: "Close a channel",
            handler: close,
        },
        CommandSpec {
            name: "Status",
            usage: "handle",
            arity: 1,
            summary: "Board id, versions, status word and feature flags",
            handler: status,
        },
    ]
}

fn open(args: &Args<'_>, driver: &dyn NtcanDriver) -> CommandResult<Value> {
    let params = OpenParams {
        net: args.int32(0, "net")?,
        mode: args.uint32(1, "mode")?,
        tx_queue: args.int32(2, "txqueuesize")?,
        rx_queue: args.int32(3, "rxqueuesize")?,
        tx_timeout: args.int32(4, "txtimeout")?,
        rx_timeout: args.int32(5, "rxtimeout")?,
    };
    let handle = driver.open(params).map_err(failed(driver))?;
    tracing::debug!(net = params.net, %handle, "channel opened");
    Ok(Value::Int(handle.0))
}

fn close(args: &Args<'_>, driver: &dyn NtcanDriver) -> CommandResult<Value> {
    let handle = args.handle(0)?;
    driver.close(handle).map_err(failed(driver))?;
    Ok(Value::Empty)
}

fn status(args: &Args<'_>, driver: &dyn NtcanDriver) -> CommandResult<Value> {
    let handle = args.handle(0)?;
    let status = driver.status(handle).map_err(failed(driver))?;
    Ok(Value::Text(report::status_text(&status)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ntcan_driver::{IfStatus, MockDriver};

    use crate::error::CommandError;
    use crate::registry::CommandRegistry;

    fn words(items: &[&str]) -> Vec<Value> {
        items.iter().map(|s| Value::from(*s)).collect()
    }

    fn mock() -> MockDriver {
        MockDriver::with_net(
            0,
            IfStatus {
                hardware: 0x1000,
                firmware: 0x1004,
                driver: 0x3A0B,
                dll: 0x4D2E,
                boardstatus: 0,
                boardid: "CAN-USB/2".into(),
                features: 0x0B4A,
            },
        )
    }

    #[test]
    fn open_close_roundtrip() {
        let reg = CommandRegistry::with_defaults();
        let mock = mock();

        let handle = reg
            .dispatch("ntcan::Open", &words(&["0", "0", "100", "100", "1000", "1000"]), &mock)
            .unwrap();
        assert_eq!(handle, Value::Int(1));
        assert_eq!(mock.open_handles().len(), 1);

        let closed = reg.dispatch("ntcan::Close", &[handle], &mock).unwrap();
        assert!(closed.is_empty());
        assert!(mock.open_handles().is_empty());
    }

    #[test]
    fn open_unknown_net_is_driver_error() {
        let reg = CommandRegistry::with_defaults();
        let mock = mock();
        let err = reg
            .dispatch("ntcan::Open", &words(&["7", "0", "1", "1", "0", "0"]), &mock)
            .unwrap_err();
        assert!(matches!(err, CommandError::Driver { call: "canOpen", .. }));
        assert!(err.to_string().starts_with("NTCAN canOpen() failed with error: 67 / "));
    }

    #[test]
    fn open_rejects_non_numeric_before_driver() {
        let reg = CommandRegistry::with_defaults();
        let mock = mock();
        let err = reg
            .dispatch("ntcan::Open", &words(&["0", "0", "many", "1", "0", "0"]), &mock)
            .unwrap_err();
        assert!(matches!(
            err,
            CommandError::InvalidArgument {
                name: "txqueuesize",
                ..
            }
        ));
        assert_eq!(mock.call_count(), 0);
    }

    #[test]
    fn status_text_of_open_channel() {
        let reg = CommandRegistry::with_defaults();
        let mock = mock();
        let handle = reg
            .dispatch("Open", &words(&["0", "0", "1", "1", "0", "0"]), &mock)
            .unwrap();
        let text = reg.dispatch("Status", &[handle], &mock).unwrap();
        assert_eq!(
            text.to_string(),
            "ID=CAN-USB/2\nDll=4.D.2E\nDrv=3.A.0B\nFW=1.0.04\nHW=1.0.00\nStatus=00000000\nFeatures=0b4a"
        );
    }

    #[test]
    fn close_stale_handle_fails() {
        let reg = CommandRegistry::with_defaults();
        let mock = mock();
        let err = reg.dispatch("Close", &[Value::Int(42)], &mock).unwrap_err();
        assert!(matches!(err, CommandError::Driver { call: "canClose", .. }));
    }
}
