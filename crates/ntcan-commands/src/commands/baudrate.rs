//! Bit rate configuration, classic and CAN-FD.

use ntcan_driver::{BaudrateX, NtcanDriver};

use super::failed;
use crate::args::Args;
use crate::error::CommandResult;
use crate::registry::CommandSpec;
use crate::value::Value;

pub fn commands() -> Vec<CommandSpec> {
    vec![
        CommandSpec {
            name: "SetBaudrate",
            usage: "handle baudrate",
            arity: 2,
            summary: "Set the classic CAN bit rate (table index or custom value)",
            handler: set_baudrate,
        },
        CommandSpec {
            name: "GetBaudrate",
            usage: "handle",
            arity: 1,
            summary: "Get the classic CAN bit rate",
            handler: get_baudrate,
        },
        CommandSpec {
            name: "SetBaudrateX",
            usage: "handle mode flags nominalBaudrate dataBaudrate",
            arity: 5,
            summary: "Set the CAN-FD nominal and data phase bit rates (index encoded)",
            handler: set_baudrate_x,
        },
        CommandSpec {
            name: "GetBaudrateX",
            usage: "handle",
            arity: 1,
            summary: "Get the CAN-FD bit rate as {mode flags nominal data}",
            handler: get_baudrate_x,
        },
    ]
}

fn set_baudrate(args: &Args<'_>, driver: &dyn NtcanDriver) -> CommandResult<Value> {
    let handle = args.handle(0)?;
    let baud = args.uint32(1, "baudrate")?;
    driver.set_baudrate(handle, baud).map_err(failed(driver))?;
    Ok(Value::Empty)
}

fn get_baudrate(args: &Args<'_>, driver: &dyn NtcanDriver) -> CommandResult<Value> {
    let handle = args.handle(0)?;
    let baud = driver.get_baudrate(handle).map_err(failed(driver))?;
    Ok(baud.into())
}

fn set_baudrate_x(args: &Args<'_>, driver: &dyn NtcanDriver) -> CommandResult<Value> {
    let handle = args.handle(0)?;
    let baud = BaudrateX {
        mode: args.uint16(1, "mode")?,
        flags: args.uint16(2, "flags")?,
        nominal: args.uint32(3, "nominalBaudrate")?,
        data: args.uint32(4, "dataBaudrate")?,
    };
    driver.set_baudrate_x(handle, &baud).map_err(failed(driver))?;
    Ok(Value::Empty)
}

fn get_baudrate_x(args: &Args<'_>, driver: &dyn NtcanDriver) -> CommandResult<Value> {
    let handle = args.handle(0)?;
    let baud = driver.get_baudrate_x(handle).map_err(failed(driver))?;
    Ok(Value::List(vec![
        baud.mode.into(),
        baud.flags.into(),
        baud.nominal.into(),
        baud.data.into(),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ntcan_driver::{Handle, IfStatus, MockDriver, OpenParams, ResultCode};

    use crate::error::CommandError;
    use crate::registry::CommandRegistry;

    fn open() -> (MockDriver, Handle) {
        let mock = MockDriver::with_net(0, IfStatus::default());
        let handle = mock.open(OpenParams::probe(0)).unwrap();
        mock.clear_calls();
        (mock, handle)
    }

    #[test]
    fn classic_baudrate_roundtrip() {
        let reg = CommandRegistry::with_defaults();
        let (mock, h) = open();
        reg.dispatch("SetBaudrate", &[Value::Int(h.0), Value::from("0x2")], &mock)
            .unwrap();
        let baud = reg.dispatch("GetBaudrate", &[Value::Int(h.0)], &mock).unwrap();
        assert_eq!(baud, Value::Int(2));
        assert_eq!(mock.calls(), vec!["canSetBaudrate", "canGetBaudrate"]);
    }

    #[test]
    fn baudrate_x_roundtrip_keeps_order() {
        let reg = CommandRegistry::with_defaults();
        let (mock, h) = open();
        let args = [
            Value::Int(h.0),
            Value::Int(1),
            Value::Int(0x10),
            Value::Int(2),
            Value::Int(7),
        ];
        reg.dispatch("ntcan::SetBaudrateX", &args, &mock).unwrap();
        let got = reg
            .dispatch("ntcan::GetBaudrateX", &[Value::Int(h.0)], &mock)
            .unwrap();
        assert_eq!(
            got,
            Value::List(vec![Value::Int(1), Value::Int(0x10), Value::Int(2), Value::Int(7)])
        );
        assert_eq!(got.to_string(), "1 16 2 7");
    }

    #[test]
    fn baudrate_x_mode_must_fit_16_bits() {
        let reg = CommandRegistry::with_defaults();
        let (mock, h) = open();
        let args = [
            Value::Int(h.0),
            Value::Int(0x1_0000),
            Value::Int(0),
            Value::Int(0),
            Value::Int(0),
        ];
        let err = reg.dispatch("SetBaudrateX", &args, &mock).unwrap_err();
        assert!(matches!(err, CommandError::InvalidArgument { name: "mode", .. }));
        assert_eq!(mock.call_count(), 0);
    }

    #[test]
    fn driver_failure_is_reported_with_call_name() {
        let reg = CommandRegistry::with_defaults();
        let (mock, h) = open();
        mock.fail_next("canGetBaudrate", ResultCode::NOT_SUPPORTED);
        let err = reg.dispatch("GetBaudrate", &[Value::Int(h.0)], &mock).unwrap_err();
        assert!(
            err.to_string()
                .starts_with("NTCAN canGetBaudrate() failed with error: -536870890 / ")
        );
    }
}
