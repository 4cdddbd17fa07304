//! Single frame read and write, classic and CAN-FD.
//!
//! Reads return `{id flags datasize data}` where `flags` is the upper nibble
//! of the `len` field. Writes take `mode` as the flag bits to OR into `len`.

use ntcan_driver::types::{LEN_FLAGS_MASK, MAX_CLASSIC_DATA, MAX_FD_DATA};
use ntcan_driver::{CanMsg, CanMsgX, NtcanDriver, NtcanError, calls};

use super::failed;
use crate::args::Args;
use crate::error::{CommandError, CommandResult};
use crate::registry::CommandSpec;
use crate::value::Value;

pub fn commands() -> Vec<CommandSpec> {
    vec![
        CommandSpec {
            name: "Read",
            usage: "handle",
            arity: 1,
            summary: "Receive one classic CAN frame as {id flags datasize data}",
            handler: read,
        },
        CommandSpec {
            name: "Write",
            usage: "handle id mode data",
            arity: 4,
            summary: "Transmit one classic CAN frame (at most 8 data bytes)",
            handler: write,
        },
        CommandSpec {
            name: "ReadX",
            usage: "handle",
            arity: 1,
            summary: "Receive one CAN-FD capable frame as {id flags datasize data}",
            handler: read_x,
        },
        CommandSpec {
            name: "WriteX",
            usage: "handle id mode data",
            arity: 4,
            summary: "Transmit one CAN-FD capable frame (at most 64 data bytes)",
            handler: write_x,
        },
    ]
}

fn frame_value(id: i32, len: u8, payload: &[u8]) -> Value {
    Value::List(vec![
        id.into(),
        (len & LEN_FLAGS_MASK).into(),
        Value::Int(payload.len() as i64),
        Value::Bytes(payload.to_vec()),
    ])
}

fn read_failed(err: NtcanError, driver: &dyn NtcanDriver) -> CommandError {
    if err.is_rx_timeout() {
        CommandError::Timeout { call: err.call }
    } else {
        CommandError::driver(err, driver)
    }
}

fn read(args: &Args<'_>, driver: &dyn NtcanDriver) -> CommandResult<Value> {
    let handle = args.handle(0)?;
    let msg = driver
        .read(handle)
        .map_err(|err| read_failed(err, driver))?;
    tracing::trace!(%handle, id = msg.id, len = msg.len, "frame received");
    Ok(frame_value(msg.id, msg.len, msg.payload()))
}

fn read_x(args: &Args<'_>, driver: &dyn NtcanDriver) -> CommandResult<Value> {
    let handle = args.handle(0)?;
    let msg = driver
        .read_x(handle)
        .map_err(|err| read_failed(err, driver))?;
    tracing::trace!(%handle, id = msg.id, len = msg.len, "fd frame received");
    Ok(frame_value(msg.id, msg.len, msg.payload()))
}

fn write(args: &Args<'_>, driver: &dyn NtcanDriver) -> CommandResult<Value> {
    let handle = args.handle(0)?;
    let id = args.int32(1, "id")?;
    let mode = args.int32(2, "mode")?;
    let data = args.bytes(3, "data")?;

    // Only the low byte of mode fits in `len`.
    let msg = CanMsg::new(id, mode as u8, &data).ok_or(CommandError::LengthExceeded {
        call: calls::WRITE,
        max: MAX_CLASSIC_DATA,
    })?;
    driver.write(handle, &msg).map_err(failed(driver))?;
    Ok(Value::Empty)
}

fn write_x(args: &Args<'_>, driver: &dyn NtcanDriver) -> CommandResult<Value> {
    let handle = args.handle(0)?;
    let id = args.int32(1, "id")?;
    let mode = args.int32(2, "mode")?;
    let data = args.bytes(3, "data")?;

    let msg = CanMsgX::new(id, mode as u8, &data).ok_or(CommandError::LengthExceeded {
        call: calls::WRITE_X,
        max: MAX_FD_DATA,
    })?;
    driver.write_x(handle, &msg).map_err(failed(driver))?;
    Ok(Value::Empty)
}
