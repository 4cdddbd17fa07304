//! Commands backed by `canIoctl`.

use ntcan_driver::{Handle, NtcanDriver, NtcanResult};

use super::failed;
use crate::args::Args;
use crate::error::CommandResult;
use crate::registry::CommandSpec;
use crate::value::Value;

pub fn commands() -> Vec<CommandSpec> {
    vec![
        CommandSpec {
            name: "FlushRxFifo",
            usage: "handle",
            arity: 1,
            summary: "Discard all frames in the receive FIFO",
            handler: flush_rx_fifo,
        },
        CommandSpec {
            name: "GetRxMsgCount",
            usage: "handle",
            arity: 1,
            summary: "Number of frames waiting in the receive FIFO",
            handler: rx_msg_count,
        },
        CommandSpec {
            name: "GetTxMsgCount",
            usage: "handle",
            arity: 1,
            summary: "Number of frames waiting in the transmit queue",
            handler: tx_msg_count,
        },
        CommandSpec {
            name: "GetRxTimeout",
            usage: "handle",
            arity: 1,
            summary: "Receive timeout in milliseconds",
            handler: rx_timeout,
        },
        CommandSpec {
            name: "GetTxTimeout",
            usage: "handle",
            arity: 1,
            summary: "Transmit timeout in milliseconds",
            handler: tx_timeout,
        },
        CommandSpec {
            name: "SetRxTimeout",
            usage: "handle timeout",
            arity: 2,
            summary: "Set the receive timeout in milliseconds",
            handler: set_rx_timeout,
        },
        CommandSpec {
            name: "SetTxTimeout",
            usage: "handle timeout",
            arity: 2,
            summary: "Set the transmit timeout in milliseconds",
            handler: set_tx_timeout,
        },
        CommandSpec {
            name: "AbortRx",
            usage: "handle",
            arity: 1,
            summary: "Abort pending receive calls on the handle",
            handler: abort_rx,
        },
        CommandSpec {
            name: "AbortTx",
            usage: "handle",
            arity: 1,
            summary: "Abort pending transmit calls on the handle",
            handler: abort_tx,
        },
        CommandSpec {
            name: "GetBusStatistic",
            usage: "handle",
            arity: 1,
            summary: "Overrun and error frame counters as {ctrl_ovr fifo_ovr err_frames aborted_frames}",
            handler: bus_statistic,
        },
        CommandSpec {
            name: "GetCtrlStatus",
            usage: "handle",
            arity: 1,
            summary: "Controller state as {rcv_err xmit_err status type}",
            handler: ctrl_status,
        },
    ]
}

// ── Helpers ─────────────────────────────────────────────────────

fn unit(
    args: &Args<'_>,
    driver: &dyn NtcanDriver,
    op: fn(&dyn NtcanDriver, Handle) -> NtcanResult<()>,
) -> CommandResult<Value> {
    let handle = args.handle(0)?;
    op(driver, handle).map_err(failed(driver))?;
    Ok(Value::Empty)
}

fn counter(
    args: &Args<'_>,
    driver: &dyn NtcanDriver,
    op: fn(&dyn NtcanDriver, Handle) -> NtcanResult<u32>,
) -> CommandResult<Value> {
    let handle = args.handle(0)?;
    let value = op(driver, handle).map_err(failed(driver))?;
    Ok(value.into())
}

fn setter(
    args: &Args<'_>,
    driver: &dyn NtcanDriver,
    op: fn(&dyn NtcanDriver, Handle, u32) -> NtcanResult<()>,
) -> CommandResult<Value> {
    let handle = args.handle(0)?;
    let timeout = args.uint32(1, "timeout")?;
    op(driver, handle, timeout).map_err(failed(driver))?;
    Ok(Value::Empty)
}

// ── Handlers ────────────────────────────────────────────────────

fn flush_rx_fifo(args: &Args<'_>, driver: &dyn NtcanDriver) -> CommandResult<Value> {
    unit(args, driver, |d, h| d.flush_rx_fifo(h))
}

fn abort_rx(args: &Args<'_>, driver: &dyn NtcanDriver) -> CommandResult<Value> {
    unit(args, driver, |d, h| d.abort_rx(h))
}

fn abort_tx(args: &Args<'_>, driver: &dyn NtcanDriver) -> CommandResult<Value> {
    unit(args, driver, |d, h| d.abort_tx(h))
}

fn rx_msg_count(args: &Args<'_>, driver: &dyn NtcanDriver) -> CommandResult<Value> {
    counter(args, driver, |d, h| d.rx_msg_count(h))
}

fn tx_msg_count(args: &Args<'_>, driver: &dyn NtcanDriver) -> CommandResult<Value> {
    counter(args, driver, |d, h| d.tx_msg_count(h))
}

fn rx_timeout(args: &Args<'_>, driver: &dyn NtcanDriver) -> CommandResult<Value> {
    counter(args, driver, |d, h| d.rx_timeout(h))
}

fn tx_timeout(args: &Args<'_>, driver: &dyn NtcanDriver) -> CommandResult<Value> {
    counter(args, driver, |d, h| d.tx_timeout(h))
}

fn set_rx_timeout(args: &Args<'_>, driver: &dyn NtcanDriver) -> CommandResult<Value> {
    setter(args, driver, |d, h, ms| d.set_rx_timeout(h, ms))
}

fn set_tx_timeout(args: &Args<'_>, driver: &dyn NtcanDriver) -> CommandResult<Value> {
    setter(args, driver, |d, h, ms| d.set_tx_timeout(h, ms))
}

fn bus_statistic(args: &Args<'_>, driver: &dyn NtcanDriver) -> CommandResult<Value> {
    let handle = args.handle(0)?;
    let stats = driver.bus_statistic(handle).map_err(failed(driver))?;
    Ok(Value::List(vec![
        stats.ctrl_ovr.into(),
        stats.fifo_ovr.into(),
        stats.err_frames.into(),
        stats.aborted_frames.into(),
    ]))
}

fn ctrl_status(args: &Args<'_>, driver: &dyn NtcanDriver) -> CommandResult<Value> {
    let handle = args.handle(0)?;
    let ctrl = driver.ctrl_status(handle).map_err(failed(driver))?;
    Ok(Value::List(vec![
        ctrl.rcv_err_counter.into(),
        ctrl.xmit_err_counter.into(),
        ctrl.status.into(),
        ctrl.controller_type.into(),
    ]))
}
