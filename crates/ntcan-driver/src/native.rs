//! Native backend: links the vendor `ntcan` library.
//!
//! Struct layouts and ioctl numbers mirror `ntcan.h`. Each trait method
//! issues exactly one FFI call.

use std::ffi::{CStr, c_char, c_void};
use std::ptr;

use crate::codes::ResultCode;
use crate::driver::{NtcanDriver, calls};
use crate::error::{NtcanResult, check};
use crate::types::{
    BaudrateX, BusStatistic, CanMsg, CanMsgX, CtrlState, Handle, IfStatus, MAX_CLASSIC_DATA,
    MAX_FD_DATA, OpenParams,
};

#[cfg(windows)]
type RawHandle = isize;
#[cfg(not(windows))]
type RawHandle = i32;

type RawResult = u32;

const IOCTL_FLUSH_RX_FIFO: u32 = 0x0001;
const IOCTL_GET_RX_MSG_COUNT: u32 = 0x0002;
const IOCTL_GET_RX_TIMEOUT: u32 = 0x0003;
const IOCTL_GET_TX_TIMEOUT: u32 = 0x0004;
const IOCTL_ABORT_RX: u32 = 0x0009;
const IOCTL_ABORT_TX: u32 = 0x000A;
const IOCTL_SET_RX_TIMEOUT: u32 = 0x000B;
const IOCTL_SET_TX_TIMEOUT: u32 = 0x000C;
const IOCTL_GET_BUS_STATISTIC: u32 = 0x0018;
const IOCTL_GET_CTRL_STATUS: u32 = 0x0019;
const IOCTL_GET_TX_MSG_COUNT: u32 = 0x0024;

const ERROR_FORMAT_LONG: u32 = 0;
const ERROR_TEXT_LEN: usize = 1000;

#[repr(C)]
#[derive(Default)]
#[allow(dead_code)]
struct RawCmsg {
    id: i32,
    len: u8,
    msg_lost: u8,
    reserved: [u8; 2],
    data: [u8; MAX_CLASSIC_DATA],
}

#[repr(C)]
#[allow(dead_code)]
struct RawCmsgX {
    id: i32,
    len: u8,
    msg_lost: u8,
    reserved: [u8; 1],
    esi: u8,
    data: [u8; MAX_FD_DATA],
}

impl Default for RawCmsgX {
    fn default() -> Self {
        Self {
            id: 0,
            len: 0,
            msg_lost: 0,
            reserved: [0; 1],
            esi: 0,
            data: [0; MAX_FD_DATA],
        }
    }
}

/// `NTCAN_BAUDRATE_CFG`; only the rate-index member of the union is used.
#[repr(C)]
#[derive(Default, Clone, Copy)]
#[allow(dead_code)]
struct RawBaudrateCfg {
    idx: u32,
    reserved: u32,
}

#[repr(C)]
#[derive(Default)]
#[allow(dead_code)]
struct RawBaudrateX {
    mode: u16,
    flags: u16,
    reserved: u32,
    arb: RawBaudrateCfg,
    data: RawBaudrateCfg,
}

#[repr(C)]
#[derive(Default, Clone, Copy)]
struct RawFrameCount {
    std_data: u32,
    std_rtr: u32,
    ext_data: u32,
    ext_rtr: u32,
}

impl RawFrameCount {
    fn total(self) -> u32 {
        self.std_data
            .wrapping_add(self.std_rtr)
            .wrapping_add(self.ext_data)
            .wrapping_add(self.ext_rtr)
    }
}

#[repr(C)]
#[derive(Default)]
#[allow(dead_code)]
struct RawBusStatistic {
    timestamp: u64,
    rcv_count: RawFrameCount,
    xmit_count: RawFrameCount,
    ctrl_ovr: u32,
    fifo_ovr: u32,
    err_frames: u32,
    rcv_byte_count: u32,
    xmit_byte_count: u32,
    aborted_frames: u32,
    reserved: [u32; 2],
    bit_count: u64,
}

#[repr(C)]
#[derive(Default)]
struct RawCtrlState {
    rcv_err_counter: u8,
    xmit_err_counter: u8,
    status: u8,
    kind: u8,
}

#[repr(C)]
#[derive(Default)]
#[allow(dead_code)]
struct RawIfStatus {
    hardware: u16,
    firmware: u16,
    driver: u16,
    dll: u16,
    boardstatus: u32,
    boardid: [u8; 14],
    features: u16,
}

#[link(name = "ntcan")]
unsafe extern "system" {
    fn canOpen(
        net: i32,
        flags: u32,
        txqueuesize: i32,
        rxqueuesize: i32,
        txtimeout: i32,
        rxtimeout: i32,
        handle: *mut RawHandle,
    ) -> RawResult;
    fn canClose(handle: RawHandle) -> RawResult;
    fn canSetBaudrate(handle: RawHandle, baud: u32) -> RawResult;
    fn canGetBaudrate(handle: RawHandle, baud: *mut u32) -> RawResult;
    fn canSetBaudrateX(handle: RawHandle, baud: *mut RawBaudrateX) -> RawResult;
    fn canGetBaudrateX(handle: RawHandle, baud: *mut RawBaudrateX) -> RawResult;
    fn canIdAdd(handle: RawHandle, id: i32) -> RawResult;
    fn canIdDelete(handle: RawHandle, id: i32) -> RawResult;
    fn canIdRegionAdd(handle: RawHandle, id_start: i32, id_cnt: *mut i32) -> RawResult;
    fn canIdRegionDelete(handle: RawHandle, id_start: i32, id_cnt: *mut i32) -> RawResult;
    fn canIoctl(handle: RawHandle, cmd: u32, arg: *mut c_void) -> RawResult;
    fn canRead(
        handle: RawHandle,
        cmsg: *mut RawCmsg,
        len: *mut i32,
        overlapped: *mut c_void,
    ) -> RawResult;
    fn canWrite(
        handle: RawHandle,
        cmsg: *mut RawCmsg,
        len: *mut i32,
        overlapped: *mut c_void,
    ) -> RawResult;
    fn canReadX(
        handle: RawHandle,
        cmsg: *mut RawCmsgX,
        len: *mut i32,
        overlapped: *mut c_void,
    ) -> RawResult;
    fn canWriteX(
        handle: RawHandle,
        cmsg: *mut RawCmsgX,
        len: *mut i32,
        overlapped: *mut c_void,
    ) -> RawResult;
    fn canStatus(handle: RawHandle, status: *mut RawIfStatus) -> RawResult;
    fn canFormatError(error: RawResult, kind: u32, buf: *mut c_char, bufsize: u32) -> RawResult;
}

fn raw(handle: Handle) -> RawHandle {
    handle.0 as RawHandle
}

fn code(ret: RawResult) -> ResultCode {
    ResultCode(ret)
}

/// Driver backed by the installed NTCAN library.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeDriver;

impl NativeDriver {
    pub fn new() -> Self {
        Self
    }

    fn ioctl<T>(&self, handle: Handle, cmd: u32, arg: Option<&mut T>) -> NtcanResult<()> {
        let arg = arg.map_or(ptr::null_mut(), |a| (a as *mut T).cast::<c_void>());
        tracing::trace!(%handle, cmd, "canIoctl");
        // SAFETY: `arg` is null or points to a live value of the type the
        // vendor documents for `cmd`.
        let ret = unsafe { canIoctl(raw(handle), cmd, arg) };
        check(calls::IOCTL, code(ret))
    }

    fn ioctl_get_u32(&self, handle: Handle, cmd: u32) -> NtcanResult<u32> {
        let mut value = 0u32;
        self.ioctl(handle, cmd, Some(&mut value))?;
        Ok(value)
    }
}

impl NtcanDriver for NativeDriver {
    fn open(&self, params: OpenParams) -> NtcanResult<Handle> {
        let mut handle: RawHandle = 0;
        tracing::trace!(net = params.net, mode = params.mode, "canOpen");
        // SAFETY: `handle` outlives the call.
        let ret = unsafe {
            canOpen(
                params.net,
                params.mode,
                params.tx_queue,
                params.rx_queue,
                params.tx_timeout,
                params.rx_timeout,
                &mut handle,
            )
        };
        check(calls::OPEN, code(ret))?;
        Ok(Handle(handle as i64))
    }

    fn close(&self, handle: Handle) -> NtcanResult<()> {
        // SAFETY: plain value arguments.
        let ret = unsafe { canClose(raw(handle)) };
        check(calls::CLOSE, code(ret))
    }

    fn set_baudrate(&self, handle: Handle, baud: u32) -> NtcanResult<()> {
        // SAFETY: plain value arguments.
        let ret = unsafe { canSetBaudrate(raw(handle), baud) };
        check(calls::SET_BAUDRATE, code(ret))
    }

    fn get_baudrate(&self, handle: Handle) -> NtcanResult<u32> {
        let mut baud = 0u32;
        // SAFETY: `baud` outlives the call.
        let ret = unsafe { canGetBaudrate(raw(handle), &mut baud) };
        check(calls::GET_BAUDRATE, code(ret))?;
        Ok(baud)
    }

    fn set_baudrate_x(&self, handle: Handle, baud: &BaudrateX) -> NtcanResult<()> {
        let mut cfg = RawBaudrateX {
            mode: baud.mode,
            flags: baud.flags,
            arb: RawBaudrateCfg {
                idx: baud.nominal,
                reserved: 0,
            },
            data: RawBaudrateCfg {
                idx: baud.data,
                reserved: 0,
            },
            ..Default::default()
        };
        // SAFETY: `cfg` outlives the call.
        let ret = unsafe { canSetBaudrateX(raw(handle), &mut cfg) };
        check(calls::SET_BAUDRATE_X, code(ret))
    }

    fn get_baudrate_x(&self, handle: Handle) -> NtcanResult<BaudrateX> {
        let mut cfg = RawBaudrateX::default();
        // SAFETY: `cfg` outlives the call.
        let ret = unsafe { canGetBaudrateX(raw(handle), &mut cfg) };
        check(calls::GET_BAUDRATE_X, code(ret))?;
        Ok(BaudrateX {
            mode: cfg.mode,
            flags: cfg.flags,
            nominal: cfg.arb.idx,
            data: cfg.data.idx,
        })
    }

    fn id_add(&self, handle: Handle, id: i32) -> NtcanResult<()> {
        // SAFETY: plain value arguments.
        let ret = unsafe { canIdAdd(raw(handle), id) };
        check(calls::ID_ADD, code(ret))
    }

    fn id_delete(&self, handle: Handle, id: i32) -> NtcanResult<()> {
        // SAFETY: plain value arguments.
        let ret = unsafe { canIdDelete(raw(handle), id) };
        check(calls::ID_DELETE, code(ret))
    }

    fn id_region_add(&self, handle: Handle, start: i32, count: i32) -> NtcanResult<i32> {
        let mut granted = count;
        // SAFETY: `granted` outlives the call.
        let ret = unsafe { canIdRegionAdd(raw(handle), start, &mut granted) };
        check(calls::ID_REGION_ADD, code(ret))?;
        Ok(granted)
    }

    fn id_region_delete(&self, handle: Handle, start: i32, count: i32) -> NtcanResult<i32> {
        let mut granted = count;
        // SAFETY: `granted` outlives the call.
        let ret = unsafe { canIdRegionDelete(raw(handle), start, &mut granted) };
        check(calls::ID_REGION_DELETE, code(ret))?;
        Ok(granted)
    }

    fn flush_rx_fifo(&self, handle: Handle) -> NtcanResult<()> {
        self.ioctl::<()>(handle, IOCTL_FLUSH_RX_FIFO, None)
    }

    fn rx_msg_count(&self, handle: Handle) -> NtcanResult<u32> {
        self.ioctl_get_u32(handle, IOCTL_GET_RX_MSG_COUNT)
    }

    fn tx_msg_count(&self, handle: Handle) -> NtcanResult<u32> {
        self.ioctl_get_u32(handle, IOCTL_GET_TX_MSG_COUNT)
    }

    fn rx_timeout(&self, handle: Handle) -> NtcanResult<u32> {
        self.ioctl_get_u32(handle, IOCTL_GET_RX_TIMEOUT)
    }

    fn tx_timeout(&self, handle: Handle) -> NtcanResult<u32> {
        self.ioctl_get_u32(handle, IOCTL_GET_TX_TIMEOUT)
    }

    fn set_rx_timeout(&self, handle: Handle, timeout_ms: u32) -> NtcanResult<()> {
        let mut value = timeout_ms;
        self.ioctl(handle, IOCTL_SET_RX_TIMEOUT, Some(&mut value))
    }

    fn set_tx_timeout(&self, handle: Handle, timeout_ms: u32) -> NtcanResult<()> {
        let mut value = timeout_ms;
        self.ioctl(handle, IOCTL_SET_TX_TIMEOUT, Some(&mut value))
    }

    fn abort_rx(&self, handle: Handle) -> NtcanResult<()> {
        self.ioctl::<()>(handle, IOCTL_ABORT_RX, None)
    }

    fn abort_tx(&self, handle: Handle) -> NtcanResult<()> {
        self.ioctl::<()>(handle, IOCTL_ABORT_TX, None)
    }

    fn bus_statistic(&self, handle: Handle) -> NtcanResult<BusStatistic> {
        let mut stat = RawBusStatistic::default();
        self.ioctl(handle, IOCTL_GET_BUS_STATISTIC, Some(&mut stat))?;
        Ok(BusStatistic {
            rcv_count: stat.rcv_count.total(),
            xmit_count: stat.xmit_count.total(),
            ctrl_ovr: stat.ctrl_ovr,
            fifo_ovr: stat.fifo_ovr,
            err_frames: stat.err_frames,
            aborted_frames: stat.aborted_frames,
        })
    }

    fn ctrl_status(&self, handle: Handle) -> NtcanResult<CtrlState> {
        let mut state = RawCtrlState::default();
        self.ioctl(handle, IOCTL_GET_CTRL_STATUS, Some(&mut state))?;
        Ok(CtrlState {
            rcv_err_counter: state.rcv_err_counter,
            xmit_err_counter: state.xmit_err_counter,
            status: state.status,
            controller_type: state.kind,
        })
    }

    fn read(&self, handle: Handle) -> NtcanResult<CanMsg> {
        let mut msg = RawCmsg::default();
        let mut count = 1i32;
        // SAFETY: `msg` holds room for the one frame requested by `count`.
        let ret = unsafe { canRead(raw(handle), &mut msg, &mut count, ptr::null_mut()) };
        check(calls::READ, code(ret))?;
        Ok(CanMsg {
            id: msg.id,
            len: msg.len,
            data: msg.data,
        })
    }

    fn write(&self, handle: Handle, msg: &CanMsg) -> NtcanResult<()> {
        let mut raw_msg = RawCmsg {
            id: msg.id,
            len: msg.len,
            data: msg.data,
            ..Default::default()
        };
        let mut count = 1i32;
        // SAFETY: `raw_msg` holds the one frame announced by `count`.
        let ret = unsafe { canWrite(raw(handle), &mut raw_msg, &mut count, ptr::null_mut()) };
        check(calls::WRITE, code(ret))
    }

    fn read_x(&self, handle: Handle) -> NtcanResult<CanMsgX> {
        let mut msg = RawCmsgX::default();
        let mut count = 1i32;
        // SAFETY: `msg` holds room for the one frame requested by `count`.
        let ret = unsafe { canReadX(raw(handle), &mut msg, &mut count, ptr::null_mut()) };
        check(calls::READ_X, code(ret))?;
        Ok(CanMsgX {
            id: msg.id,
            len: msg.len,
            data: msg.data,
        })
    }

    fn write_x(&self, handle: Handle, msg: &CanMsgX) -> NtcanResult<()> {
        let mut raw_msg = RawCmsgX {
            id: msg.id,
            len: msg.len,
            data: msg.data,
            ..Default::default()
        };
        let mut count = 1i32;
        // SAFETY: `raw_msg` holds the one frame announced by `count`.
        let ret = unsafe { canWriteX(raw(handle), &mut raw_msg, &mut count, ptr::null_mut()) };
        check(calls::WRITE_X, code(ret))
    }

    fn status(&self, handle: Handle) -> NtcanResult<IfStatus> {
        let mut status = RawIfStatus::default();
        // SAFETY: `status` outlives the call.
        let ret = unsafe { canStatus(raw(handle), &mut status) };
        check(calls::STATUS, code(ret))?;
        let end = status
            .boardid
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(status.boardid.len());
        Ok(IfStatus {
            hardware: status.hardware,
            firmware: status.firmware,
            driver: status.driver,
            dll: status.dll,
            boardstatus: status.boardstatus,
            boardid: String::from_utf8_lossy(&status.boardid[..end]).into_owned(),
            features: status.features,
        })
    }

    fn format_error(&self, error: ResultCode) -> String {
        let mut buf = [0 as c_char; ERROR_TEXT_LEN];
        // SAFETY: `buf` is writable for `ERROR_TEXT_LEN` bytes and the
        // library NUL-terminates within that bound.
        let ret = unsafe {
            canFormatError(
                error.0,
                ERROR_FORMAT_LONG,
                buf.as_mut_ptr(),
                ERROR_TEXT_LEN as u32,
            )
        };
        if !code(ret).is_success() {
            return error.describe().to_string();
        }
        // SAFETY: see above, the buffer holds a NUL-terminated string.
        unsafe { CStr::from_ptr(buf.as_ptr()) }
            .to_string_lossy()
            .into_owned()
    }
}
