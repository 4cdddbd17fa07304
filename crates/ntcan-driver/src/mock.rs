//! Mock NTCAN driver for testing and hardware-free sessions.
//!
//! Simulates nets, per-handle channel state and receive queues in memory.
//! Every call is recorded so tests can assert exactly which vendor entry
//! points were (or were not) reached.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::codes::ResultCode;
use crate::driver::{NtcanDriver, calls};
use crate::error::{NtcanError, NtcanResult};
use crate::types::{
    BaudrateX, BusStatistic, CanMsg, CanMsgX, CtrlState, Handle, IfStatus, OpenParams,
};

/// Baud rate index a freshly opened channel reports (1 MBit/s).
pub const DEFAULT_BAUDRATE: u32 = 0;

/// Most ids a single region add or delete is granted: one 11-bit id space.
pub const MAX_REGION_GRANT: i32 = 2048;

/// What `canStatus` answers for a simulated net.
#[derive(Debug, Clone)]
enum NetStatus {
    Ok(IfStatus),
    Fails(ResultCode),
}

/// Per-handle channel state.
#[derive(Debug, Default)]
struct Channel {
    net: i32,
    baud: u32,
    baud_x: BaudrateX,
    filters: BTreeSet<i32>,
    rx: VecDeque<CanMsg>,
    rx_x: VecDeque<CanMsgX>,
    sent: Vec<CanMsg>,
    sent_x: Vec<CanMsgX>,
    rx_timeout: u32,
    tx_timeout: u32,
    stats: BusStatistic,
    ctrl: CtrlState,
}

#[derive(Debug, Default)]
struct MockState {
    nets: BTreeMap<i32, NetStatus>,
    channels: HashMap<Handle, Channel>,
    next_handle: i64,
    calls: Vec<&'static str>,
    /// One-shot failures, consumed by the next matching call.
    failures: Vec<(&'static str, ResultCode)>,
    grant_limit: Option<i32>,
}

impl MockState {
    /// Record the call and consume a scripted failure for it, if any.
    fn enter(&mut self, call: &'static str) -> NtcanResult<()> {
        self.calls.push(call);
        match self.failures.iter().position(|(c, _)| *c == call) {
            Some(pos) => {
                let (_, code) = self.failures.remove(pos);
                Err(NtcanError::new(call, code))
            }
            None => Ok(()),
        }
    }

    fn channel(&mut self, call: &'static str, handle: Handle) -> NtcanResult<&mut Channel> {
        self.channels
            .get_mut(&handle)
            .ok_or(NtcanError::new(call, ResultCode::INVALID_HANDLE))
    }

    fn granted(&self, count: i32) -> i32 {
        let count = count.clamp(0, MAX_REGION_GRANT);
        self.grant_limit.map_or(count, |limit| count.min(limit))
    }
}

/// In-memory NTCAN driver.
pub struct MockDriver {
    state: Mutex<MockState>,
}

impl MockDriver {
    /// A driver with no nets: every `canOpen` fails with `NET_NOT_FOUND`.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                next_handle: 1,
                ..Default::default()
            }),
        }
    }

    /// A driver with one reachable net.
    pub fn with_net(net: i32, status: IfStatus) -> Self {
        let mock = Self::new();
        mock.add_net(net, status);
        mock
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make `net` openable; `canStatus` on it answers `status`.
    pub fn add_net(&self, net: i32, status: IfStatus) {
        self.lock().nets.insert(net, NetStatus::Ok(status));
    }

    /// Make `net` openable but let `canStatus` on it fail with `code`.
    pub fn add_net_with_status_error(&self, net: i32, code: ResultCode) {
        self.lock().nets.insert(net, NetStatus::Fails(code));
    }

    /// Fail the next invocation of `call` with `code`.
    pub fn fail_next(&self, call: &'static str, code: ResultCode) {
        self.lock().failures.push((call, code));
    }

    /// Cap how many ids a region add/delete grants.
    pub fn set_grant_limit(&self, limit: Option<i32>) {
        self.lock().grant_limit = limit;
    }

    /// Queue a classic frame for `read`. Unknown handles are ignored.
    pub fn queue_rx(&self, handle: Handle, msg: CanMsg) {
        if let Some(ch) = self.lock().channels.get_mut(&handle) {
            ch.rx.push_back(msg);
        }
    }

    /// Queue a CAN-FD frame for `read_x`. Unknown handles are ignored.
    pub fn queue_rx_x(&self, handle: Handle, msg: CanMsgX) {
        if let Some(ch) = self.lock().channels.get_mut(&handle) {
            ch.rx_x.push_back(msg);
        }
    }

    pub fn set_bus_statistic(&self, handle: Handle, stats: BusStatistic) {
        if let Some(ch) = self.lock().channels.get_mut(&handle) {
            ch.stats = stats;
        }
    }

    pub fn set_ctrl_state(&self, handle: Handle, ctrl: CtrlState) {
        if let Some(ch) = self.lock().channels.get_mut(&handle) {
            ch.ctrl = ctrl;
        }
    }

    /// Vendor calls issued so far, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Classic frames written on `handle`.
    pub fn written(&self, handle: Handle) -> Vec<CanMsg> {
        self.lock()
            .channels
            .get(&handle)
            .map(|ch| ch.sent.clone())
            .unwrap_or_default()
    }

    /// CAN-FD frames written on `handle`.
    pub fn written_x(&self, handle: Handle) -> Vec<CanMsgX> {
        self.lock()
            .channels
            .get(&handle)
            .map(|ch| ch.sent_x.clone())
            .unwrap_or_default()
    }

    /// Ids currently enabled on `handle`, ascending.
    pub fn filters(&self, handle: Handle) -> Vec<i32> {
        self.lock()
            .channels
            .get(&handle)
            .map(|ch| ch.filters.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn open_handles(&self) -> Vec<Handle> {
        let mut handles: Vec<Handle> = self.lock().channels.keys().copied().collect();
        handles.sort();
        handles
    }
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl NtcanDriver for MockDriver {
    fn open(&self, params: OpenParams) -> NtcanResult<Handle> {
        let mut state = self.lock();
        state.enter(calls::OPEN)?;
        if !state.nets.contains_key(&params.net) {
            return Err(NtcanError::new(calls::OPEN, ResultCode::NET_NOT_FOUND));
        }
        if params.tx_queue < 0 || params.rx_queue < 0 {
            return Err(NtcanError::new(calls::OPEN, ResultCode::INVALID_PARAMETER));
        }

        let handle = Handle(state.next_handle);
        state.next_handle += 1;
        state.channels.insert(
            handle,
            Channel {
                net: params.net,
                baud: DEFAULT_BAUDRATE,
                rx_timeout: params.rx_timeout.max(0) as u32,
                tx_timeout: params.tx_timeout.max(0) as u32,
                ..Default::default()
            },
        );
        Ok(handle)
    }

    fn close(&self, handle: Handle) -> NtcanResult<()> {
        let mut state = self.lock();
        state.enter(calls::CLOSE)?;
        state
            .channels
            .remove(&handle)
            .map(|_| ())
            .ok_or(NtcanError::new(calls::CLOSE, ResultCode::INVALID_HANDLE))
    }

    fn set_baudrate(&self, handle: Handle, baud: u32) -> NtcanResult<()> {
        let mut state = self.lock();
        state.enter(calls::SET_BAUDRATE)?;
        state.channel(calls::SET_BAUDRATE, handle)?.baud = baud;
        Ok(())
    }

    fn get_baudrate(&self, handle: Handle) -> NtcanResult<u32> {
        let mut state = self.lock();
        state.enter(calls::GET_BAUDRATE)?;
        Ok(state.channel(calls::GET_BAUDRATE, handle)?.baud)
    }

    fn set_baudrate_x(&self, handle: Handle, baud: &BaudrateX) -> NtcanResult<()> {
        let mut state = self.lock();
        state.enter(calls::SET_BAUDRATE_X)?;
        state.channel(calls::SET_BAUDRATE_X, handle)?.baud_x = *baud;
        Ok(())
    }

    fn get_baudrate_x(&self, handle: Handle) -> NtcanResult<BaudrateX> {
        let mut state = self.lock();
        state.enter(calls::GET_BAUDRATE_X)?;
        Ok(state.channel(calls::GET_BAUDRATE_X, handle)?.baud_x)
    }

    fn id_add(&self, handle: Handle, id: i32) -> NtcanResult<()> {
        let mut state = self.lock();
        state.enter(calls::ID_ADD)?;
        state.channel(calls::ID_ADD, handle)?.filters.insert(id);
        Ok(())
    }

    fn id_delete(&self, handle: Handle, id: i32) -> NtcanResult<()> {
        let mut state = self.lock();
        state.enter(calls::ID_DELETE)?;
        if state.channel(calls::ID_DELETE, handle)?.filters.remove(&id) {
            Ok(())
        } else {
            Err(NtcanError::new(calls::ID_DELETE, ResultCode::ID_NOT_ENABLED))
        }
    }

    fn id_region_add(&self, handle: Handle, start: i32, count: i32) -> NtcanResult<i32> {
        let mut state = self.lock();
        state.enter(calls::ID_REGION_ADD)?;
        let granted = state.granted(count);
        let channel = state.channel(calls::ID_REGION_ADD, handle)?;
        channel
            .filters
            .extend((0..granted).map(|offset| start.wrapping_add(offset)));
        Ok(granted)
    }

    fn id_region_delete(&self, handle: Handle, start: i32, count: i32) -> NtcanResult<i32> {
        let mut state = self.lock();
        state.enter(calls::ID_REGION_DELETE)?;
        let granted = state.granted(count);
        let channel = state.channel(calls::ID_REGION_DELETE, handle)?;
        for offset in 0..granted {
            channel.filters.remove(&start.wrapping_add(offset));
        }
        Ok(granted)
    }

    fn flush_rx_fifo(&self, handle: Handle) -> NtcanResult<()> {
        let mut state = self.lock();
        state.enter(calls::IOCTL)?;
        let channel = state.channel(calls::IOCTL, handle)?;
        channel.rx.clear();
        channel.rx_x.clear();
        Ok(())
    }

    fn rx_msg_count(&self, handle: Handle) -> NtcanResult<u32> {
        let mut state = self.lock();
        state.enter(calls::IOCTL)?;
        let channel = state.channel(calls::IOCTL, handle)?;
        Ok((channel.rx.len() + channel.rx_x.len()) as u32)
    }

    fn tx_msg_count(&self, handle: Handle) -> NtcanResult<u32> {
        let mut state = self.lock();
        state.enter(calls::IOCTL)?;
        // Writes complete synchronously, so nothing is ever queued.
        state.channel(calls::IOCTL, handle).map(|_| 0)
    }

    fn rx_timeout(&self, handle: Handle) -> NtcanResult<u32> {
        let mut state = self.lock();
        state.enter(calls::IOCTL)?;
        Ok(state.channel(calls::IOCTL, handle)?.rx_timeout)
    }

    fn tx_timeout(&self, handle: Handle) -> NtcanResult<u32> {
        let mut state = self.lock();
        state.enter(calls::IOCTL)?;
        Ok(state.channel(calls::IOCTL, handle)?.tx_timeout)
    }

    fn set_rx_timeout(&self, handle: Handle, timeout_ms: u32) -> NtcanResult<()> {
        let mut state = self.lock();
        state.enter(calls::IOCTL)?;
        state.channel(calls::IOCTL, handle)?.rx_timeout = timeout_ms;
        Ok(())
    }

    fn set_tx_timeout(&self, handle: Handle, timeout_ms: u32) -> NtcanResult<()> {
        let mut state = self.lock();
        state.enter(calls::IOCTL)?;
        state.channel(calls::IOCTL, handle)?.tx_timeout = timeout_ms;
        Ok(())
    }

    fn abort_rx(&self, handle: Handle) -> NtcanResult<()> {
        let mut state = self.lock();
        state.enter(calls::IOCTL)?;
        state.channel(calls::IOCTL, handle).map(|_| ())
    }

    fn abort_tx(&self, handle: Handle) -> NtcanResult<()> {
        let mut state = self.lock();
        state.enter(calls::IOCTL)?;
        state.channel(calls::IOCTL, handle).map(|_| ())
    }

    fn bus_statistic(&self, handle: Handle) -> NtcanResult<BusStatistic> {
        let mut state = self.lock();
        state.enter(calls::IOCTL)?;
        Ok(state.channel(calls::IOCTL, handle)?.stats)
    }

    fn ctrl_status(&self, handle: Handle) -> NtcanResult<CtrlState> {
        let mut state = self.lock();
        state.enter(calls::IOCTL)?;
        Ok(state.channel(calls::IOCTL, handle)?.ctrl)
    }

    fn read(&self, handle: Handle) -> NtcanResult<CanMsg> {
        let mut state = self.lock();
        state.enter(calls::READ)?;
        let channel = state.channel(calls::READ, handle)?;
        let msg = channel
            .rx
            .pop_front()
            .ok_or(NtcanError::new(calls::READ, ResultCode::RX_TIMEOUT))?;
        channel.stats.rcv_count += 1;
        Ok(msg)
    }

    fn write(&self, handle: Handle, msg: &CanMsg) -> NtcanResult<()> {
        let mut state = self.lock();
        state.enter(calls::WRITE)?;
        let channel = state.channel(calls::WRITE, handle)?;
        channel.sent.push(*msg);
        channel.stats.xmit_count += 1;
        Ok(())
    }

    fn read_x(&self, handle: Handle) -> NtcanResult<CanMsgX> {
        let mut state = self.lock();
        state.enter(calls::READ_X)?;
        let channel = state.channel(calls::READ_X, handle)?;
        let msg = channel
            .rx_x
            .pop_front()
            .ok_or(NtcanError::new(calls::READ_X, ResultCode::RX_TIMEOUT))?;
        channel.stats.rcv_count += 1;
        Ok(msg)
    }

    fn write_x(&self, handle: Handle, msg: &CanMsgX) -> NtcanResult<()> {
        let mut state = self.lock();
        state.enter(calls::WRITE_X)?;
        let channel = state.channel(calls::WRITE_X, handle)?;
        channel.sent_x.push(*msg);
        channel.stats.xmit_count += 1;
        Ok(())
    }

    fn status(&self, handle: Handle) -> NtcanResult<IfStatus> {
        let mut state = self.lock();
        state.enter(calls::STATUS)?;
        let net = state.channel(calls::STATUS, handle)?.net;
        match state.nets.get(&net) {
            Some(NetStatus::Ok(status)) => Ok(status.clone()),
            Some(NetStatus::Fails(code)) => Err(NtcanError::new(calls::STATUS, *code)),
            None => Err(NtcanError::new(calls::STATUS, ResultCode::NET_NOT_FOUND)),
        }
    }
}
