//! Shared test harness for E2E integration tests.
//!
//! Wires the command registry and the shell session to one `MockDriver`,
//! so tests can drive commands and then inspect the simulated hardware.

#![allow(dead_code)]

use std::sync::Arc;

use ntcan_commands::{CommandRegistry, CommandResult, Value};
use ntcan_driver::{Handle, IfStatus, MockDriver, ResultCode};
use ntcan_shell::session::{self, Session, Summary};

/// Status of the CAN-USB/2 used across tests.
pub fn usb2_status() -> IfStatus {
    IfStatus {
        hardware: 0x1000,
        firmware: 0x1004,
        driver: 0x3A0B,
        dll: 0x4D2E,
        boardstatus: 0,
        boardid: "CAN-USB/2".into(),
        features: 0x0B4A,
    }
}

/// Registry plus mock driver.
pub struct TestHarness {
    pub registry: CommandRegistry,
    pub mock: Arc<MockDriver>,
}

impl TestHarness {
    /// No nets: every open fails.
    pub fn empty() -> Self {
        Self {
            registry: CommandRegistry::with_defaults(),
            mock: Arc::new(MockDriver::new()),
        }
    }

    /// Net 0 is a healthy CAN-USB/2, net 5 answers `canStatus` with an error.
    pub fn with_sample_nets() -> Self {
        let h = Self::empty();
        h.mock.add_net(0, usb2_status());
        h.mock
            .add_net_with_status_error(5, ResultCode::INVALID_FIRMWARE);
        h
    }

    /// Dispatch a command with word arguments.
    pub fn run(&self, name: &str, words: &[&str]) -> CommandResult<Value> {
        let args: Vec<Value> = words.iter().map(|w| Value::from(*w)).collect();
        self.registry.dispatch(name, &args, self.mock.as_ref())
    }

    /// Open `net` through `ntcan::Open` and forget the calls made so far.
    pub fn open(&self, net: i32) -> Handle {
        let net = net.to_string();
        let handle = self
            .run("ntcan::Open", &[&net, "0", "16", "16", "100", "100"])
            .unwrap()
            .as_int()
            .unwrap();
        self.mock.clear_calls();
        Handle(handle)
    }

    /// A shell session over the same mock.
    pub fn session(&self, json: bool) -> Arc<Session> {
        Arc::new(Session::new(
            CommandRegistry::with_defaults(),
            self.mock.clone(),
            json,
        ))
    }

    /// Feed `script` through a session, returning (stdout, stderr, summary).
    pub async fn run_script(
        &self,
        script: &str,
        json: bool,
        stop_on_error: bool,
    ) -> (String, String, Summary) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let summary = session::run(
            self.session(json),
            script.as_bytes(),
            &mut out,
            &mut err,
            stop_on_error,
        )
        .await
        .unwrap();
        (
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
            summary,
        )
    }
}
