//! Shell configuration, loadable from TOML.

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use ntcan_driver::{IfStatus, MockDriver, NtcanDriver, ResultCode};

/// Which driver backend commands run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// In-memory simulation, nets from `[[mock.nets]]`.
    #[default]
    Mock,
    /// The vendor library (needs the `native` feature).
    Native,
}

/// Top-level configuration for the shell.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ShellConfig {
    #[serde(default)]
    pub backend: Backend,
    /// Print one JSON object per command instead of plain text.
    #[serde(default)]
    pub json: bool,
    /// Emit logs as JSON.
    #[serde(default)]
    pub log_json: bool,
    /// Abort a script or `-c` run at the first failing command.
    #[serde(default = "default_stop_on_error")]
    pub stop_on_error: bool,
    #[serde(default)]
    pub mock: MockConfig,
}

fn default_stop_on_error() -> bool {
    true
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            json: false,
            log_json: false,
            stop_on_error: default_stop_on_error(),
            mock: MockConfig::default(),
        }
    }
}

/// Simulated hardware for the mock backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MockConfig {
    #[serde(default)]
    pub nets: Vec<MockNetConfig>,
}

/// One simulated net.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MockNetConfig {
    pub net: i32,
    #[serde(default = "default_board_id")]
    pub board_id: String,
    #[serde(default)]
    pub hardware: u16,
    #[serde(default)]
    pub firmware: u16,
    #[serde(default)]
    pub driver: u16,
    #[serde(default)]
    pub dll: u16,
    #[serde(default)]
    pub board_status: u32,
    #[serde(default)]
    pub features: u16,
    /// When set, `canStatus` on this net fails with this raw code.
    #[serde(default)]
    pub status_error: Option<u32>,
}

fn default_board_id() -> String {
    "CAN-USB/2".to_string()
}

impl MockNetConfig {
    fn if_status(&self) -> IfStatus {
        IfStatus {
            hardware: self.hardware,
            firmware: self.firmware,
            driver: self.driver,
            dll: self.dll,
            boardstatus: self.board_status,
            boardid: self.board_id.clone(),
            features: self.features,
        }
    }
}

impl ShellConfig {
    /// Load config from a TOML file path.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Mock driver populated with the configured nets.
    pub fn build_mock(&self) -> MockDriver {
        let mock = MockDriver::new();
        for net in &self.mock.nets {
            match net.status_error {
                Some(code) => mock.add_net_with_status_error(net.net, ResultCode(code)),
                None => mock.add_net(net.net, net.if_status()),
            }
        }
        mock
    }

    /// Driver for the configured backend.
    pub fn build_driver(&self) -> anyhow::Result<Arc<dyn NtcanDriver>> {
        match self.backend {
            Backend::Mock => {
                tracing::info!(nets = self.mock.nets.len(), "using mock backend");
                Ok(Arc::new(self.build_mock()))
            }
            Backend::Native => native_driver(),
        }
    }
}

#[cfg(feature = "native")]
fn native_driver() -> anyhow::Result<Arc<dyn NtcanDriver>> {
    tracing::info!("using native backend");
    Ok(Arc::new(ntcan_driver::NativeDriver::new()))
}

#[cfg(not(feature = "native"))]
fn native_driver() -> anyhow::Result<Arc<dyn NtcanDriver>> {
    anyhow::bail!("native backend not available: build with the `native` feature")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ntcan_driver::OpenParams;

    #[test]
    fn deserialize_empty_config() {
        let config: ShellConfig = toml::from_str("").unwrap();
        assert_eq!(config, ShellConfig::default());
        assert_eq!(config.backend, Backend::Mock);
        assert!(config.stop_on_error); // default
        assert!(!config.json);
        assert!(config.mock.nets.is_empty());
    }

    #[test]
    fn deserialize_full_config() {
        let toml = r#"
backend = "mock"
json = true
log_json = true
stop_on_error = false

[[mock.nets]]
net = 0
board_id = "CAN-PCIe/402"
hardware = 0x1000
firmware = 0x1004
driver = 0x3A0B
dll = 0x4D2E
board_status = 0
features = 0x0B4A

[[mock.nets]]
net = 4
status_error = 0xE000000D
"#;
        let config: ShellConfig = toml::from_str(toml).unwrap();
        assert!(config.json);
        assert!(config.log_json);
        assert!(!config.stop_on_error);
        assert_eq!(config.mock.nets.len(), 2);
        assert_eq!(config.mock.nets[0].board_id, "CAN-PCIe/402");
        assert_eq!(config.mock.nets[0].dll, 0x4D2E);
        assert_eq!(config.mock.nets[1].board_id, "CAN-USB/2"); // default
        assert_eq!(config.mock.nets[1].status_error, Some(0xE000_000D));
    }

    #[test]
    fn deserialize_native_backend() {
        let config: ShellConfig = toml::from_str(r#"backend = "native""#).unwrap();
        assert_eq!(config.backend, Backend::Native);
    }

    #[test]
    fn unknown_backend_is_rejected() {
        assert!(toml::from_str::<ShellConfig>(r#"backend = "socketcan""#).is_err());
    }

    #[test]
    fn build_mock_applies_nets() {
        let toml = r#"
[[mock.nets]]
net = 2
board_id = "CAN-USB/400"

[[mock.nets]]
net = 3
status_error = 0xE000000F
"#;
        let config: ShellConfig = toml::from_str(toml).unwrap();
        let mock = config.build_mock();

        let h = mock.open(OpenParams::probe(2)).unwrap();
        assert_eq!(mock.status(h).unwrap().boardid, "CAN-USB/400");

        let h = mock.open(OpenParams::probe(3)).unwrap();
        assert_eq!(mock.status(h).unwrap_err().code, ResultCode::INVALID_HARDWARE);

        assert!(mock.open(OpenParams::probe(1)).is_err());
    }

    #[cfg(not(feature = "native"))]
    #[test]
    fn native_backend_needs_feature() {
        let config = ShellConfig {
            backend: Backend::Native,
            ..Default::default()
        };
        assert!(config.build_driver().is_err());
    }
}
