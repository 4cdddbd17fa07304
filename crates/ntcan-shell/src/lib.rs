//! NTCAN shell: a host interpreter for the `ntcan::` commands.
//!
//! Re-exports all modules so external crates (e.g. `ntcan-e2e-tests`) can
//! drive a `Session` against a mock driver.

pub mod config;
pub mod session;

pub use config::{Backend, ShellConfig};
pub use session::{Line, Reply, Session, Source, Summary};
