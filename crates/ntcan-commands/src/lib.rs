//! NTCAN scripting commands.
//!
//! Every vendor entry point is exposed as a named command under the
//! `ntcan::` namespace. A host interpreter resolves commands through the
//! `CommandRegistry`, which checks arity, decodes arguments, issues the
//! driver call and encodes the result as a `Value`.

pub mod args;
pub mod commands;
pub mod error;
pub mod registry;
pub mod report;
pub mod value;

pub use args::Args;
pub use error::{CommandError, CommandResult};
pub use registry::{CommandInfo, CommandRegistry, CommandSpec, NAMESPACE};
pub use value::Value;

/// Package name a host announces when loading the commands.
pub const PACKAGE_NAME: &str = "ntcan";

/// Package version, tracked with the crate version.
pub const PACKAGE_VERSION: &str = env!("CARGO_PKG_VERSION");
