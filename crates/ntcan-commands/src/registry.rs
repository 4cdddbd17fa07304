//! Command registration table.
//!
//! The host looks commands up by name here and calls `dispatch`, which
//! enforces arity before the handler touches the driver.

use std::collections::HashMap;

use ntcan_driver::NtcanDriver;
use serde::Serialize;

use crate::args::Args;
use crate::error::{CommandError, CommandResult};
use crate::value::Value;

/// Namespace every command is registered under.
pub const NAMESPACE: &str = "ntcan::";

/// Signature of a command handler.
pub type Handler = fn(&Args<'_>, &dyn NtcanDriver) -> CommandResult<Value>;

/// One entry of the registration table.
#[derive(Clone, Copy)]
pub struct CommandSpec {
    /// Bare name, e.g. `Open`.
    pub name: &'static str,
    /// Argument names as shown in the usage message.
    pub usage: &'static str,
    /// Exact number of arguments, excluding the command word.
    pub arity: usize,
    pub summary: &'static str,
    pub handler: Handler,
}

impl CommandSpec {
    pub fn qualified_name(&self) -> String {
        format!("{NAMESPACE}{}", self.name)
    }
}

/// Metadata about a registered command (used by `help`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandInfo {
    pub name: String,
    pub usage: &'static str,
    pub arity: usize,
    pub summary: &'static str,
}

/// Commands indexed by bare name.
pub struct CommandRegistry {
    commands: Vec<CommandSpec>,
    index: HashMap<&'static str, usize>,
}

impl CommandRegistry {
    pub fn new(commands: Vec<CommandSpec>) -> Self {
        let index = commands
            .iter()
            .enumerate()
            .map(|(i, spec)| (spec.name, i))
            .collect();
        Self { commands, index }
    }

    /// Registry with every NTCAN command.
    pub fn with_defaults() -> Self {
        Self::new(crate::commands::all_commands())
    }

    /// Resolve `ntcan::Name` or the bare `Name`.
    pub fn lookup(&self, name: &str) -> Option<&CommandSpec> {
        let bare = name.strip_prefix(NAMESPACE).unwrap_or(name);
        self.index.get(bare).map(|&i| &self.commands[i])
    }

    /// Run one command against `driver`.
    pub fn dispatch(
        &self,
        name: &str,
        args: &[Value],
        driver: &dyn NtcanDriver,
    ) -> CommandResult<Value> {
        let spec = self.lookup(name).ok_or_else(|| CommandError::UnknownCommand {
            name: name.to_string(),
        })?;
        let command = spec.qualified_name();
        if args.len() != spec.arity {
            return Err(CommandError::Usage {
                command,
                usage: spec.usage,
            });
        }

        tracing::debug!(command = %command, argc = args.len(), "dispatching command");
        (spec.handler)(&Args::new(&command, args), driver)
    }

    pub fn list_commands(&self) -> Vec<CommandInfo> {
        self.commands
            .iter()
            .map(|spec| CommandInfo {
                name: spec.qualified_name(),
                usage: spec.usage,
                arity: spec.arity,
                summary: spec.summary,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
