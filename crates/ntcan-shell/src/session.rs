//! Line-oriented command session.
//!
//! Each input line is split into words, resolved through the command
//! registry and run on the blocking pool, since driver calls may block for
//! as long as the channel timeouts allow.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use ntcan_commands::{CommandError, CommandRegistry, PACKAGE_NAME, PACKAGE_VERSION, Value};
use ntcan_driver::NtcanDriver;

/// Where command lines come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Lines given with `-c`.
    Commands(Vec<String>),
    Script(PathBuf),
    Stdin,
}

impl Source {
    /// Only stdin keeps going after a failed command.
    pub fn is_interactive(&self) -> bool {
        matches!(self, Self::Stdin)
    }

    pub async fn reader(&self) -> io::Result<Box<dyn AsyncBufRead + Unpin + Send>> {
        Ok(match self {
            Self::Commands(lines) => Box::new(io::Cursor::new(lines.join("\n").into_bytes())),
            Self::Script(path) => Box::new(BufReader::new(File::open(path).await?)),
            Self::Stdin => Box::new(BufReader::new(tokio::io::stdin())),
        })
    }
}

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Blank,
    Help,
    Exit,
    Command { name: String, args: Vec<Value> },
}

/// Split a line into words. `#` starts a comment when it begins the line.
pub fn parse_line(line: &str) -> Result<Line, shell_words::ParseError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(Line::Blank);
    }

    let mut words = shell_words::split(trimmed)?.into_iter();
    let Some(name) = words.next() else {
        return Ok(Line::Blank);
    };
    Ok(match name.as_str() {
        "help" => Line::Help,
        "exit" | "quit" => Line::Exit,
        _ => Line::Command {
            name,
            args: words.map(Value::Text).collect(),
        },
    })
}

/// What to print for one line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub failed: bool,
    pub exit: bool,
}

impl Reply {
    fn out(text: String) -> Self {
        Self {
            stdout: Some(text),
            ..Default::default()
        }
    }
}

#[derive(Serialize)]
struct JsonReply<'a, T: Serialize> {
    command: &'a str,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<&'static str>,
}

fn to_json<T: Serialize>(reply: &JsonReply<'_, T>) -> String {
    serde_json::to_string(reply).unwrap_or_else(|err| {
        format!(r#"{{"command":"{}","ok":false,"error":"{err}"}}"#, reply.command)
    })
}

/// Counters for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Input lines consumed, including blank ones and a final `exit`.
    pub lines: usize,
    pub failed: usize,
    /// The run ended early on a failed command.
    pub stopped: bool,
}

/// Registry plus driver, shared with the blocking pool.
pub struct Session {
    registry: CommandRegistry,
    driver: Arc<dyn NtcanDriver>,
    json: bool,
}

impl Session {
    pub fn new(registry: CommandRegistry, driver: Arc<dyn NtcanDriver>, json: bool) -> Self {
        Self {
            registry,
            driver,
            json,
        }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Run one input line to completion. Blocks while the driver does.
    pub fn execute(&self, line: &str) -> Reply {
        match parse_line(line) {
            Ok(Line::Blank) => Reply::default(),
            Ok(Line::Exit) => Reply {
                exit: true,
                ..Default::default()
            },
            Ok(Line::Help) => self.help(),
            Ok(Line::Command { name, args }) => {
                let result = self.registry.dispatch(&name, &args, self.driver.as_ref());
                self.render(&name, result)
            }
            Err(err) => self.failure(line.trim(), &err.to_string(), "syntax"),
        }
    }

    fn render(&self, command: &str, result: Result<Value, CommandError>) -> Reply {
        match result {
            Ok(value) if self.json => Reply::out(to_json(&JsonReply {
                command,
                ok: true,
                result: Some(&value),
                error: None,
                kind: None,
            })),
            Ok(value) => {
                let text = value.to_string();
                let text = text.trim_end_matches('\n');
                if text.is_empty() {
                    Reply::default()
                } else {
                    Reply::out(text.to_string())
                }
            }
            Err(err) => {
                tracing::debug!(command, kind = err.kind(), "command failed");
                self.failure(command, &err.to_string(), err.kind())
            }
        }
    }

    fn failure(&self, command: &str, message: &str, kind: &'static str) -> Reply {
        if self.json {
            Reply {
                stdout: Some(to_json::<()>(&JsonReply {
                    command,
                    ok: false,
                    result: None,
                    error: Some(message.to_string()),
                    kind: Some(kind),
                })),
                failed: true,
                ..Default::default()
            }
        } else {
            Reply {
                stderr: Some(format!("error: {message}")),
                failed: true,
                ..Default::default()
            }
        }
    }

    fn help(&self) -> Reply {
        let commands = self.registry.list_commands();
        if self.json {
            return Reply::out(to_json(&JsonReply {
                command: "help",
                ok: true,
                result: Some(&commands),
                error: None,
                kind: None,
            }));
        }

        let mut text = format!("{PACKAGE_NAME} {PACKAGE_VERSION}");
        for info in &commands {
            let usage = if info.usage.is_empty() {
                info.name.clone()
            } else {
                format!("{} {}", info.name, info.usage)
            };
            text.push_str(&format!("\n  {usage:<58} {}", info.summary));
        }
        text.push_str("\n  help | exit | quit");
        Reply::out(text)
    }
}

/// Drive `session` over every line of `input` until it ends, `exit` is
/// read, or (with `stop_on_error`) a command fails.
pub async fn run<R, W, E>(
    session: Arc<Session>,
    input: R,
    stdout: &mut W,
    stderr: &mut E,
    stop_on_error: bool,
) -> io::Result<Summary>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    E: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut summary = Summary::default();

    while let Some(line) = lines.next_line().await? {
        summary.lines += 1;
        let worker = Arc::clone(&session);
        let reply = tokio::task::spawn_blocking(move || worker.execute(&line))
            .await
            .map_err(io::Error::other)?;

        if let Some(text) = &reply.stdout {
            stdout.write_all(text.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }
        if let Some(text) = &reply.stderr {
            stderr.write_all(text.as_bytes()).await?;
            stderr.write_all(b"\n").await?;
            stderr.flush().await?;
        }
        if reply.exit {
            break;
        }

        if reply.failed {
            summary.failed += 1;
            if stop_on_error {
                summary.stopped = true;
                tracing::info!(failed = summary.failed, "stopping at first error");
                break;
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ntcan_driver::{IfStatus, MockDriver};

    fn session(json: bool) -> Arc<Session> {
        let mock = MockDriver::with_net(
            0,
            IfStatus {
                boardid: "CAN-USB/2".into(),
                ..Default::default()
            },
        );
        Arc::new(Session::new(
            CommandRegistry::with_defaults(),
            Arc::new(mock),
            json,
        ))
    }

    async fn run_script(session: Arc<Session>, script: &str, stop: bool) -> (String, String, Summary) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let summary = run(session, script.as_bytes(), &mut out, &mut err, stop)
            .await
            .unwrap();
        (
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
            summary,
        )
    }

    #[test]
    fn parse_blank_and_comments() {
        assert_eq!(parse_line("").unwrap(), Line::Blank);
        assert_eq!(parse_line("   ").unwrap(), Line::Blank);
        assert_eq!(parse_line("# ntcan::Scan").unwrap(), Line::Blank);
    }

    #[test]
    fn parse_builtins() {
        assert_eq!(parse_line("help").unwrap(), Line::Help);
        assert_eq!(parse_line("exit").unwrap(), Line::Exit);
        assert_eq!(parse_line(" quit ").unwrap(), Line::Exit);
    }

    #[test]
    fn parse_quoted_words() {
        let line = parse_line(r#"ntcan::Write 1 0x123 0 "01 02 03""#).unwrap();
        assert_eq!(
            line,
            Line::Command {
                name: "ntcan::Write".into(),
                args: vec![
                    Value::from("1"),
                    Value::from("0x123"),
                    Value::from("0"),
                    Value::from("01 02 03"),
                ],
            }
        );
    }

    #[test]
    fn parse_unbalanced_quote_fails() {
        assert!(parse_line(r#"ntcan::Write 1 2 0 "01"#).is_err());
    }

    #[test]
    fn text_mode_prints_results_and_errors() {
        let s = session(false);
        assert_eq!(s.execute("ntcan::Open 0 0 1 1 0 0").stdout.as_deref(), Some("1"));
        assert_eq!(s.execute("ntcan::Close 1"), Reply::default());

        let reply = s.execute("ntcan::Close");
        assert!(reply.failed);
        assert_eq!(
            reply.stderr.as_deref(),
            Some(r#"error: wrong # args: should be "ntcan::Close handle""#)
        );
    }

    #[test]
    fn json_mode_reports_ok_and_errors() {
        let s = session(true);
        assert_eq!(
            s.execute("ntcan::Open 0 0 1 1 0 0").stdout.as_deref(),
            Some(r#"{"command":"ntcan::Open","ok":true,"result":1}"#)
        );
        assert_eq!(
            s.execute("ntcan::Close 1").stdout.as_deref(),
            Some(r#"{"command":"ntcan::Close","ok":true,"result":null}"#)
        );
        let reply = s.execute("ntcan::Read 1");
        assert!(reply.failed);
        assert!(reply.stderr.is_none());
        let json: serde_json::Value = serde_json::from_str(reply.stdout.as_deref().unwrap()).unwrap();
        assert_eq!(json["ok"], false);
        assert_eq!(json["kind"], "driver");
    }

    #[test]
    fn help_lists_every_command() {
        let s = session(false);
        let text = s.execute("help").stdout.unwrap();
        assert!(text.starts_with("ntcan "));
        assert!(text.contains("ntcan::Open net mode txqueuesize rxqueuesize txtimeout rxtimeout"));
        assert_eq!(text.matches("ntcan::").count(), s.registry().len());
    }

    #[tokio::test]
    async fn run_stops_on_first_error() {
        let script = "ntcan::Open 0 0 1 1 0 0\nntcan::Read 1\nntcan::Close 1\n";
        let (out, err, summary) = run_script(session(false), script, true).await;
        assert_eq!(out, "1\n");
        assert_eq!(err, "error: NTCAN canRead() returned timeout\n");
        assert_eq!(
            summary,
            Summary {
                lines: 2,
                failed: 1,
                stopped: true,
            }
        );
    }

    #[tokio::test]
    async fn run_continues_without_stop_on_error() {
        let script = "ntcan::Bogus\n\n# comment\nntcan::Open 0 0 1 1 0 0\n";
        let (out, err, summary) = run_script(session(false), script, false).await;
        assert_eq!(out, "1\n");
        assert_eq!(err, "error: invalid command name \"ntcan::Bogus\"\n");
        assert_eq!(summary.failed, 1);
        assert!(!summary.stopped);
    }

    #[tokio::test]
    async fn exit_ends_the_run() {
        let script = "exit\nntcan::Open 0 0 1 1 0 0\n";
        let (out, _, summary) = run_script(session(false), script, true).await;
        assert!(out.is_empty());
        assert_eq!(summary.lines, 1);
    }
}
