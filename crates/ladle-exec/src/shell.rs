//! The shell capability.
//!
//! The executor never interprets body lines itself. Each line is handed to a
//! [`Shell`] as an opaque string; [`SystemShell`] spawns `program args... LINE`
//! and waits for it.

use std::path::Path;
use std::process::{Command, ExitStatus};

use thiserror::Error;
use tracing::debug;

use ladle_core::types::{Platform, Settings};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised while dispatching a line.
#[derive(Debug, Error)]
pub enum ShellError {
    /// The shell program could not be found or spawned.
    #[error("failed to execute shell `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// A specialized `Result` type for shell dispatch.
pub type Result<T> = std::result::Result<T, ShellError>;

// ---------------------------------------------------------------------------
// Capability
// ---------------------------------------------------------------------------

/// One line to run.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    /// Interpolated command line.
    pub line: &'a str,

    /// Entries layered on top of the inherited process environment, applied
    /// in order so later entries win.
    pub env: &'a [(String, String)],

    /// Working directory, or the current directory when `None`.
    pub cwd: Option<&'a Path>,
}

/// Runs a single command line and reports its exit code.
pub trait Shell {
    /// Run `invocation` to completion. A return of `Ok(0)` is success;
    /// any other code is a failure of the line, not of the shell.
    fn run(&self, invocation: &Invocation<'_>) -> Result<i32>;

    /// Human-readable form, e.g. `sh -cu`.
    fn describe(&self) -> String;
}

/// Spawns a real shell process per line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemShell {
    pub program: String,
    pub args: Vec<String>,
}

impl SystemShell {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// `sh -cu` on Unix, `cmd.exe /C` on Windows.
    pub fn platform_default(platform: Platform) -> Self {
        if platform.is_windows() {
            Self::new("cmd.exe", vec!["/C".to_string()])
        } else {
            Self::new("sh", vec!["-cu".to_string()])
        }
    }

    /// Build a shell from a `[program, args...]` list. Empty lists yield
    /// `None`.
    pub fn from_list(list: &[String]) -> Option<Self> {
        let (program, args) = list.split_first()?;
        Some(Self::new(program.clone(), args.to_vec()))
    }
}

impl Shell for SystemShell {
    fn run(&self, invocation: &Invocation<'_>) -> Result<i32> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).arg(invocation.line);
        cmd.envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        if let Some(cwd) = invocation.cwd {
            cmd.current_dir(cwd);
        }

        let status = cmd.status().map_err(|source| ShellError::Spawn {
            program: self.program.clone(),
            source,
        })?;
        let code = exit_code(status);
        debug!(shell = %self.describe(), code, "line finished");
        Ok(code)
    }

    fn describe(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Map a child's status to a process exit code. A child killed by a signal
/// reports `128 + signal` on Unix.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}

/// Pick the shell for a run.
///
/// Precedence: `override_shell` (from the command line or configuration),
/// then `set windows-shell` on Windows, then `set shell`, then the platform
/// default.
pub fn select_shell(
    settings: &Settings,
    platform: Platform,
    override_shell: Option<SystemShell>,
) -> SystemShell {
    if let Some(shell) = override_shell {
        return shell;
    }
    let declared = if platform.is_windows() {
        settings
            .windows_shell
            .as_deref()
            .or(settings.shell.as_deref())
    } else {
        settings.shell.as_deref()
    };
    declared
        .and_then(SystemShell::from_list)
        .unwrap_or_else(|| SystemShell::platform_default(platform))
}
