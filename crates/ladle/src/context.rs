//! Runtime context for command execution.
//!
//! The [`RuntimeContext`] holds everything a command handler needs: the
//! layered configuration, global flags, and how to find and load the
//! ladlefile.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use ladle_config::{ColorChoice, LadleConfig, find_ladlefile_or_error};
use ladle_core::parser;
use ladle_core::types::{Ladlefile, Platform};
use ladle_exec::SystemShell;
use ladle_exec::shell::select_shell;
use ladle_ui::terminal::ColorMode;

use crate::cli::{ColorArg, GlobalArgs};

/// Runtime context passed to every command handler.
///
/// Constructed once in `main` after CLI parsing, before command dispatch.
#[derive(Debug)]
pub struct RuntimeContext {
    pub config: LadleConfig,

    /// `--file`, or `LADLE_FILE`.
    pub file: Option<PathBuf>,

    pub working_directory: Option<PathBuf>,

    /// `--shell` program.
    pub shell: Option<String>,

    /// `--shell-arg` values.
    pub shell_args: Vec<String>,

    pub color: ColorMode,

    /// Whether to produce JSON output.
    pub json: bool,
}

impl RuntimeContext {
    /// Build a `RuntimeContext` from parsed global arguments and loaded
    /// configuration. Flags win over configuration.
    pub fn from_global_args(global: &GlobalArgs, config: LadleConfig) -> Self {
        let color = match global.color {
            Some(ColorArg::Always) => ColorMode::Always,
            Some(ColorArg::Never) => ColorMode::Never,
            Some(ColorArg::Auto) => ColorMode::Auto,
            None => match config.color {
                ColorChoice::Always => ColorMode::Always,
                ColorChoice::Never => ColorMode::Never,
                ColorChoice::Auto => ColorMode::Auto,
            },
        };

        Self {
            config,
            file: global.file.clone(),
            working_directory: global.working_directory.clone(),
            shell: global.shell.clone(),
            shell_args: global.shell_args.clone(),
            color,
            json: global.json,
        }
    }

    /// Where ladlefile discovery starts: `--working-directory`, else the
    /// current directory.
    fn search_root(&self) -> Result<PathBuf> {
        match self.working_directory {
            Some(ref dir) => Ok(dir.clone()),
            None => env::current_dir().context("cannot determine the current directory"),
        }
    }

    /// Resolve the ladlefile path: `--file` if given, otherwise search
    /// upward.
    pub fn ladlefile_path(&self) -> Result<PathBuf> {
        if let Some(ref file) = self.file {
            return Ok(file.clone());
        }
        let root = self.search_root()?;
        Ok(find_ladlefile_or_error(&root)?)
    }

    /// Find, read and parse the ladlefile.
    pub fn load(&self) -> Result<Ladlefile> {
        let path = self.ladlefile_path()?;
        load_from(&path)
    }

    /// Shell chosen by `--shell` or configuration, before the ladlefile's
    /// own settings are considered. Without explicit arguments the platform
    /// default arguments are used.
    pub fn shell_override(&self) -> Option<SystemShell> {
        let (program, args) = match (&self.shell, &self.config.shell) {
            (Some(program), _) => (program, &self.shell_args),
            (None, Some(program)) => (program, &self.config.shell_args),
            (None, None) => return None,
        };
        let args = if args.is_empty() {
            SystemShell::platform_default(Platform::current()).args
        } else {
            args.clone()
        };
        Some(SystemShell::new(program.clone(), args))
    }

    /// The shell every line of `file` runs through.
    pub fn shell_for(&self, file: &Ladlefile) -> SystemShell {
        select_shell(&file.settings, Platform::current(), self.shell_override())
    }
}

pub fn load_from(path: &Path) -> Result<Ladlefile> {
    parser::load(path).with_context(|| format!("failed to load ladlefile {}", path.display()))
}
