//! Clap CLI definitions for the `ladle` command.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// ladle -- run project recipes from a ladlefile.
#[derive(Parser, Debug)]
#[command(
    name = "ladle",
    about = "Run project recipes from a ladlefile",
    long_about = "Run named, parameterized groups of shell commands declared in a ladlefile. \
                  Prerequisites run first, each at most once, and the first failing line stops the run.",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Global flags available to all subcommands.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Ladlefile to load (default: search upward for ladlefile, Ladlefile, .ladlefile).
    #[arg(short = 'f', long, global = true, env = "LADLE_FILE")]
    pub file: Option<PathBuf>,

    /// Run recipes in this directory instead of the ladlefile's.
    #[arg(short = 'd', long, global = true)]
    pub working_directory: Option<PathBuf>,

    /// Shell program used for every line, overriding `set shell`.
    #[arg(long, global = true)]
    pub shell: Option<String>,

    /// Argument passed to --shell before the line (repeatable).
    #[arg(long = "shell-arg", global = true, allow_hyphen_values = true)]
    pub shell_args: Vec<String>,

    /// When to use colour.
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorArg>,

    /// Output in JSON format.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose/debug output.
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorArg {
    Auto,
    Always,
    Never,
}

/// All available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a recipe and its prerequisites.
    #[command(alias = "r")]
    Run(RunArgs),

    /// List public recipes.
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show a recipe's declaration and execution order.
    Show(ShowArgs),

    /// Print declared variables.
    #[command(alias = "vars")]
    Variables,

    /// Parse and validate the ladlefile without running anything.
    Check,

    /// Rerun a recipe whenever files change.
    Watch(WatchArgs),

    /// Generate shell completions.
    Completion(CompletionArgs),

    /// Print version information.
    Version,
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// Arguments for `ladle run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Recipe to run.
    pub recipe: String,

    /// Arguments for the recipe's parameters. Everything after RECIPE is
    /// passed through, including values starting with `-`.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Print the lines that would run without running them.
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Do not echo lines before running them.
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

// ---------------------------------------------------------------------------
// List / Show
// ---------------------------------------------------------------------------

/// Arguments for `ladle list`.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Keep declaration order instead of sorting by name.
    #[arg(short = 'u', long)]
    pub unsorted: bool,

    /// Include private recipes.
    #[arg(short = 'a', long)]
    pub all: bool,
}

/// Arguments for `ladle show`.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Recipe to show.
    pub recipe: String,
}

// ---------------------------------------------------------------------------
// Watch
// ---------------------------------------------------------------------------

/// Arguments for `ladle watch`.
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Recipe to rerun.
    pub recipe: String,

    /// Arguments for the recipe, fixed for every run.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Path to watch (repeatable; default: the ladlefile's directory).
    #[arg(short = 'p', long = "path")]
    pub paths: Vec<PathBuf>,

    /// Quiet period in milliseconds before rerunning.
    #[arg(long)]
    pub debounce_ms: Option<u64>,

    /// Do not echo lines before running them.
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

// ---------------------------------------------------------------------------
// Completion
// ---------------------------------------------------------------------------

/// Arguments for `ladle completion`.
#[derive(Args, Debug)]
pub struct CompletionArgs {
    /// Shell to generate the script for. Has its own id so it does not
    /// collide with the global `--shell` flag.
    #[arg(id = "target_shell", value_name = "SHELL", value_enum)]
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_is_allowed() {
        let cli = Cli::try_parse_from(["ladle"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn run_passes_hyphenated_arguments_through() {
        let cli = Cli::try_parse_from(["ladle", "run", "--dry-run", "test", "--release", "-q"])
            .unwrap();
        match cli.command {
            Some(Commands::Run(args)) => {
                assert_eq!(args.recipe, "test");
                assert_eq!(args.args, vec!["--release", "-q"]);
                assert!(args.dry_run);
                assert!(!args.quiet);
            }
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "ladle",
            "list",
            "--json",
            "--shell",
            "bash",
            "--shell-arg",
            "-cu",
        ])
        .unwrap();
        assert!(cli.global.json);
        assert_eq!(cli.global.shell.as_deref(), Some("bash"));
        assert_eq!(cli.global.shell_args, vec!["-cu"]);
    }

    #[test]
    fn watch_collects_paths() {
        let cli = Cli::try_parse_from([
            "ladle", "watch", "-p", "src", "-p", "tests", "--debounce-ms", "50", "test",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Watch(args)) => {
                assert_eq!(args.recipe, "test");
                assert_eq!(args.paths, vec![PathBuf::from("src"), PathBuf::from("tests")]);
                assert_eq!(args.debounce_ms, Some(50));
            }
            other => panic!("expected watch, got {other:?}"),
        }
    }

    #[test]
    fn completion_takes_a_shell_name() {
        let cli = Cli::try_parse_from(["ladle", "completion", "zsh"]).unwrap();
        match cli.command {
            Some(Commands::Completion(args)) => {
                assert_eq!(args.shell, clap_complete::Shell::Zsh);
            }
            other => panic!("expected completion, got {other:?}"),
        }
        assert!(Cli::try_parse_from(["ladle", "completion", "tcsh"]).is_err());
    }

    #[test]
    fn completion_shell_and_global_shell_coexist() {
        let cli =
            Cli::try_parse_from(["ladle", "--shell", "bash", "completion", "fish"]).unwrap();
        assert_eq!(cli.global.shell.as_deref(), Some("bash"));
        match cli.command {
            Some(Commands::Completion(args)) => {
                assert_eq!(args.shell, clap_complete::Shell::Fish);
            }
            other => panic!("expected completion, got {other:?}"),
        }
    }

    #[test]
    fn run_requires_recipe() {
        assert!(Cli::try_parse_from(["ladle", "run"]).is_err());
    }
}
