//! Output formatting helpers for the `ladle` CLI.

use std::fmt;
use std::io::{self, Write};

use serde::Serialize;

use ladle_core::parser::quote;
use ladle_core::types::{Parameter, Recipe};
use ladle_core::variables::Variable;
use ladle_exec::ExecutionListener;
use ladle_ui::styles::render_command_line;

/// Print `value` as pretty JSON on stdout.
pub fn output_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            // Ignore broken pipe errors (e.g., piped to `head`)
            let _ = writeln!(handle, "{}", json);
        }
        Err(e) => {
            eprintln!("Error: failed to serialize JSON: {}", e);
            std::process::exit(1);
        }
    }
}

/// JSON view of a recipe for `list --json` and `show --json`.
#[derive(Serialize)]
pub struct RecipeView<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<&'a str>,
    pub signature: String,
    pub parameters: &'a [Parameter],
    pub prerequisites: &'a [String],
    pub private: bool,
    pub quiet: bool,
    pub line: usize,
}

impl<'a> RecipeView<'a> {
    pub fn from_recipe(recipe: &'a Recipe) -> Self {
        Self {
            name: &recipe.name,
            doc: recipe.doc.as_deref(),
            signature: recipe.signature(),
            parameters: &recipe.parameters,
            prerequisites: &recipe.prerequisites,
            private: recipe.is_private(),
            quiet: recipe.quiet,
            line: recipe.line,
        }
    }
}

/// `export NAME := "value"` / `NAME := "value"`.
pub fn format_variable(var: &Variable) -> String {
    let prefix = if var.exported { "export " } else { "" };
    format!("{prefix}{} := {}", var.name, quote(&var.value))
}

/// Echoes each line to stderr with command-line styling.
pub struct EchoListener;

impl ExecutionListener for EchoListener {
    fn on_line(&mut self, _recipe: &Recipe, line: &str) {
        eprintln!("{}", render_command_line(line));
    }
}

/// A recipe line exited non-zero.
#[derive(Debug)]
pub struct RecipeFailed {
    pub code: i32,
    pub recipe: String,
    /// 1-based line number in the ladlefile.
    pub line: Option<usize>,
}

impl fmt::Display for RecipeFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "recipe `{}` failed", self.recipe)?;
        if let Some(line) = self.line {
            write!(f, " on line {line}")?;
        }
        write!(f, " with exit code {}", self.code)
    }
}

impl std::error::Error for RecipeFailed {}
