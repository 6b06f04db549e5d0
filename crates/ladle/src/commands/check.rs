//! `ladle check` -- validate a ladlefile without running anything.
//!
//! Loading already rejects syntax errors and unknown prerequisites. On top
//! of that every recipe is planned, to surface cycles, and every body line
//! is interpolated with placeholder values for its parameters, to surface
//! references to undeclared names before a run would hit them.

use anyhow::{Result, bail};

use ladle_core::interpolate::{BindingContext, interpolate, placeholders};
use ladle_core::planner::validate_graph;
use ladle_core::types::Ladlefile;
use ladle_ui::styles::{ICON_WARN, render_bold, render_fail_icon, render_pass_icon, render_warn};

use crate::context::RuntimeContext;
use crate::output::output_json;

/// Execute the `ladle check` command.
pub fn run(ctx: &RuntimeContext) -> Result<()> {
    let path = ctx.ladlefile_path()?;
    let file = crate::context::load_from(&path)?;
    validate_graph(&file.recipes)?;

    let problems = unresolved(&file);
    let warnings = unused_parameters(&file);

    if ctx.json {
        output_json(&serde_json::json!({
            "ok": problems.is_empty(),
            "path": path.display().to_string(),
            "recipes": file.recipes.len(),
            "variables": file.variables.len(),
            "errors": problems,
            "warnings": warnings,
        }));
    } else {
        for warning in &warnings {
            eprintln!("{} {}", render_warn(ICON_WARN), warning);
        }
        for problem in &problems {
            eprintln!("{} {}", render_fail_icon(), problem);
        }
        if problems.is_empty() {
            println!(
                "{} {}: {} recipes, {} variables",
                render_pass_icon(),
                render_bold(&path.display().to_string()),
                file.recipes.len(),
                file.variables.len()
            );
        }
    }

    if !problems.is_empty() {
        bail!("{} problem(s) found in {}", problems.len(), path.display());
    }
    Ok(())
}

/// Lines whose placeholders cannot be resolved from parameters or variables.
fn unresolved(file: &Ladlefile) -> Vec<String> {
    let mut problems = Vec::new();
    for recipe in file.recipes.iter() {
        let bindings: BindingContext = recipe
            .parameters
            .iter()
            .map(|p| (p.name.as_str(), ""))
            .collect();
        for line in &recipe.body {
            if let Err(err) = interpolate(&line.text, &bindings, &file.variables) {
                problems.push(format!("recipe `{}`, line {}: {err}", recipe.name, line.line));
            }
        }
    }
    problems
}

/// Parameters that are neither referenced by a placeholder nor exported.
fn unused_parameters(file: &Ladlefile) -> Vec<String> {
    let mut warnings = Vec::new();
    for recipe in file.recipes.iter() {
        for param in recipe.parameters.iter().filter(|p| !p.export) {
            let used = recipe
                .body
                .iter()
                .any(|line| placeholders(&line.text).contains(&param.name.as_str()));
            if !used {
                warnings.push(format!(
                    "parameter `{}` of recipe `{}` is never used",
                    param.name, recipe.name
                ));
            }
        }
    }
    warnings
}
