//! `ladle show` -- print a recipe's declaration and the order it would run in.

use anyhow::{Context, Result};

use ladle_core::planner::plan_names;
use ladle_core::types::Recipe;
use ladle_ui::listing::render_signature;
use ladle_ui::styles::{ICON_ARROW, render_doc, render_muted, render_recipe_name};

use crate::cli::ShowArgs;
use crate::context::RuntimeContext;
use crate::output::{RecipeView, output_json};

/// Execute the `ladle show` command.
pub fn run(ctx: &RuntimeContext, args: &ShowArgs) -> Result<()> {
    let file = ctx.load()?;
    let plan = plan_names(&file.recipes, &args.recipe)?;
    let recipe = file
        .recipes
        .get(&args.recipe)
        .with_context(|| format!("unknown recipe `{}`", args.recipe))?;

    if ctx.json {
        let body: Vec<&str> = recipe.body.iter().map(|b| b.text.as_str()).collect();
        output_json(&serde_json::json!({
            "recipe": RecipeView::from_recipe(recipe),
            "body": body,
            "plan": plan,
        }));
        return Ok(());
    }

    print!("{}", render_declaration(recipe));
    let arrow = render_muted(&format!(" {ICON_ARROW} "));
    let order: Vec<String> = plan.iter().map(|n| render_recipe_name(n)).collect();
    println!();
    println!("{} {}", render_muted("plan:"), order.join(arrow.as_str()));
    Ok(())
}

/// The recipe as it would be written in a ladlefile.
fn render_declaration(recipe: &Recipe) -> String {
    let mut out = String::new();
    if let Some(ref doc) = recipe.doc {
        out.push_str(&render_doc(doc));
        out.push('\n');
    }
    if !recipe.attributes.is_empty() {
        let attrs: Vec<&str> = recipe.attributes.iter().map(|a| a.as_str()).collect();
        out.push_str(&render_muted(&format!("[{}]", attrs.join(", "))));
        out.push('\n');
    }
    if recipe.quiet {
        out.push('@');
    }
    out.push_str(&render_signature(recipe));
    out.push(':');
    for dep in &recipe.prerequisites {
        out.push(' ');
        out.push_str(dep);
    }
    out.push('\n');
    for line in &recipe.body {
        out.push_str("    ");
        if line.quiet {
            out.push('@');
        }
        out.push_str(&line.text);
        out.push('\n');
    }
    out
}
