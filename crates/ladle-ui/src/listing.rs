//! Human-readable recipe listings.

use ladle_core::types::Recipe;

use crate::styles::{render_category, render_doc, render_parameter, render_recipe_name};

const INDENT: &str = "    ";

/// Render the `Available recipes:` block for `recipes`, aligning doc
/// comments into one column.
pub fn render_recipe_list(recipes: &[&Recipe]) -> String {
    let mut out = render_category("Available recipes:");
    out.push('\n');

    let width = recipes
        .iter()
        .filter(|r| r.doc.is_some())
        .map(|r| r.signature().chars().count())
        .max()
        .unwrap_or(0);

    for recipe in recipes {
        out.push_str(INDENT);
        out.push_str(&render_signature(recipe));
        if let Some(ref doc) = recipe.doc {
            let pad = width.saturating_sub(recipe.signature().chars().count());
            out.push_str(&" ".repeat(pad + 1));
            out.push_str(&render_doc(doc));
        }
        out.push('\n');
    }
    out
}

/// `name param*` with styling applied to each piece.
pub fn render_signature(recipe: &Recipe) -> String {
    let mut out = render_recipe_name(&recipe.name);
    for param in &recipe.parameters {
        out.push(' ');
        out.push_str(&render_parameter(param));
    }
    out
}
