//! `ladle list` -- list recipes with their parameters and docs.

use anyhow::Result;

use ladle_core::types::{Ladlefile, Recipe};
use ladle_ui::listing::render_recipe_list;

use crate::cli::ListArgs;
use crate::context::RuntimeContext;
use crate::output::{RecipeView, output_json};

/// Execute the `ladle list` command.
pub fn run(ctx: &RuntimeContext, args: &ListArgs) -> Result<()> {
    let file = ctx.load()?;
    list(ctx, &file, args.unsorted, args.all);
    Ok(())
}

/// `ladle` with no subcommand: sorted public recipes.
pub fn run_default(ctx: &RuntimeContext) -> Result<()> {
    let file = ctx.load()?;
    list(ctx, &file, false, false);
    Ok(())
}

fn list(ctx: &RuntimeContext, file: &Ladlefile, unsorted: bool, all: bool) {
    let recipes = select(file, unsorted, all);
    if ctx.json {
        let views: Vec<RecipeView<'_>> = recipes.iter().map(|r| RecipeView::from_recipe(r)).collect();
        output_json(&views);
    } else {
        print!("{}", render_recipe_list(&recipes));
    }
}

fn select(file: &Ladlefile, unsorted: bool, all: bool) -> Vec<&Recipe> {
    let mut recipes: Vec<&Recipe> = if all {
        file.recipes.iter().collect()
    } else {
        file.recipes.public().collect()
    };
    if !unsorted {
        recipes.sort_by(|a, b| a.name.cmp(&b.name));
    }
    recipes
}

#[cfg(test)]
mod tests {
    use super::*;
    use ladle_core::parser::parse;
    use pretty_assertions::assert_eq;

    const TEXT: &str = "zeta:\n    true\n_hidden:\n    true\n[private]\nsecret:\n    true\nalpha:\n    true\n";

    fn names(recipes: &[&Recipe]) -> Vec<String> {
        recipes.iter().map(|r| r.name.clone()).collect()
    }

    #[test]
    fn sorted_public_by_default() {
        let file = parse(TEXT).unwrap();
        assert_eq!(names(&select(&file, false, false)), vec!["alpha", "zeta"]);
    }

    #[test]
    fn unsorted_keeps_declaration_order() {
        let file = parse(TEXT).unwrap();
        assert_eq!(names(&select(&file, true, false)), vec!["zeta", "alpha"]);
    }

    #[test]
    fn all_includes_private() {
        let file = parse(TEXT).unwrap();
        assert_eq!(
            names(&select(&file, true, true)),
            vec!["zeta", "_hidden", "secret", "alpha"]
        );
    }
}
