//! Dependency planning.
//!
//! A plan is the ordered list of recipes to run for one target: every
//! prerequisite before its dependent, left to right in declaration order,
//! each recipe at most once. The target is always last.

use std::collections::HashMap;

use tracing::debug;

use crate::error::PlanError;
use crate::types::{Recipe, RecipeTable};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// Resolve `target` into an execution order.
pub fn plan<'t>(table: &'t RecipeTable, target: &str) -> Result<Vec<&'t Recipe>, PlanError> {
    let root = table.get(target).ok_or_else(|| PlanError::UnknownRecipe {
        name: target.to_string(),
        referenced_by: None,
    })?;

    let mut walk = Walk {
        table,
        marks: HashMap::new(),
        stack: Vec::new(),
        order: Vec::new(),
    };
    walk.visit(root)?;

    debug!(
        recipe = target,
        order = ?walk.order.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
        "planned"
    );
    Ok(walk.order)
}

/// Like [`plan`], returning recipe names.
pub fn plan_names(table: &RecipeTable, target: &str) -> Result<Vec<String>, PlanError> {
    Ok(plan(table, target)?
        .into_iter()
        .map(|r| r.name.clone())
        .collect())
}

/// Plan every recipe, surfacing the first cycle or missing prerequisite.
pub fn validate_graph(table: &RecipeTable) -> Result<(), PlanError> {
    for recipe in table.iter() {
        plan(table, &recipe.name)?;
    }
    Ok(())
}

struct Walk<'t> {
    table: &'t RecipeTable,
    marks: HashMap<&'t str, Mark>,
    stack: Vec<&'t str>,
    order: Vec<&'t Recipe>,
}

impl<'t> Walk<'t> {
    fn visit(&mut self, recipe: &'t Recipe) -> Result<(), PlanError> {
        let name = recipe.name.as_str();
        match self.marks.get(name) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::Visiting) => {
                let start = self.stack.iter().position(|n| *n == name).unwrap_or(0);
                let mut cycle: Vec<String> =
                    self.stack[start..].iter().map(|n| n.to_string()).collect();
                cycle.push(name.to_string());
                return Err(PlanError::CyclicDependency { cycle });
            }
            None => {}
        }

        self.marks.insert(name, Mark::Visiting);
        self.stack.push(name);

        for dep in &recipe.prerequisites {
            let next = self
                .table
                .get(dep)
                .ok_or_else(|| PlanError::UnknownRecipe {
                    name: dep.clone(),
                    referenced_by: Some(recipe.name.clone()),
                })?;
            self.visit(next)?;
        }

        self.stack.pop();
        self.marks.insert(name, Mark::Done);
        self.order.push(recipe);
        Ok(())
    }
}
