//! `ladle variables` -- print declared variables in declaration order.

use anyhow::Result;

use ladle_core::variables::Variable;

use crate::context::RuntimeContext;
use crate::output::{format_variable, output_json};

/// Execute the `ladle variables` command.
pub fn run(ctx: &RuntimeContext) -> Result<()> {
    let file = ctx.load()?;
    let vars: Vec<&Variable> = file.variables.iter().collect();

    if ctx.json {
        output_json(&vars);
    } else {
        for var in vars {
            println!("{}", format_variable(var));
        }
    }
    Ok(())
}
