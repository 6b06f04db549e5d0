//! `ladle run` -- execute a recipe and its prerequisites.

use anyhow::Result;
use tracing::debug;

use ladle_core::types::Ladlefile;
use ladle_exec::{Executor, ExecutorOptions, ExitOutcome, Shell};

use crate::cli::RunArgs;
use crate::context::RuntimeContext;
use crate::interrupt::GuardedShell;
use crate::output::{EchoListener, RecipeFailed};

/// Execute the `ladle run` command.
pub fn run(ctx: &RuntimeContext, args: &RunArgs) -> Result<()> {
    let file = ctx.load()?;
    let outcome = execute(ctx, &file, &args.recipe, &args.args, args.dry_run, args.quiet)?;
    check_outcome(outcome, &file)
}

/// Run `recipe` from an already loaded ladlefile.
pub fn execute(
    ctx: &RuntimeContext,
    file: &Ladlefile,
    recipe: &str,
    args: &[String],
    dry_run: bool,
    quiet: bool,
) -> Result<ExitOutcome> {
    let shell = GuardedShell::new(ctx.shell_for(file));
    debug!(shell = %shell.describe(), recipe, ?args, "starting run");

    let options = ExecutorOptions {
        dry_run: dry_run || ctx.config.dry_run,
        quiet: quiet || ctx.config.quiet,
        working_directory: ctx.working_directory.clone(),
    };
    let executor = Executor::new(file, &shell, options);
    Ok(executor.run_with(recipe, args, &mut EchoListener)?)
}

/// Turn a failed outcome into a [`RecipeFailed`] error carrying the exit
/// code.
pub fn check_outcome(outcome: ExitOutcome, file: &Ladlefile) -> Result<()> {
    match outcome {
        ExitOutcome::Success => Ok(()),
        ExitOutcome::Failure {
            code,
            recipe,
            line_index,
        } => {
            let line = file
                .recipes
                .get(&recipe)
                .and_then(|r| r.body.get(line_index))
                .map(|b| b.line);
            Err(RecipeFailed { code, recipe, line }.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ladle_core::parser::parse;

    #[test]
    fn failure_maps_to_source_line() {
        let file = parse("a:\n    true\n    false\n").unwrap();
        let err = check_outcome(
            ExitOutcome::Failure {
                code: 1,
                recipe: "a".into(),
                line_index: 1,
            },
            &file,
        )
        .unwrap_err();
        let failed = err.downcast_ref::<RecipeFailed>().unwrap();
        assert_eq!(failed.line, Some(3));
        assert_eq!(failed.code, 1);
    }

    #[test]
    fn success_is_ok() {
        let file = parse("a:\n    true\n").unwrap();
        assert!(check_outcome(ExitOutcome::Success, &file).is_ok());
    }
}
