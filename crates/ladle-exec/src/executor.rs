//! Plan, bind, interpolate, then dispatch.
//!
//! [`Executor::prepare`] does all the work that can fail without side
//! effects: planning, argument binding and interpolation of every line of
//! every step. Only when that succeeds does [`Executor::run`] start the
//! first command, so a typo in the last recipe of a plan never leaves the
//! first one half-done.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use ladle_core::error::{InterpolateError, PlanError};
use ladle_core::interpolate::{BindingContext, interpolate};
use ladle_core::planner;
use ladle_core::types::{Ladlefile, Recipe};

use crate::shell::{Invocation, Shell, ShellError};

/// Errors that stop a run before or while it executes. A command exiting
/// non-zero is not an error; see [`ExitOutcome::Failure`].
#[derive(Debug, Error)]
pub enum ExecError {
    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("recipe `{recipe}` requires argument `{parameter}`")]
    MissingArgument { recipe: String, parameter: String },

    #[error("recipe `{recipe}` takes at most {expected} argument(s) but {got} were given")]
    TooManyArguments {
        recipe: String,
        expected: usize,
        got: usize,
    },

    #[error("recipe `{recipe}`, line {line}: {source}")]
    Interpolate {
        recipe: String,
        line: usize,
        #[source]
        source: InterpolateError,
    },

    #[error(transparent)]
    Shell(#[from] ShellError),
}

pub type Result<T> = std::result::Result<T, ExecError>;

/// How a run ended once it started executing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitOutcome {
    Success,
    Failure {
        /// Exit code of the failing line.
        code: i32,
        recipe: String,
        /// 0-based index of the failing line in the recipe body.
        line_index: usize,
    },
}

impl ExitOutcome {
    /// Process exit code for this outcome.
    pub fn code(&self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Failure { code, .. } => *code,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExecutorOptions {
    /// Echo lines without running them.
    pub dry_run: bool,

    /// Suppress echoing of every line.
    pub quiet: bool,

    /// Overrides the ladlefile's directory as the working directory.
    pub working_directory: Option<PathBuf>,
}

/// An interpolated line ready to hand to the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedLine {
    pub text: String,
    /// Either the line or its recipe was marked with `@`.
    pub quiet: bool,
    /// 1-based line number in the ladlefile.
    pub source_line: usize,
}

/// One recipe of a plan with its arguments bound.
#[derive(Debug, Clone)]
pub struct PlannedStep<'a> {
    pub recipe: &'a Recipe,
    pub bindings: BindingContext,
    pub lines: Vec<PreparedLine>,
    /// `$` parameters exported to this recipe's environment.
    pub exports: Vec<(String, String)>,
}

/// Everything needed to run a target, computed up front.
#[derive(Debug, Clone)]
pub struct ExecutionPlan<'a> {
    pub steps: Vec<PlannedStep<'a>>,
}

impl ExecutionPlan<'_> {
    pub fn recipe_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.recipe.name.as_str()).collect()
    }
}

/// Progress callbacks. Every method has a no-op default.
pub trait ExecutionListener {
    /// A recipe is about to run its first line.
    fn on_recipe(&mut self, _recipe: &Recipe) {}

    /// A line is about to run (or would run, in dry-run mode) and should be
    /// shown to the user.
    fn on_line(&mut self, _recipe: &Recipe, _line: &str) {}
}

/// Echoes lines to stderr without styling.
#[derive(Debug, Default)]
pub struct StderrEcho;

impl ExecutionListener for StderrEcho {
    fn on_line(&mut self, _recipe: &Recipe, line: &str) {
        eprintln!("{line}");
    }
}

/// Runs recipes from one ladlefile through one shell.
///
/// The executor keeps no state between runs.
pub struct Executor<'a> {
    file: &'a Ladlefile,
    shell: &'a dyn Shell,
    options: ExecutorOptions,
}

impl<'a> Executor<'a> {
    pub fn new(file: &'a Ladlefile, shell: &'a dyn Shell, options: ExecutorOptions) -> Self {
        Self {
            file,
            shell,
            options,
        }
    }

    /// Plan `target`, bind `args` to it and defaults to its prerequisites,
    /// and interpolate every line.
    pub fn prepare(&self, target: &str, args: &[String]) -> Result<ExecutionPlan<'a>> {
        let order = planner::plan(&self.file.recipes, target)?;
        let last = order.len().saturating_sub(1);

        let mut steps = Vec::with_capacity(order.len());
        for (idx, recipe) in order.into_iter().enumerate() {
            let supplied: &[String] = if idx == last { args } else { &[] };
            let bindings = bind(recipe, supplied)?;

            let mut lines = Vec::with_capacity(recipe.body.len());
            for body in &recipe.body {
                let text = interpolate(&body.text, &bindings, &self.file.variables).map_err(
                    |source| ExecError::Interpolate {
                        recipe: recipe.name.clone(),
                        line: body.line,
                        source,
                    },
                )?;
                lines.push(PreparedLine {
                    text,
                    quiet: recipe.quiet || body.quiet,
                    source_line: body.line,
                });
            }

            let exports = recipe
                .parameters
                .iter()
                .filter(|p| p.export)
                .filter_map(|p| {
                    bindings
                        .get(&p.name)
                        .map(|v| (p.name.clone(), v.to_string()))
                })
                .collect();

            steps.push(PlannedStep {
                recipe,
                bindings,
                lines,
                exports,
            });
        }
        Ok(ExecutionPlan { steps })
    }

    /// Run `target`, echoing lines to stderr.
    pub fn run(&self, target: &str, args: &[String]) -> Result<ExitOutcome> {
        self.run_with(target, args, &mut StderrEcho)
    }

    /// Run `target`, reporting progress to `listener`.
    pub fn run_with(
        &self,
        target: &str,
        args: &[String],
        listener: &mut dyn ExecutionListener,
    ) -> Result<ExitOutcome> {
        let plan = self.prepare(target, args)?;
        debug!(recipe = target, plan = ?plan.recipe_names(), "prepared plan");
        self.execute(&plan, listener)
    }

    /// Dispatch a prepared plan.
    pub fn execute(
        &self,
        plan: &ExecutionPlan<'_>,
        listener: &mut dyn ExecutionListener,
    ) -> Result<ExitOutcome> {
        let cwd = self.working_directory();
        let base: Vec<(String, String)> = self
            .file
            .variables
            .exported()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        for step in &plan.steps {
            let recipe = step.recipe;
            info!(recipe = %recipe.name, lines = step.lines.len(), "running recipe");
            listener.on_recipe(recipe);

            let mut env = base.clone();
            env.extend(step.exports.iter().cloned());

            for (line_index, line) in step.lines.iter().enumerate() {
                if !line.quiet && !self.options.quiet {
                    listener.on_line(recipe, &line.text);
                }
                if self.options.dry_run {
                    continue;
                }

                let code = self.shell.run(&Invocation {
                    line: &line.text,
                    env: &env,
                    cwd,
                })?;
                if code != 0 {
                    debug!(recipe = %recipe.name, line_index, code, "line failed");
                    return Ok(ExitOutcome::Failure {
                        code,
                        recipe: recipe.name.clone(),
                        line_index,
                    });
                }
            }
        }
        Ok(ExitOutcome::Success)
    }

    fn working_directory(&self) -> Option<&Path> {
        self.options
            .working_directory
            .as_deref()
            .or_else(|| self.file.directory())
            .filter(|p| !p.as_os_str().is_empty())
    }
}

/// Bind positional `args` to `recipe`'s parameters.
///
/// Arguments fill parameters left to right. A variadic parameter takes
/// everything that remains, joined by single spaces; with nothing left it
/// takes its default, or the empty string.
pub fn bind(recipe: &Recipe, args: &[String]) -> Result<BindingContext> {
    if let Some(max) = recipe.max_arguments() {
        if args.len() > max {
            return Err(ExecError::TooManyArguments {
                recipe: recipe.name.clone(),
                expected: max,
                got: args.len(),
            });
        }
    }

    let mut bindings = BindingContext::new();
    let mut remaining = args.iter();
    for param in &recipe.parameters {
        if param.variadic {
            let rest: Vec<&str> = remaining.by_ref().map(String::as_str).collect();
            let value = if rest.is_empty() {
                param.default.clone().unwrap_or_default()
            } else {
                rest.join(" ")
            };
            bindings.insert(param.name.clone(), value);
            continue;
        }

        let value = match (remaining.next(), &param.default) {
            (Some(arg), _) => arg.clone(),
            (None, Some(default)) => default.clone(),
            (None, None) => {
                return Err(ExecError::MissingArgument {
                    recipe: recipe.name.clone(),
                    parameter: param.name.clone(),
                });
            }
        };
        bindings.insert(param.name.clone(), value);
    }
    Ok(bindings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    use ladle_core::parser::parse_for;
    use ladle_core::types::Platform;
    use pretty_assertions::assert_eq;

    /// Records every invocation; lines listed in `codes` exit with that code.
    #[derive(Default)]
    struct RecordingShell {
        calls: RefCell<Vec<(String, Vec<(String, String)>)>>,
        codes: HashMap<String, i32>,
    }

    impl RecordingShell {
        fn failing(line: &str, code: i32) -> Self {
            Self {
                codes: HashMap::from([(line.to_string(), code)]),
                ..Self::default()
            }
        }

        fn lines(&self) -> Vec<String> {
            self.calls.borrow().iter().map(|(l, _)| l.clone()).collect()
        }

        fn env_of(&self, idx: usize, key: &str) -> Option<String> {
            self.calls.borrow()[idx]
                .1
                .iter()
                .rev()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        }
    }

    impl Shell for RecordingShell {
        fn run(&self, invocation: &Invocation<'_>) -> crate::shell::Result<i32> {
            self.calls
                .borrow_mut()
                .push((invocation.line.to_string(), invocation.env.to_vec()));
            Ok(self.codes.get(invocation.line).copied().unwrap_or(0))
        }

        fn describe(&self) -> String {
            "recording".into()
        }
    }

    #[derive(Default)]
    struct Collect {
        recipes: Vec<String>,
        echoed: Vec<String>,
    }

    impl ExecutionListener for Collect {
        fn on_recipe(&mut self, recipe: &Recipe) {
            self.recipes.push(recipe.name.clone());
        }

        fn on_line(&mut self, _recipe: &Recipe, line: &str) {
            self.echoed.push(line.to_string());
        }
    }

    fn file(text: &str) -> Ladlefile {
        parse_for(text, Platform::Linux).unwrap()
    }

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn run(text: &str, target: &str, argv: &[&str], shell: &RecordingShell) -> Result<ExitOutcome> {
        let ladlefile = file(text);
        let executor = Executor::new(&ladlefile, shell, ExecutorOptions::default());
        executor.run_with(target, &args(argv), &mut Collect::default())
    }

    #[test]
    fn default_argument_and_exported_variable() {
        let shell = RecordingShell::default();
        let text = "export GREETING := \"hi\"\nhello name=\"world\":\n    echo {{GREETING}} {{name}}\n";
        let outcome = run(text, "hello", &[], &shell).unwrap();
        assert_eq!(outcome, ExitOutcome::Success);
        assert_eq!(shell.lines(), vec!["echo hi world"]);
        assert_eq!(shell.env_of(0, "GREETING").as_deref(), Some("hi"));
    }

    #[test]
    fn failing_prerequisite_stops_the_plan() {
        let shell = RecordingShell::failing("cargo check", 101);
        let text = "check:\n    cargo check\n    echo after\ntest: check\n    cargo test\n";
        let outcome = run(text, "test", &[], &shell).unwrap();
        assert_eq!(
            outcome,
            ExitOutcome::Failure {
                code: 101,
                recipe: "check".into(),
                line_index: 0
            }
        );
        assert_eq!(outcome.code(), 101);
        assert_eq!(shell.lines(), vec!["cargo check"]);
    }

    #[test]
    fn prerequisite_lines_run_first() {
        let shell = RecordingShell::default();
        let text = "a:\n    echo a1\n    echo a2\nb: a\n    echo b\n";
        run(text, "b", &[], &shell).unwrap();
        assert_eq!(shell.lines(), vec!["echo a1", "echo a2", "echo b"]);
    }

    #[test]
    fn variadic_joins_remaining_arguments() {
        let text = "test *args:\n    cargo test {{args}}\n";

        let shell = RecordingShell::default();
        run(text, "test", &[], &shell).unwrap();
        assert_eq!(shell.lines(), vec!["cargo test "]);

        let shell = RecordingShell::default();
        run(text, "test", &["a", "b", "c"], &shell).unwrap();
        assert_eq!(shell.lines(), vec!["cargo test a b c"]);
    }

    #[test]
    fn variadic_default_applies_only_without_arguments() {
        let text = "test *args=\"--all\":\n    cargo test {{args}}\n";
        let shell = RecordingShell::default();
        run(text, "test", &[], &shell).unwrap();
        run(text, "test", &["-q"], &shell).unwrap();
        assert_eq!(shell.lines(), vec!["cargo test --all", "cargo test -q"]);
    }

    #[test]
    fn arguments_bind_only_to_the_target() {
        let text = "build mode=\"debug\":\n    build {{mode}}\ndeploy env: build\n    deploy {{env}}\n";
        let shell = RecordingShell::default();
        run(text, "deploy", &["prod"], &shell).unwrap();
        assert_eq!(shell.lines(), vec!["build debug", "deploy prod"]);
    }

    #[test]
    fn prerequisite_with_required_parameter_fails_before_running() {
        let text = "build mode:\n    build {{mode}}\ndeploy: build\n    deploy\n";
        let shell = RecordingShell::default();
        let err = run(text, "deploy", &[], &shell).unwrap_err();
        assert!(matches!(
            err,
            ExecError::MissingArgument { ref recipe, ref parameter }
                if recipe == "build" && parameter == "mode"
        ));
        assert!(shell.lines().is_empty());
    }

    #[test]
    fn too_many_arguments() {
        let shell = RecordingShell::default();
        let err = run("greet name:\n    echo {{name}}\n", "greet", &["a", "b"], &shell).unwrap_err();
        assert_eq!(
            err.to_string(),
            "recipe `greet` takes at most 1 argument(s) but 2 were given"
        );
    }

    #[test]
    fn unresolved_placeholder_in_later_recipe_runs_nothing() {
        let text = "first:\n    echo first\nsecond: first\n    echo {{missing}}\n";
        let shell = RecordingShell::default();
        let err = run(text, "second", &[], &shell).unwrap_err();
        match err {
            ExecError::Interpolate { recipe, line, .. } => {
                assert_eq!(recipe, "second");
                assert_eq!(line, 4);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(shell.lines().is_empty());
    }

    #[test]
    fn parameter_export_overrides_store() {
        let text = "export MODE := \"store\"\nshow $MODE=\"param\":\n    echo $MODE\n";
        let shell = RecordingShell::default();
        run(text, "show", &[], &shell).unwrap();
        assert_eq!(shell.env_of(0, "MODE").as_deref(), Some("param"));
    }

    #[test]
    fn plain_variables_are_not_exported() {
        let text = "internal := \"x\"\nshow:\n    echo {{internal}}\n";
        let shell = RecordingShell::default();
        run(text, "show", &[], &shell).unwrap();
        assert_eq!(shell.lines(), vec!["echo x"]);
        assert_eq!(shell.env_of(0, "internal"), None);
    }

    #[test]
    fn quiet_lines_are_not_echoed() {
        let ladlefile = file("a:\n    echo loud\n    @echo soft\n@b:\n    echo hidden\nc: a b\n    echo c\n");
        let shell = RecordingShell::default();
        let executor = Executor::new(&ladlefile, &shell, ExecutorOptions::default());
        let mut listener = Collect::default();
        executor.run_with("c", &[], &mut listener).unwrap();
        assert_eq!(listener.recipes, vec!["a", "b", "c"]);
        assert_eq!(listener.echoed, vec!["echo loud", "echo c"]);
        assert_eq!(shell.lines().len(), 4);
    }

    #[test]
    fn dry_run_echoes_without_running() {
        let ladlefile = file("a:\n    echo one\n    echo two\n");
        let shell = RecordingShell::default();
        let options = ExecutorOptions {
            dry_run: true,
            ..ExecutorOptions::default()
        };
        let executor = Executor::new(&ladlefile, &shell, options);
        let mut listener = Collect::default();
        let outcome = executor.run_with("a", &[], &mut listener).unwrap();
        assert!(outcome.is_success());
        assert_eq!(listener.echoed, vec!["echo one", "echo two"]);
        assert!(shell.lines().is_empty());
    }

    #[test]
    fn executor_is_reusable() {
        let ladlefile = file("a:\n    echo a\n");
        let shell = RecordingShell::default();
        let executor = Executor::new(&ladlefile, &shell, ExecutorOptions::default());
        executor.run_with("a", &[], &mut Collect::default()).unwrap();
        executor.run_with("a", &[], &mut Collect::default()).unwrap();
        assert_eq!(shell.lines(), vec!["echo a", "echo a"]);
    }

    #[test]
    fn prepare_lists_steps() {
        let ladlefile = file("fmt:\n    cargo fmt\nbuild: fmt\n    cargo build\nci: build fmt\n    true\n");
        let shell = RecordingShell::default();
        let executor = Executor::new(&ladlefile, &shell, ExecutorOptions::default());
        let plan = executor.prepare("ci", &[]).unwrap();
        assert_eq!(plan.recipe_names(), vec!["fmt", "build", "ci"]);
        assert_eq!(plan.steps[1].lines[0].source_line, 4);
    }

    #[cfg(unix)]
    #[test]
    fn runs_in_ladlefile_directory_with_real_shell() {
        use crate::shell::SystemShell;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ladlefile");
        std::fs::write(
            &path,
            "export WHO := \"ladle\"\nwrite:\n    @echo \"$WHO\" > written.txt\nfail: write\n    exit 7\n",
        )
        .unwrap();
        let ladlefile = ladle_core::parser::load(&path).unwrap();
        let shell = SystemShell::platform_default(Platform::Linux);
        let executor = Executor::new(&ladlefile, &shell, ExecutorOptions::default());

        let outcome = executor.run_with("fail", &[], &mut Collect::default()).unwrap();
        assert_eq!(outcome.code(), 7);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("written.txt")).unwrap(),
            "ladle\n"
        );
    }

    #[cfg(unix)]
    #[test]
    fn store_export_overrides_inherited_environment() {
        use crate::shell::SystemShell;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ladlefile");
        std::fs::write(
            &path,
            "export HOME := \"from-store\"\nhome:\n    @printf '%s' \"$HOME\" > home.txt\n",
        )
        .unwrap();
        let ladlefile = ladle_core::parser::load(&path).unwrap();
        let shell = SystemShell::platform_default(Platform::Linux);
        let executor = Executor::new(&ladlefile, &shell, ExecutorOptions::default());

        let outcome = executor.run_with("home", &[], &mut Collect::default()).unwrap();
        assert_eq!(outcome, ExitOutcome::Success);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("home.txt")).unwrap(),
            "from-store"
        );
    }

    #[cfg(unix)]
    #[test]
    fn interrupted_line_fails_with_130_and_stops() {
        use crate::shell::SystemShell;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ladlefile");
        std::fs::write(
            &path,
            "interrupt:\n    @kill -INT $$\n    @touch after.txt\n",
        )
        .unwrap();
        let ladlefile = ladle_core::parser::load(&path).unwrap();
        let shell = SystemShell::platform_default(Platform::Linux);
        let executor = Executor::new(&ladlefile, &shell, ExecutorOptions::default());

        let outcome = executor.run("interrupt", &[]).unwrap();
        assert_eq!(
            outcome,
            ExitOutcome::Failure {
                code: 130,
                recipe: "interrupt".into(),
                line_index: 0,
            }
        );
        assert!(!dir.path().join("after.txt").exists());
    }
}
