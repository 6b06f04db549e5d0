//! Recipe execution for ladle.
//!
//! [`executor::Executor`] plans a target, binds its arguments, interpolates
//! every line and then dispatches the lines one by one through a
//! [`shell::Shell`]. Execution stops at the first line that fails.

pub mod executor;
pub mod shell;

pub use executor::{
    ExecError, ExecutionListener, ExecutionPlan, Executor, ExecutorOptions, ExitOutcome,
    PlannedStep, PreparedLine,
};
pub use shell::{Invocation, Shell, ShellError, SystemShell};
