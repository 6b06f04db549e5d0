//! Ctrl-C handling.
//!
//! While a recipe line is running the terminal delivers SIGINT to the child
//! as well, so ladle ignores it and reports the child's exit instead. With no
//! child running (for example while `ladle watch` waits for changes) the
//! interrupt ends ladle directly.

use std::sync::atomic::{AtomicBool, Ordering};

use ladle_exec::{Invocation, Shell, ShellError};

/// Exit code used when interrupted between lines.
pub const INTERRUPTED_EXIT: i32 = 130;

static CHILD_RUNNING: AtomicBool = AtomicBool::new(false);

/// Install the process-wide Ctrl-C handler.
pub fn install_handler() {
    let _ = ctrlc::set_handler(|| {
        if !CHILD_RUNNING.load(Ordering::SeqCst) {
            std::process::exit(INTERRUPTED_EXIT);
        }
    });
}

/// Marks the time spent inside `inner.run` as "child running".
pub struct GuardedShell<S> {
    inner: S,
}

impl<S: Shell> GuardedShell<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

struct RunningGuard;

impl RunningGuard {
    fn enter() -> Self {
        CHILD_RUNNING.store(true, Ordering::SeqCst);
        Self
    }
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        CHILD_RUNNING.store(false, Ordering::SeqCst);
    }
}

impl<S: Shell> Shell for GuardedShell<S> {
    fn run(&self, invocation: &Invocation<'_>) -> Result<i32, ShellError> {
        let _guard = RunningGuard::enter();
        self.inner.run(invocation)
    }

    fn describe(&self) -> String {
        self.inner.describe()
    }
}
