//! Command handlers, one module per subcommand.

pub mod check;
pub mod completion;
pub mod list;
pub mod run;
pub mod show;
pub mod variables;
pub mod version;
pub mod watch;
