//! `ladle completion SHELL` -- print a completion script to stdout.

use std::io;

use anyhow::Result;
use clap::CommandFactory;

use crate::cli::{Cli, CompletionArgs};
use crate::context::RuntimeContext;

pub fn run(_ctx: &RuntimeContext, args: &CompletionArgs) -> Result<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(args.shell, &mut cmd, name, &mut io::stdout().lock());
    Ok(())
}
