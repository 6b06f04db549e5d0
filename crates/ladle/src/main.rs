//! `ladle` -- recipe runner CLI.
//!
//! Parses CLI arguments with clap, layers configuration, and dispatches to
//! command handlers.

mod cli;
mod commands;
mod context;
mod interrupt;
mod output;

use clap::Parser;

use cli::{Cli, Commands};
use context::RuntimeContext;
use ladle_ui::styles::render_error_prefix;
use output::RecipeFailed;

fn main() {
    interrupt::install_handler();

    let cli = Cli::parse();

    if cli.global.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                "ladle=debug,ladle_core=debug,ladle_exec=debug,ladle_config=debug,ladle_watch=debug",
            )
            .with_writer(std::io::stderr)
            .init();
    }

    let result = ladle_config::load_config()
        .map_err(anyhow::Error::from)
        .and_then(|config| {
            let ctx = RuntimeContext::from_global_args(&cli.global, config);
            ladle_ui::terminal::set_color_mode(ctx.color);
            dispatch(&ctx, cli.command)
        });

    if let Err(e) = result {
        let code = e.downcast_ref::<RecipeFailed>().map_or(1, |f| f.code);
        if cli.global.json {
            let mut err_json = serde_json::json!({
                "error": format!("{:#}", e),
            });
            if let Some(failed) = e.downcast_ref::<RecipeFailed>() {
                err_json["recipe"] = serde_json::json!(failed.recipe);
                err_json["code"] = serde_json::json!(failed.code);
            }
            if let Ok(s) = serde_json::to_string_pretty(&err_json) {
                eprintln!("{}", s);
            }
        } else {
            eprintln!("{} {:#}", render_error_prefix(), e);
        }
        std::process::exit(code);
    }
}

fn dispatch(ctx: &RuntimeContext, command: Option<Commands>) -> anyhow::Result<()> {
    match command {
        Some(Commands::Run(args)) => commands::run::run(ctx, &args),
        Some(Commands::List(args)) => commands::list::run(ctx, &args),
        Some(Commands::Show(args)) => commands::show::run(ctx, &args),
        Some(Commands::Variables) => commands::variables::run(ctx),
        Some(Commands::Check) => commands::check::run(ctx),
        Some(Commands::Watch(args)) => commands::watch::run(ctx, &args),
        Some(Commands::Completion(args)) => commands::completion::run(ctx, &args),
        Some(Commands::Version) => commands::version::run(ctx),
        // No subcommand -- list recipes
        None => commands::list::run_default(ctx),
    }
}
