//! `ladle watch` -- rerun a recipe whenever watched files change.
//!
//! The ladlefile is reparsed before every run so edits to it take effect
//! without restarting. A failing run is reported and watching continues.

use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use tracing::debug;

use ladle_ui::styles::{
    render_accent, render_fail, render_fail_icon, render_muted, render_pass, render_pass_icon,
};
use ladle_watch::WatchOptions;

use crate::cli::WatchArgs;
use crate::commands::run::{check_outcome, execute};
use crate::context::{RuntimeContext, load_from};

/// Execute the `ladle watch` command.
pub fn run(ctx: &RuntimeContext, args: &WatchArgs) -> Result<()> {
    let path = ctx.ladlefile_path()?;
    // Fail fast on a ladlefile that cannot be used at all.
    load_from(&path)?;

    let base = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let paths = watch_paths(&args.paths, &ctx.config.watch.paths, &base);
    let debounce = Duration::from_millis(args.debounce_ms.unwrap_or(ctx.config.watch.debounce_ms));

    let shown: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
    eprintln!(
        "{} watching {} for `{}` (Ctrl-C to stop)",
        render_accent("ladle"),
        shown.join(", "),
        args.recipe
    );

    let options = WatchOptions::new(paths, debounce);
    ladle_watch::watch(&options, |changed| {
        if !changed.is_empty() {
            debug!(?changed, "rerunning");
        }
        run_once(ctx, &path, args);
        ControlFlow::Continue(())
    })?;
    Ok(())
}

/// `--path` values as given; otherwise configured paths relative to the
/// ladlefile directory; otherwise the ladlefile directory itself.
fn watch_paths(flags: &[PathBuf], configured: &[String], base: &Path) -> Vec<PathBuf> {
    if !flags.is_empty() {
        return flags.to_vec();
    }
    if !configured.is_empty() {
        return configured.iter().map(|p| base.join(p)).collect();
    }
    vec![base.to_path_buf()]
}

fn run_once(ctx: &RuntimeContext, path: &Path, args: &WatchArgs) {
    let stamp = render_muted(&format!("[{}]", Local::now().format("%H:%M:%S")));
    let result = load_from(path).and_then(|file| {
        let outcome = execute(ctx, &file, &args.recipe, &args.args, false, args.quiet)?;
        check_outcome(outcome, &file)
    });
    match result {
        Ok(()) => eprintln!(
            "{stamp} {} {}",
            render_pass_icon(),
            render_pass(&format!("`{}` succeeded", args.recipe))
        ),
        Err(e) => eprintln!("{stamp} {} {}", render_fail_icon(), render_fail(&format!("{e:#}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn flag_paths_win() {
        let paths = watch_paths(&[PathBuf::from("src")], &["docs".into()], Path::new("/repo"));
        assert_eq!(paths, vec![PathBuf::from("src")]);
    }

    #[test]
    fn configured_paths_are_relative_to_ladlefile() {
        let paths = watch_paths(&[], &["src".into(), "tests".into()], Path::new("/repo"));
        assert_eq!(paths, vec![PathBuf::from("/repo/src"), PathBuf::from("/repo/tests")]);
    }

    #[test]
    fn defaults_to_ladlefile_directory() {
        assert_eq!(watch_paths(&[], &[], Path::new("/repo")), vec![PathBuf::from("/repo")]);
    }
}
