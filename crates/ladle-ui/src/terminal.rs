//! Terminal detection utilities.

use std::env;
use std::io;
use std::sync::atomic::{AtomicU8, Ordering};

use crossterm::tty::IsTty;

/// Colour policy chosen by the user. `Auto` defers to the environment and
/// TTY detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

static COLOR_MODE: AtomicU8 = AtomicU8::new(0);

/// Set the process-wide colour policy.
pub fn set_color_mode(mode: ColorMode) {
    let raw = match mode {
        ColorMode::Auto => 0,
        ColorMode::Always => 1,
        ColorMode::Never => 2,
    };
    COLOR_MODE.store(raw, Ordering::Relaxed);
}

pub fn color_mode() -> ColorMode {
    match COLOR_MODE.load(Ordering::Relaxed) {
        1 => ColorMode::Always,
        2 => ColorMode::Never,
        _ => ColorMode::Auto,
    }
}

/// Returns `true` if stdout is connected to a terminal (TTY).
pub fn is_tty() -> bool {
    io::stdout().is_tty()
}

/// Returns `true` if stderr is connected to a terminal.
pub fn is_stderr_tty() -> bool {
    io::stderr().is_tty()
}

/// Whether ANSI colour should be used for stdout.
///
/// An explicit [`ColorMode`] wins. Otherwise:
/// - `NO_COLOR` (any value) disables colour (<https://no-color.org/>)
/// - `CLICOLOR=0` disables colour
/// - `TERM=dumb` disables colour
/// - `CLICOLOR_FORCE` (any value) forces colour even in non-TTY
/// - falls back to TTY detection
pub fn supports_color() -> bool {
    color_allowed(is_tty)
}

/// Same policy as [`supports_color`], checked against stderr.
pub fn stderr_supports_color() -> bool {
    color_allowed(is_stderr_tty)
}

fn color_allowed(tty: fn() -> bool) -> bool {
    match color_mode() {
        ColorMode::Always => return true,
        ColorMode::Never => return false,
        ColorMode::Auto => {}
    }
    if env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if env::var("CLICOLOR").as_deref() == Ok("0") {
        return false;
    }
    if env::var("TERM").as_deref() == Ok("dumb") {
        return false;
    }
    if env::var_os("CLICOLOR_FORCE").is_some() {
        return true;
    }
    tty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_overrides_detection() {
        set_color_mode(ColorMode::Never);
        assert!(!supports_color());
        assert!(!stderr_supports_color());
        assert_eq!(color_mode(), ColorMode::Never);
    }
}
