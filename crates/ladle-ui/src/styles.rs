//! Ayu colour theme and styling functions for ladle output.
//!
//! Uses the Ayu Dark palette. Colour source:
//! <https://github.com/ayu-theme/ayu-colors>
//!
//! Recipe names are accented, parameters get a warm tone, docs and
//! defaults are muted. Echoed command lines are bold so they stand apart
//! from the output of the commands themselves.

use owo_colors::OwoColorize;

use ladle_core::parser::quote;
use ladle_core::types::Parameter;

use crate::terminal::{stderr_supports_color, supports_color};

// ---------------------------------------------------------------------------
// Ayu Dark colour palette (RGB values)
// ---------------------------------------------------------------------------

const PASS: (u8, u8, u8) = (0xc2, 0xd9, 0x4c); // #c2d94c - bright green
const WARN: (u8, u8, u8) = (0xff, 0xb4, 0x54); // #ffb454 - bright yellow
const FAIL: (u8, u8, u8) = (0xf0, 0x71, 0x78); // #f07178 - bright red
const MUTED: (u8, u8, u8) = (0x6c, 0x76, 0x80); // #6c7680 - muted gray
const ACCENT: (u8, u8, u8) = (0x59, 0xc2, 0xff); // #59c2ff - bright blue
const PARAM: (u8, u8, u8) = (0xff, 0x8f, 0x40); // #ff8f40 - orange

// General icons
pub const ICON_PASS: &str = "\u{2713}";
pub const ICON_WARN: &str = "\u{26A0}";
pub const ICON_FAIL: &str = "\u{2716}";
pub const ICON_ARROW: &str = "\u{2192}";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn color_str(s: &str, rgb: (u8, u8, u8)) -> String {
    if supports_color() {
        s.truecolor(rgb.0, rgb.1, rgb.2).to_string()
    } else {
        s.to_string()
    }
}

fn color_bold_str(s: &str, rgb: (u8, u8, u8)) -> String {
    if supports_color() {
        s.truecolor(rgb.0, rgb.1, rgb.2).bold().to_string()
    } else {
        s.to_string()
    }
}

// ---------------------------------------------------------------------------
// Core semantic render helpers
// ---------------------------------------------------------------------------

pub fn render_pass(s: &str) -> String {
    color_str(s, PASS)
}

pub fn render_warn(s: &str) -> String {
    color_str(s, WARN)
}

pub fn render_fail(s: &str) -> String {
    color_str(s, FAIL)
}

pub fn render_muted(s: &str) -> String {
    color_str(s, MUTED)
}

pub fn render_accent(s: &str) -> String {
    color_str(s, ACCENT)
}

pub fn render_bold(s: &str) -> String {
    if supports_color() {
        s.bold().to_string()
    } else {
        s.to_string()
    }
}

/// Section header, e.g. `Available recipes:`.
pub fn render_category(s: &str) -> String {
    color_bold_str(s, ACCENT)
}

pub fn render_pass_icon() -> String {
    color_str(ICON_PASS, PASS)
}

pub fn render_fail_icon() -> String {
    color_str(ICON_FAIL, FAIL)
}

// ---------------------------------------------------------------------------
// Recipe rendering
// ---------------------------------------------------------------------------

pub fn render_recipe_name(name: &str) -> String {
    color_bold_str(name, ACCENT)
}

/// `*$name="default"` with the sigils and default muted.
pub fn render_parameter(param: &Parameter) -> String {
    let mut out = String::new();
    if param.variadic {
        out.push_str(&render_muted("*"));
    }
    if param.export {
        out.push_str(&render_muted("$"));
    }
    out.push_str(&color_str(&param.name, PARAM));
    if let Some(ref default) = param.default {
        out.push_str(&render_muted(&format!("={}", quote(default))));
    }
    out
}

/// `# doc` trailer used in listings.
pub fn render_doc(doc: &str) -> String {
    render_muted(&format!("# {doc}"))
}

/// A command line echoed to stderr before it runs.
pub fn render_command_line(line: &str) -> String {
    if stderr_supports_color() {
        line.bold().to_string()
    } else {
        line.to_string()
    }
}

/// `error:` prefix for stderr diagnostics.
pub fn render_error_prefix() -> String {
    if stderr_supports_color() {
        "error:".truecolor(FAIL.0, FAIL.1, FAIL.2).bold().to_string()
    } else {
        "error:".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::{ColorMode, set_color_mode};
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_parameter_rendering() {
        set_color_mode(ColorMode::Never);
        let mut param = Parameter::new("flags");
        param.variadic = true;
        param.default = Some("--all".into());
        assert_eq!(render_parameter(&param), "*flags=\"--all\"");

        let mut exported = Parameter::new("env");
        exported.export = true;
        assert_eq!(render_parameter(&exported), "$env");
    }

    #[test]
    fn plain_helpers_pass_text_through() {
        set_color_mode(ColorMode::Never);
        assert_eq!(render_doc("Build it"), "# Build it");
        assert_eq!(render_command_line("cargo build"), "cargo build");
        assert_eq!(render_error_prefix(), "error:");
        assert_eq!(render_fail_icon(), ICON_FAIL);
        assert_eq!(render_fail("boom"), "boom");
    }
}
