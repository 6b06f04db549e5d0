//! `ladle version`.

use std::fmt;

use anyhow::Result;
use serde::Serialize;

use crate::context::RuntimeContext;
use crate::output::output_json;

/// Set `LADLE_BUILD` when compiling release artifacts to stamp them.
const BUILD: Option<&str> = option_env!("LADLE_BUILD");

#[derive(Debug, Serialize)]
struct VersionInfo {
    version: &'static str,
    build: &'static str,
    os: &'static str,
    arch: &'static str,
}

impl VersionInfo {
    fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            build: BUILD.unwrap_or("dev"),
            os: std::env::consts::OS,
            arch: std::env::consts::ARCH,
        }
    }
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ladle version {} ({}) {}/{}",
            self.version, self.build, self.os, self.arch
        )
    }
}

pub fn run(ctx: &RuntimeContext) -> Result<()> {
    let info = VersionInfo::current();
    if ctx.json {
        output_json(&info);
    } else {
        println!("{info}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_platform() {
        let info = VersionInfo {
            version: "1.2.3",
            build: "abc123",
            os: "linux",
            arch: "x86_64",
        };
        assert_eq!(info.to_string(), "ladle version 1.2.3 (abc123) linux/x86_64");
        assert!(!VersionInfo::current().version.is_empty());
    }
}
