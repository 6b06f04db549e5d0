//! Core engine for ladle.
//!
//! A ladlefile declares variables and named, parameterized recipes made of
//! shell lines. This crate turns that text into a [`types::Ladlefile`],
//! expands `{{name}}` placeholders, and computes the dependency-ordered list
//! of recipes to run for a target. Running them is `ladle-exec`'s job.

pub mod error;
pub mod interpolate;
pub mod parser;
pub mod planner;
pub mod types;
pub mod variables;
