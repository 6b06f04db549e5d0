//! Terminal UI components for ladle.
//!
//! Ayu-themed colour styling, terminal detection, and the renderers for
//! recipe listings and echoed command lines.

pub mod listing;
pub mod styles;
pub mod terminal;
