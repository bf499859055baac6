//! Image matching for game automation
//!
//! Reference images live in a directory and are addressed by file stem.
//! Matching uses normalized cross-correlation on grayscale frames.

pub mod matcher;
pub mod template;

#[cfg(test)]
mod tests;

// Re-export main types and functions
pub use matcher::best_match;
pub use template::{Template, TemplateLibrary};
