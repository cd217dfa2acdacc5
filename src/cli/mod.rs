//! CLI layer for wikisynth.
//!
//! Provides the command-line interface using clap, with commands for
//! generating an article, estimating prompt tokens, and previewing prompts.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::OutputFormat;
pub use parser::{Cli, Commands};
