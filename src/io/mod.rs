//! I/O utilities for wikisynth.
//!
//! Loads source text from files or standard input.

pub mod source;

pub use source::{read_file, read_source, read_to_string};
