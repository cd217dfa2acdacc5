//! # wikisynth
//!
//! Turns an arbitrary block of source text into a Wikipedia-style article by
//! driving a chat-completion model through a fixed chain of dependent stages.
//!
//! ## Features
//!
//! - **Staged pipeline**: statistics, title, subsections, and one section,
//!   each prompt built from the previous stages' output
//! - **Exact token accounting**: reproduces the `gpt-3.5-turbo-0301` prompt
//!   cost formula over its byte-pair encoding
//! - **Swappable transport**: any [`CompletionClient`] can back a pipeline,
//!   so retry or rate-limit policies wrap the client, not the pipeline
//! - **Typed failures**: every stage error carries the failing [`Stage`]

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]

pub mod cli;
pub mod client;
pub mod core;
pub mod error;
pub mod io;
pub mod parsing;
pub mod pipeline;
pub mod tokens;

// Re-export commonly used types at crate root
pub use error::{CompletionError, Error, ParseError, Result};

// Re-export core domain types
pub use crate::core::{Message, PipelineContext, PipelineState, Role, Stage, StageOutput};

// Re-export pipeline types
pub use pipeline::{Pipeline, RunParameters};

// Re-export client types
#[cfg(feature = "openai")]
pub use client::OpenAiClient;
pub use client::{ClientConfig, CompletionClient};

// Re-export accounting and parsing helpers
pub use parsing::{parse_list, parse_text};
pub use tokens::{GPT_35_TURBO_0301, TokenEstimator, estimate};

// Re-export CLI types
pub use cli::{Cli, Commands, OutputFormat};
