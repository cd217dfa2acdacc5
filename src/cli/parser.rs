//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use crate::tokens::GPT_35_TURBO_0301;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// wikisynth: turn raw notes into a Wikipedia-style article with a
/// language model.
///
/// Runs a fixed chain of generation stages (statistics, title, subsections,
/// section) and reports the prompt-token cost of every request.
#[derive(Parser, Debug)]
#[command(name = "wikisynth")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Model identifier used for requests and token accounting.
    #[arg(short, long, env = "WIKISYNTH_MODEL", default_value = GPT_35_TURBO_0301, global = true)]
    pub model: String,

    /// Enable verbose output (per-request log lines on stderr).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate an article from source text.
    Generate {
        /// Source text file (reads stdin if omitted or `-`).
        file: Option<PathBuf>,

        /// Maximum number of subsections to request.
        #[arg(short = 'n', long, default_value = "6")]
        subsections: usize,

        /// Index of the subsection to write a section for.
        #[arg(short, long, default_value = "0")]
        section: usize,

        /// Sampling temperature.
        #[arg(short, long, default_value = "1.0")]
        temperature: f32,

        /// API key.
        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Base URL of an OpenAI-compatible API.
        #[arg(long, env = "OPENAI_API_BASE")]
        api_base: Option<String>,

        /// Read `OPENAI_API_KEY`/`OPENAI_API_BASE` from a dotenv-style file.
        #[arg(long)]
        env_file: Option<PathBuf>,
    },

    /// Count prompt tokens for text sent as a single message.
    Estimate {
        /// Text file (reads stdin if omitted or `-`).
        file: Option<PathBuf>,

        /// Message role (system, user, assistant).
        #[arg(short, long, default_value = "user")]
        role: String,

        /// Optional participant name.
        #[arg(long)]
        name: Option<String>,
    },

    /// Render the prompt a stage would send, without calling the model.
    Prompt {
        /// Stage name (statistics, title, subsections, section).
        stage: String,

        /// Information text file (reads stdin if omitted or `-`).
        file: Option<PathBuf>,

        /// Article title (subsections, section).
        #[arg(long, default_value = "")]
        title: String,

        /// Subsection label (section).
        #[arg(long, default_value = "")]
        subsection: String,

        /// Maximum number of subsections to request (subsections).
        #[arg(short = 'n', long, default_value = "6")]
        subsections: usize,
    },
}
