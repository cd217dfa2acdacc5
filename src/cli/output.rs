//! Output formatting for CLI commands.
//!
//! Supports text and JSON output formats.

use crate::core::{PipelineContext, PipelineState, Stage};
use crate::error::Error;
use serde::Serialize;
use std::fmt::Write;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output.
    Json,
}

impl OutputFormat {
    /// Parses format from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Formats a pipeline context.
#[must_use]
pub fn format_context(ctx: &PipelineContext, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_context_text(ctx),
        OutputFormat::Json => format_json(ctx),
    }
}

fn format_context_text(ctx: &PipelineContext) -> String {
    let mut output = String::new();

    if let Some(ref title) = ctx.title {
        let _ = writeln!(output, "{title}");
        output.push_str(&"=".repeat(title.chars().count().max(3)));
        output.push_str("\n\n");
    }
    if let Some(ref stats) = ctx.statistics {
        output.push_str("Statistics:\n");
        for line in stats.lines() {
            let _ = writeln!(output, "  {line}");
        }
        output.push('\n');
    }
    if let Some(ref subsections) = ctx.subsections {
        output.push_str("Subsections:\n");
        for (i, label) in subsections.iter().enumerate() {
            let _ = writeln!(output, "  [{i}] {label}");
        }
        output.push('\n');
    }
    if let Some(ref section) = ctx.section {
        output.push_str("Section:\n");
        let _ = writeln!(output, "{section}");
        output.push('\n');
    }

    if !ctx.prompt_tokens.is_empty() {
        output.push_str("Prompt tokens:\n");
        for (stage, tokens) in &ctx.prompt_tokens {
            let _ = writeln!(output, "  {:<12} {tokens}", stage.as_str());
        }
        let total: usize = ctx.prompt_tokens.values().sum();
        let _ = writeln!(output, "  {:<12} {total}", "TOTAL");
    }

    if let PipelineState::Failed(stage) = ctx.state {
        let _ = writeln!(output, "\nRun failed at stage {stage}.");
    }

    output
}

/// Token estimate for one message.
#[derive(Debug, Clone, Serialize)]
pub struct EstimateReport<'a> {
    /// Model the estimate applies to.
    pub model: &'a str,
    /// Message role.
    pub role: &'a str,
    /// Characters in the message content.
    pub characters: usize,
    /// Estimated prompt tokens, including reply priming.
    pub tokens: usize,
}

/// Formats a token estimate.
#[must_use]
pub fn format_estimate(report: &EstimateReport<'_>, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = String::new();
            let _ = writeln!(output, "Model:      {}", report.model);
            let _ = writeln!(output, "Role:       {}", report.role);
            let _ = writeln!(output, "Characters: {}", report.characters);
            let _ = writeln!(output, "Tokens:     {}", report.tokens);
            output
        }
        OutputFormat::Json => format_json(report),
    }
}

/// Formats a rendered prompt with its token estimate.
#[must_use]
pub fn format_prompt(stage: Stage, prompt: &str, tokens: usize, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = String::new();
            let _ = writeln!(output, "Stage {stage} ({tokens} tokens):");
            output.push_str("---\n");
            output.push_str(prompt);
            if !prompt.ends_with('\n') {
                output.push('\n');
            }
            output.push_str("---\n");
            output
        }
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct PromptOutput<'a> {
                stage: Stage,
                tokens: usize,
                prompt: &'a str,
            }
            format_json(&PromptOutput {
                stage,
                tokens,
                prompt,
            })
        }
    }
}

/// Formats an error for display.
#[must_use]
pub fn format_error(err: &Error, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => err.to_string(),
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct ErrorOutput {
                error: String,
                #[serde(skip_serializing_if = "Option::is_none")]
                stage: Option<Stage>,
            }
            format_json(&ErrorOutput {
                error: err.to_string(),
                stage: err.stage(),
            })
        }
    }
}

/// Formats a value as JSON.
fn format_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}
