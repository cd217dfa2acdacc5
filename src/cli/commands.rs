//! CLI command implementations.
//!
//! Contains the business logic for each CLI command.

use crate::client::{ClientConfig, CompletionClient, EnvFile, create_client};
use crate::cli::output::{
    EstimateReport, OutputFormat, format_context, format_estimate, format_prompt,
};
use crate::cli::parser::{Cli, Commands};
use crate::core::{Message, Role, Stage};
use crate::error::{CommandError, Result};
use crate::io::read_source;
use crate::pipeline::prompts::{PromptInputs, build_prompt};
use crate::pipeline::{Pipeline, RunParameters};
use crate::tokens::TokenEstimator;
use std::path::Path;

/// Executes the CLI command.
///
/// # Arguments
///
/// * `cli` - Parsed CLI arguments.
///
/// # Returns
///
/// Result with output string on success.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);

    match &cli.command {
        Commands::Generate {
            file,
            subsections,
            section,
            temperature,
            api_key,
            api_base,
            env_file,
        } => {
            let env_file = env_file.as_deref().map(EnvFile::load).transpose()?;
            let config =
                ClientConfig::resolve(api_key.as_deref(), api_base.as_deref(), env_file.as_ref())?;
            let params = RunParameters::new(*subsections, *section)
                .with_model(cli.model.clone())
                .with_temperature(*temperature);
            // Reject the model before blocking on stdin.
            TokenEstimator::new(&params.model)?;
            let source = read_source(file.as_deref())?;
            cmd_generate(create_client(config)?, &source, params, format)
        }
        Commands::Estimate { file, role, name } => {
            cmd_estimate(&cli.model, file.as_deref(), role, name.as_deref(), format)
        }
        Commands::Prompt {
            stage,
            file,
            title,
            subsection,
            subsections,
        } => {
            let inputs = PromptInputs {
                info: "",
                title,
                subsection,
                max_subsections: *subsections,
            };
            cmd_prompt(&cli.model, stage, file.as_deref(), inputs, format)
        }
    }
}

// ==================== Command Implementations ====================

/// Runs the full pipeline over `source` with the given client.
///
/// # Errors
///
/// Returns the first stage failure, tagged with its stage.
pub fn cmd_generate<C: CompletionClient>(
    client: C,
    source: &str,
    params: RunParameters,
    format: OutputFormat,
) -> Result<String> {
    let pipeline = Pipeline::new(client, params)?;
    let ctx = pipeline.run(source)?;
    Ok(format_context(&ctx, format))
}

fn cmd_estimate(
    model: &str,
    file: Option<&Path>,
    role: &str,
    name: Option<&str>,
    format: OutputFormat,
) -> Result<String> {
    let role = Role::parse(role).ok_or_else(|| {
        CommandError::InvalidArgument(format!(
            "unknown role '{role}' (expected system, user, or assistant)"
        ))
    })?;
    let estimator = TokenEstimator::new(model)?;
    let content = read_source(file)?;

    let mut message = Message::new(role, content);
    if let Some(name) = name {
        message = message.with_name(name);
    }
    let tokens = estimator.estimate(std::slice::from_ref(&message));

    let report = EstimateReport {
        model,
        role: role.as_str(),
        characters: message.content.chars().count(),
        tokens,
    };
    Ok(format_estimate(&report, format))
}

fn cmd_prompt(
    model: &str,
    stage: &str,
    file: Option<&Path>,
    inputs: PromptInputs<'_>,
    format: OutputFormat,
) -> Result<String> {
    let stage = Stage::parse(stage).ok_or_else(|| {
        CommandError::InvalidArgument(format!(
            "unknown stage '{stage}' (expected statistics, title, subsections, or section)"
        ))
    })?;
    let estimator = TokenEstimator::new(model)?;
    let info = read_source(file)?;

    let prompt = build_prompt(
        stage,
        &PromptInputs {
            info: info.trim(),
            ..inputs
        },
    );
    let tokens = estimator.estimate(&[Message::user(prompt.as_str())]);
    Ok(format_prompt(stage, &prompt, tokens, format))
}
