//! Prompt builders for each pipeline stage.
//!
//! Each builder formats the instruction block followed by labelled inputs.
//! Length and count limits are stated to the model here and nowhere else;
//! responses are not checked against them.

use crate::core::Stage;

/// Minimum section length requested of the model, in tokens.
pub const SECTION_MIN_TOKENS: usize = 100;

/// Maximum section length requested of the model, in tokens.
pub const SECTION_MAX_TOKENS: usize = 500;

/// Builds the STATISTICS prompt from raw source text.
#[must_use]
pub fn build_statistics_prompt(info: &str) -> String {
    format!(
        "Summarize this information in a list of facts. \
         Be as detailed as possible without being redundant.\n\n\
         Information: {info}\n"
    )
}

/// Builds the TITLE prompt.
#[must_use]
pub fn build_title_prompt(info: &str) -> String {
    format!(
        "What would the title of a Wikipedia article about this information be?\n\
         The answer MUST be a single concept.\n\
         The answer MUST be a single string.\n\n\
         Information: {info}\n"
    )
}

/// Builds the SUBSECTIONS prompt, asking for at most `max_subsections` labels.
#[must_use]
pub fn build_subsections_prompt(info: &str, title: &str, max_subsections: usize) -> String {
    format!(
        "What would the subsections of a Wikipedia article about this information be?\n\
         Subsections should NOT cover the same concept.\n\
         The answer MUST be NO MORE THAN {max_subsections} subsections.\n\
         The answer MUST be formatted as a comma-separated list of strings.\n\n\
         Title: {title}\n\
         Information: {info}\n"
    )
}

/// Builds the SECTION prompt for one subsection.
#[must_use]
pub fn build_section_prompt(info: &str, title: &str, subsection: &str) -> String {
    format!(
        "Write a section of a Wikipedia article about this information.\n\
         The answer MUST be a single paragraph.\n\
         The answer MUST be at LEAST {SECTION_MIN_TOKENS} and at MOST {SECTION_MAX_TOKENS} tokens long.\n\n\
         Title: {title}\n\
         Subsection: {subsection}\n\
         Information: {info}\n"
    )
}

/// Inputs for rendering any stage's prompt outside a pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PromptInputs<'a> {
    /// Source text for STATISTICS, or statistics for later stages.
    pub info: &'a str,
    /// Article title.
    pub title: &'a str,
    /// Selected subsection label.
    pub subsection: &'a str,
    /// Requested subsection bound.
    pub max_subsections: usize,
}

/// Renders the prompt for `stage` from free-standing inputs.
#[must_use]
pub fn build_prompt(stage: Stage, inputs: &PromptInputs<'_>) -> String {
    match stage {
        Stage::Statistics => build_statistics_prompt(inputs.info),
        Stage::Title => build_title_prompt(inputs.info),
        Stage::Subsections => {
            build_subsections_prompt(inputs.info, inputs.title, inputs.max_subsections)
        }
        Stage::Section => build_section_prompt(inputs.info, inputs.title, inputs.subsection),
    }
}
