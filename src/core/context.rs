//! Pipeline run state.
//!
//! A [`PipelineContext`] accumulates stage results for exactly one run. It is
//! created empty, filled one stage at a time in fixed order, and frozen once
//! the run reaches [`PipelineState::Done`] or [`PipelineState::Failed`].

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One generation step of the pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    /// Fact summary of the source text.
    Statistics,
    /// Article title.
    Title,
    /// Bounded list of subsection labels.
    Subsections,
    /// Prose for one selected subsection.
    Section,
}

impl Stage {
    /// All stages in execution order.
    pub const ALL: [Self; 4] = [Self::Statistics, Self::Title, Self::Subsections, Self::Section];

    /// Returns the stage name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Statistics => "STATISTICS",
            Self::Title => "TITLE",
            Self::Subsections => "SUBSECTIONS",
            Self::Section => "SECTION",
        }
    }

    /// Parses a stage name, case-insensitively.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(s))
    }

    /// Returns the stage that runs after this one.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Statistics => Some(Self::Title),
            Self::Title => Some(Self::Subsections),
            Self::Subsections => Some(Self::Section),
            Self::Section => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of a run in the stage state machine.
///
/// `Init -> Running(Statistics) -> ... -> Running(Section) -> Done`, with
/// `Failed` reachable from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "stage", rename_all = "snake_case")]
pub enum PipelineState {
    /// No stage has started.
    #[default]
    Init,
    /// The named stage is in progress.
    Running(Stage),
    /// Every stage succeeded.
    Done,
    /// The named stage failed; no further stages run.
    Failed(Stage),
}

impl PipelineState {
    /// Returns true for `Done` and `Failed`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed(_))
    }
}

/// Successful payload of a single stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutput {
    /// Trimmed completion text.
    Text(String),
    /// Ordered list parsed from the completion.
    List(Vec<String>),
}

/// Accumulator of all stage results for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineContext {
    /// Fact summary produced by STATISTICS.
    pub statistics: Option<String>,

    /// Title produced by TITLE.
    pub title: Option<String>,

    /// Ordered subsection labels produced by SUBSECTIONS.
    pub subsections: Option<Vec<String>>,

    /// Prose produced by SECTION.
    pub section: Option<String>,

    /// Estimated prompt tokens sent per stage.
    #[serde(default)]
    pub prompt_tokens: BTreeMap<Stage, usize>,

    /// Current state machine position.
    #[serde(default)]
    pub state: PipelineState,
}

impl PipelineContext {
    /// Creates an empty context in the `Init` state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true once every stage has completed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state == PipelineState::Done
    }

    /// Marks `stage` as in progress.
    pub(crate) fn begin(&mut self, stage: Stage) {
        self.state = PipelineState::Running(stage);
    }

    /// Stores a stage's output and advances the state machine.
    ///
    /// Fails with [`Error::InvalidState`], leaving the context untouched, if
    /// the output shape does not belong to `stage`.
    pub(crate) fn record(&mut self, stage: Stage, output: StageOutput) -> Result<()> {
        match (stage, output) {
            (Stage::Statistics, StageOutput::Text(text)) => self.statistics = Some(text),
            (Stage::Title, StageOutput::Text(text)) => self.title = Some(text),
            (Stage::Section, StageOutput::Text(text)) => self.section = Some(text),
            (Stage::Subsections, StageOutput::List(list)) => self.subsections = Some(list),
            (stage, output) => {
                return Err(Error::InvalidState {
                    message: format!("stage {stage} cannot store {output:?}"),
                });
            }
        }
        self.state = match stage.next() {
            Some(next) => PipelineState::Running(next),
            None => PipelineState::Done,
        };
        Ok(())
    }

    /// Moves the run into the absorbing failure state.
    pub(crate) fn fail(&mut self, stage: Stage) {
        self.state = PipelineState::Failed(stage);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_context_is_empty() {
        let ctx = PipelineContext::new();
        assert_eq!(ctx.state, PipelineState::Init);
        assert!(ctx.statistics.is_none());
        assert!(ctx.subsections.is_none());
        assert!(!ctx.is_complete());
    }

    #[test]
    fn test_stage_order() {
        assert_eq!(Stage::Statistics.next(), Some(Stage::Title));
        assert_eq!(Stage::Title.next(), Some(Stage::Subsections));
        assert_eq!(Stage::Subsections.next(), Some(Stage::Section));
        assert_eq!(Stage::Section.next(), None);
    }

    #[test]
    fn test_stage_parse() {
        assert_eq!(Stage::parse("title"), Some(Stage::Title));
        assert_eq!(Stage::parse("SECTION"), Some(Stage::Section));
        assert_eq!(Stage::parse("intro"), None);
    }

    #[test]
    fn test_record_advances_state() {
        let mut ctx = PipelineContext::new();
        ctx.begin(Stage::Statistics);
        ctx.record(Stage::Statistics, StageOutput::Text("facts".to_string()))
            .unwrap();
        assert_eq!(ctx.statistics.as_deref(), Some("facts"));
        assert_eq!(ctx.state, PipelineState::Running(Stage::Title));

        ctx.record(Stage::Title, StageOutput::Text("T".to_string()))
            .unwrap();
        ctx.record(
            Stage::Subsections,
            StageOutput::List(vec!["A".to_string()]),
        )
        .unwrap();
        ctx.record(Stage::Section, StageOutput::Text("P".to_string()))
            .unwrap();
        assert!(ctx.is_complete());
        assert!(ctx.state.is_terminal());
    }

    #[test]
    fn test_record_rejects_mismatched_output() {
        let mut ctx = PipelineContext::new();
        ctx.begin(Stage::Subsections);
        let err = ctx
            .record(Stage::Subsections, StageOutput::Text("A, B".to_string()))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidState { .. }));
        assert!(err.to_string().contains("SUBSECTIONS"));
        assert!(ctx.subsections.is_none());
        assert_eq!(ctx.state, PipelineState::Running(Stage::Subsections));

        let err = ctx
            .record(Stage::Title, StageOutput::List(vec!["T".to_string()]))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidState { .. }));
        assert!(ctx.title.is_none());
    }

    #[test]
    fn test_fail_is_terminal() {
        let mut ctx = PipelineContext::new();
        ctx.fail(Stage::Title);
        assert_eq!(ctx.state, PipelineState::Failed(Stage::Title));
        assert!(ctx.state.is_terminal());
        assert!(!ctx.is_complete());
    }

    #[test]
    fn test_context_serializes_stage_keys() {
        let mut ctx = PipelineContext::new();
        ctx.prompt_tokens.insert(Stage::Title, 42);
        let json = serde_json::to_string(&ctx).unwrap();
        assert!(json.contains(r#""TITLE":42"#));
        assert!(json.contains(r#""state":"init""#));
    }
}
