//! Staged article generation.
//!
//! A [`Pipeline`] runs four dependent generation stages in a fixed order:
//!
//! ```text
//! source text ─► STATISTICS ─► TITLE ─► SUBSECTIONS ─► SECTION
//!                    │            ▲          ▲             ▲
//!                    └────────────┴──────────┴─────────────┘
//!                         statistics feed every later stage
//! ```
//!
//! Each stage renders a prompt from earlier results, wraps it as one user
//! message, logs its token estimate, calls the [`CompletionClient`], and
//! parses the reply into the [`PipelineContext`]. The first failure stops the
//! run and is returned tagged with its [`Stage`]; nothing is retried here.

pub mod prompts;

use crate::client::CompletionClient;
use crate::core::{Message, PipelineContext, PipelineState, Stage, StageOutput};
use crate::error::{Error, ParseError, Result};
use crate::parsing::{parse_list, parse_text};
use crate::tokens::{GPT_35_TURBO_0301, TokenEstimator};
use prompts::{
    build_section_prompt, build_statistics_prompt, build_subsections_prompt, build_title_prompt,
};

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 1.0;

/// Number of prompt characters included in the per-call log record.
pub const PROMPT_PREVIEW_CHARS: usize = 90;

/// Caller-supplied settings for one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunParameters {
    /// Model identifier sent with every request and used for accounting.
    pub model: String,

    /// Sampling temperature.
    pub temperature: f32,

    /// Upper bound on subsections requested of the model (not enforced).
    pub max_subsections: usize,

    /// Index into the parsed subsections of the one to write up.
    pub section_index: usize,
}

impl RunParameters {
    /// Creates parameters for `gpt-3.5-turbo-0301` at the default temperature.
    #[must_use]
    pub fn new(max_subsections: usize, section_index: usize) -> Self {
        Self {
            model: GPT_35_TURBO_0301.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_subsections,
            section_index,
        }
    }

    /// Sets the model identifier.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Orchestrates the four generation stages over a [`CompletionClient`].
///
/// The pipeline holds no per-run state, so one instance can serve any number
/// of runs; each run owns its own [`PipelineContext`].
///
/// # Examples
///
/// ```
/// use wikisynth::client::CompletionClient;
/// use wikisynth::core::Message;
/// use wikisynth::error::CompletionError;
/// use wikisynth::pipeline::{Pipeline, RunParameters};
///
/// struct Canned;
///
/// impl CompletionClient for Canned {
///     fn complete(&self, m: &[Message], _: f32, _: &str) -> Result<String, CompletionError> {
///         let prompt = &m[0].content;
///         Ok(if prompt.contains("comma-separated") { "\"Intro\"" } else { "text" }.to_string())
///     }
/// }
///
/// let pipeline = Pipeline::new(Canned, RunParameters::new(3, 0)).unwrap();
/// let ctx = pipeline.run("some source text").unwrap();
/// assert_eq!(ctx.subsections.unwrap(), ["Intro"]);
/// assert_eq!(ctx.section.as_deref(), Some("text"));
/// ```
#[derive(Debug)]
pub struct Pipeline<C> {
    client: C,
    params: RunParameters,
    estimator: TokenEstimator,
}

impl<C: CompletionClient> Pipeline<C> {
    /// Creates a pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedModel`] if `params.model` has no token
    /// accounting formula, before any request is made.
    pub fn new(client: C, params: RunParameters) -> Result<Self> {
        let estimator = TokenEstimator::new(&params.model)?;
        Ok(Self {
            client,
            params,
            estimator,
        })
    }

    /// Returns the run parameters.
    #[must_use]
    pub const fn params(&self) -> &RunParameters {
        &self.params
    }

    /// Runs every stage over `source` and returns the completed context.
    ///
    /// # Errors
    ///
    /// Returns the first stage failure, tagged with its [`Stage`].
    pub fn run(&self, source: &str) -> Result<PipelineContext> {
        let mut ctx = PipelineContext::new();
        self.run_into(source, &mut ctx)?;
        Ok(ctx)
    }

    /// Runs every stage over `source`, filling `ctx` as stages complete.
    ///
    /// On failure `ctx` keeps the results of the stages that succeeded and is
    /// left in [`PipelineState::Failed`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if `ctx` has already been used,
    /// [`Error::InvalidInput`] for blank source text, or the first stage
    /// failure tagged with its [`Stage`].
    pub fn run_into(&self, source: &str, ctx: &mut PipelineContext) -> Result<()> {
        if ctx.state != PipelineState::Init {
            return Err(Error::InvalidState {
                message: format!("pipeline context already used ({:?})", ctx.state),
            });
        }
        if source.trim().is_empty() {
            return Err(Error::InvalidInput {
                message: "source text is empty".to_string(),
            });
        }

        for stage in Stage::ALL {
            ctx.begin(stage);
            match self
                .run_stage(stage, source, ctx)
                .and_then(|output| ctx.record(stage, output))
            {
                Ok(()) => tracing::debug!(%stage, "stage complete"),
                Err(e) => {
                    tracing::warn!(%stage, error = %e, "stage failed, aborting run");
                    ctx.fail(stage);
                    return Err(e.at_stage(stage));
                }
            }
        }

        Ok(())
    }

    fn run_stage(
        &self,
        stage: Stage,
        source: &str,
        ctx: &mut PipelineContext,
    ) -> Result<StageOutput> {
        let prompt = self.prompt_for(stage, source, ctx)?;
        let raw = self.query(stage, &prompt, ctx)?;

        match stage {
            Stage::Subsections => {
                let labels = parse_list(&raw, self.params.max_subsections);
                if labels.is_empty() {
                    return Err(ParseError::EmptyList.into());
                }
                Ok(StageOutput::List(labels))
            }
            Stage::Statistics | Stage::Title | Stage::Section => {
                let text = parse_text(&raw);
                if text.is_empty() {
                    return Err(ParseError::EmptyText.into());
                }
                Ok(StageOutput::Text(text))
            }
        }
    }

    fn prompt_for(&self, stage: Stage, source: &str, ctx: &PipelineContext) -> Result<String> {
        Ok(match stage {
            Stage::Statistics => build_statistics_prompt(source),
            Stage::Title => build_title_prompt(require(ctx.statistics.as_deref(), "statistics")?),
            Stage::Subsections => build_subsections_prompt(
                require(ctx.statistics.as_deref(), "statistics")?,
                require(ctx.title.as_deref(), "title")?,
                self.params.max_subsections,
            ),
            Stage::Section => {
                let subsections = require(ctx.subsections.as_deref(), "subsections")?;
                let index = self.params.section_index;
                let subsection =
                    subsections
                        .get(index)
                        .ok_or(ParseError::SubsectionOutOfRange {
                            index,
                            available: subsections.len(),
                        })?;
                build_section_prompt(
                    require(ctx.statistics.as_deref(), "statistics")?,
                    require(ctx.title.as_deref(), "title")?,
                    subsection,
                )
            }
        })
    }

    /// Sends one prompt as a single user message.
    fn query(&self, stage: Stage, prompt: &str, ctx: &mut PipelineContext) -> Result<String> {
        let messages = [Message::user(prompt)];
        let tokens = self.estimator.estimate(&messages);
        ctx.prompt_tokens.insert(stage, tokens);

        tracing::info!(
            %stage,
            tokens,
            prompt = %preview(prompt, PROMPT_PREVIEW_CHARS),
            "sending prompt"
        );

        Ok(self
            .client
            .complete(&messages, self.params.temperature, &self.params.model)?)
    }
}

fn require<'a, T: ?Sized>(value: Option<&'a T>, what: &str) -> Result<&'a T> {
    value.ok_or_else(|| Error::InvalidState {
        message: format!("{what} missing from pipeline context"),
    })
}

/// Returns at most `max_chars` leading characters of `text`.
fn preview(text: &str, max_chars: usize) -> &str {
    text.char_indices()
        .nth(max_chars)
        .map_or(text, |(idx, _)| &text[..idx])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompletionError;
    use std::sync::Mutex;

    /// Replays canned replies in order and records the prompts it saw.
    #[derive(Debug)]
    struct Scripted {
        replies: Mutex<Vec<std::result::Result<String, CompletionError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(replies: Vec<std::result::Result<&str, CompletionError>>) -> Self {
            let mut replies: Vec<_> = replies
                .into_iter()
                .map(|r| r.map(String::from))
                .collect();
            replies.reverse();
            Self {
                replies: Mutex::new(replies),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    impl CompletionClient for Scripted {
        fn complete(
            &self,
            messages: &[Message],
            _temperature: f32,
            _model: &str,
        ) -> std::result::Result<String, CompletionError> {
            self.prompts
                .lock()
                .unwrap()
                .push(messages[0].content.clone());
            self.replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Err(CompletionError::EmptyResponse))
        }
    }

    #[test]
    fn test_preview_respects_char_boundaries() {
        assert_eq!(preview("héllo", 2), "hé");
        assert_eq!(preview("short", 90), "short");
        assert_eq!(preview("", 3), "");
    }

    #[test]
    fn test_run_parameters_defaults() {
        let params = RunParameters::new(6, 3);
        assert_eq!(params.model, GPT_35_TURBO_0301);
        assert!((params.temperature - 1.0).abs() < f32::EPSILON);
        assert_eq!(params.max_subsections, 6);
        assert_eq!(params.section_index, 3);

        let params = params.with_temperature(0.2).with_model("custom");
        assert!((params.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(params.model, "custom");
    }

    #[test]
    fn test_unsupported_model_rejected_up_front() {
        let client = Scripted::new(vec![]);
        let err = Pipeline::new(&client, RunParameters::new(2, 0).with_model("gpt-4")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedModel { .. }));
        assert!(client.prompts().is_empty());
    }

    #[test]
    fn test_statistics_feed_later_stages() {
        let client = Scripted::new(vec![Ok("FACTS"), Ok("TITLE"), Ok("A, B"), Ok("PARA")]);
        let pipeline = Pipeline::new(&client, RunParameters::new(2, 1)).unwrap();
        pipeline.run("raw source").unwrap();

        let prompts = client.prompts();
        assert_eq!(prompts.len(), 4);
        assert!(prompts[0].contains("Information: raw source"));
        assert!(prompts[1].contains("Information: FACTS"));
        assert!(prompts[2].contains("Title: TITLE"));
        assert!(prompts[2].contains("NO MORE THAN 2"));
        assert!(prompts[3].contains("Subsection: B"));
        assert!(!prompts[3].contains("raw source"));
    }

    #[test]
    fn test_prompt_tokens_recorded_per_stage() {
        let client = Scripted::new(vec![Ok("FACTS"), Ok("TITLE"), Ok("A"), Ok("PARA")]);
        let pipeline = Pipeline::new(&client, RunParameters::new(1, 0)).unwrap();
        let ctx = pipeline.run("raw source").unwrap();

        let estimator = TokenEstimator::new(GPT_35_TURBO_0301).unwrap();
        for (stage, prompt) in Stage::ALL.into_iter().zip(client.prompts()) {
            assert_eq!(
                ctx.prompt_tokens[&stage],
                estimator.estimate(&[Message::user(prompt)])
            );
        }
    }

    #[test]
    fn test_blank_reply_is_parse_error() {
        let client = Scripted::new(vec![Ok("   \n")]);
        let pipeline = Pipeline::new(&client, RunParameters::new(2, 0)).unwrap();
        let mut ctx = PipelineContext::new();
        let err = pipeline.run_into("source", &mut ctx).unwrap_err();

        assert_eq!(err.stage(), Some(Stage::Statistics));
        assert!(matches!(err.root_cause(), Error::Parse(ParseError::EmptyText)));
        assert_eq!(ctx.state, PipelineState::Failed(Stage::Statistics));
    }

    #[test]
    fn test_empty_subsection_list_is_parse_error() {
        let client = Scripted::new(vec![Ok("FACTS"), Ok("TITLE"), Ok("\"\", ,")]);
        let pipeline = Pipeline::new(&client, RunParameters::new(2, 0)).unwrap();
        let mut ctx = PipelineContext::new();
        let err = pipeline.run_into("source", &mut ctx).unwrap_err();

        assert_eq!(err.stage(), Some(Stage::Subsections));
        assert!(matches!(err.root_cause(), Error::Parse(ParseError::EmptyList)));
        assert_eq!(ctx.title.as_deref(), Some("TITLE"));
        assert!(ctx.subsections.is_none());
    }

    #[test]
    fn test_section_index_out_of_range_skips_call() {
        let client = Scripted::new(vec![Ok("FACTS"), Ok("TITLE"), Ok("A, B")]);
        let pipeline = Pipeline::new(&client, RunParameters::new(2, 5)).unwrap();
        let mut ctx = PipelineContext::new();
        let err = pipeline.run_into("source", &mut ctx).unwrap_err();

        assert_eq!(err.stage(), Some(Stage::Section));
        assert!(matches!(
            err.root_cause(),
            Error::Parse(ParseError::SubsectionOutOfRange {
                index: 5,
                available: 2
            })
        ));
        assert_eq!(client.prompts().len(), 3);
        assert!(!ctx.prompt_tokens.contains_key(&Stage::Section));
    }

    #[test]
    fn test_context_cannot_be_reused() {
        let client = Scripted::new(vec![Ok("F"), Ok("T"), Ok("A"), Ok("P")]);
        let pipeline = Pipeline::new(&client, RunParameters::new(1, 0)).unwrap();
        let mut ctx = PipelineContext::new();
        pipeline.run_into("source", &mut ctx).unwrap();

        let before = ctx.clone();
        let err = pipeline.run_into("source", &mut ctx).unwrap_err();
        assert!(matches!(err, Error::InvalidState { .. }));
        assert_eq!(ctx, before);
    }

    #[test]
    fn test_blank_source_rejected() {
        let client = Scripted::new(vec![]);
        let pipeline = Pipeline::new(&client, RunParameters::new(1, 0)).unwrap();
        let err = pipeline.run(" \n\t").unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }));
        assert!(client.prompts().is_empty());
    }
}
