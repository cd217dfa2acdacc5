//! Prompt-token accounting.
//!
//! Reproduces the chat-completion cost formula of `gpt-3.5-turbo-0301`:
//! every message costs 4 framing tokens plus the encoded length of its
//! content (and name, if any), a named message reclaims 1 token for the
//! omitted role, and every reply is primed with 2 more tokens.
//!
//! Other model generations frame messages differently and are rejected with
//! [`Error::UnsupportedModel`] rather than estimated.

use crate::core::Message;
use crate::error::{Error, Result};
use tiktoken_rs::CoreBPE;

/// The only model generation whose accounting formula is implemented.
pub const GPT_35_TURBO_0301: &str = "gpt-3.5-turbo-0301";

/// Framing tokens around every message (`<im_start>{role/name}\n{content}<im_end>\n`).
const TOKENS_PER_MESSAGE: usize = 4;

/// Tokens reclaimed when a name replaces the role.
const TOKENS_PER_NAME_ADJUSTMENT: usize = 1;

/// Tokens priming the reply (`<im_start>assistant`).
const REPLY_PRIMING_TOKENS: usize = 2;

/// Returns true if `model` has an implemented accounting formula.
#[must_use]
pub fn is_supported_model(model: &str) -> bool {
    model == GPT_35_TURBO_0301
}

/// Counts prompt tokens for `messages` under `model`'s accounting rules.
///
/// Loads the encoding on every call; hold a [`TokenEstimator`] when counting
/// repeatedly.
///
/// # Examples
///
/// ```
/// use wikisynth::core::Message;
/// use wikisynth::tokens::{GPT_35_TURBO_0301, estimate};
///
/// let tokens = estimate(&[Message::user("hello")], GPT_35_TURBO_0301).unwrap();
/// assert_eq!(tokens, 4 + 1 + 2);
///
/// assert!(estimate(&[Message::user("hello")], "gpt-4").is_err());
/// ```
///
/// # Errors
///
/// Returns [`Error::UnsupportedModel`] for any model other than
/// [`GPT_35_TURBO_0301`], or [`Error::Tokenizer`] if no encoding loads.
pub fn estimate(messages: &[Message], model: &str) -> Result<usize> {
    Ok(TokenEstimator::new(model)?.estimate(messages))
}

/// Token counter bound to one model and its byte-pair encoding.
pub struct TokenEstimator {
    model: String,
    bpe: CoreBPE,
}

impl TokenEstimator {
    /// Creates an estimator for `model`.
    ///
    /// The encoding is resolved from the model name; names the encoding
    /// registry does not know fall back to `cl100k_base`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedModel`] before touching the tokenizer if
    /// the model has no accounting formula, or [`Error::Tokenizer`] if the
    /// encoding fails to load.
    pub fn new(model: &str) -> Result<Self> {
        if !is_supported_model(model) {
            return Err(Error::UnsupportedModel {
                model: model.to_string(),
            });
        }

        let bpe = tiktoken_rs::get_bpe_from_model(model)
            .or_else(|e| {
                tracing::debug!(model, error = %e, "no encoding for model, using cl100k_base");
                tiktoken_rs::cl100k_base()
            })
            .map_err(|e| Error::Tokenizer {
                reason: e.to_string(),
            })?;

        Ok(Self {
            model: model.to_string(),
            bpe,
        })
    }

    /// Returns the model this estimator counts for.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Encoded length of `text`.
    #[must_use]
    pub fn count_text(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }

    /// Prompt-token cost of a single message, excluding reply priming.
    #[must_use]
    pub fn count_message(&self, message: &Message) -> usize {
        let mut tokens = TOKENS_PER_MESSAGE + self.count_text(&message.content);
        if let Some(name) = &message.name {
            tokens += self.count_text(name);
            tokens = tokens.saturating_sub(TOKENS_PER_NAME_ADJUSTMENT);
        }
        tokens
    }

    /// Prompt-token cost of a full request.
    #[must_use]
    pub fn estimate(&self, messages: &[Message]) -> usize {
        messages
            .iter()
            .map(|m| self.count_message(m))
            .sum::<usize>()
            + REPLY_PRIMING_TOKENS
    }
}

impl std::fmt::Debug for TokenEstimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenEstimator")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}
