//! Completion service boundary.
//!
//! The pipeline talks to the language model only through
//! [`CompletionClient`]. Transports, test doubles, and decorators (retry,
//! rate limiting, recording) all plug in here without the pipeline knowing.
//!
//! # Feature Flags
//!
//! - `openai`: Enables [`OpenAiClient`], a blocking wrapper over the OpenAI
//!   chat-completions API.

mod config;

#[cfg(feature = "openai")]
mod openai;

pub use config::{ClientConfig, EnvFile};

#[cfg(feature = "openai")]
pub use openai::OpenAiClient;

use crate::core::Message;
use crate::error::CompletionError;
use std::sync::Arc;

/// Synchronous request/response boundary to a chat-completion model.
///
/// Calls block until the service answers or fails. Timeouts and cancellation
/// belong to the implementation.
///
/// # Examples
///
/// ```
/// use wikisynth::client::CompletionClient;
/// use wikisynth::core::Message;
/// use wikisynth::error::CompletionError;
///
/// struct Echo;
///
/// impl CompletionClient for Echo {
///     fn complete(
///         &self,
///         messages: &[Message],
///         _temperature: f32,
///         _model: &str,
///     ) -> Result<String, CompletionError> {
///         messages
///             .last()
///             .map(|m| m.content.clone())
///             .ok_or(CompletionError::EmptyResponse)
///     }
/// }
///
/// let reply = Echo.complete(&[Message::user("ping")], 1.0, "any").unwrap();
/// assert_eq!(reply, "ping");
/// ```
pub trait CompletionClient: Send + Sync {
    /// Sends `messages` and returns the text of the first completion choice.
    ///
    /// # Errors
    ///
    /// Returns a [`CompletionError`] on transport, authentication, rate-limit,
    /// timeout, or malformed-response conditions.
    fn complete(
        &self,
        messages: &[Message],
        temperature: f32,
        model: &str,
    ) -> Result<String, CompletionError>;
}

impl<T: CompletionClient + ?Sized> CompletionClient for &T {
    fn complete(
        &self,
        messages: &[Message],
        temperature: f32,
        model: &str,
    ) -> Result<String, CompletionError> {
        (**self).complete(messages, temperature, model)
    }
}

impl<T: CompletionClient + ?Sized> CompletionClient for Box<T> {
    fn complete(
        &self,
        messages: &[Message],
        temperature: f32,
        model: &str,
    ) -> Result<String, CompletionError> {
        (**self).complete(messages, temperature, model)
    }
}

impl<T: CompletionClient + ?Sized> CompletionClient for Arc<T> {
    fn complete(
        &self,
        messages: &[Message],
        temperature: f32,
        model: &str,
    ) -> Result<String, CompletionError> {
        (**self).complete(messages, temperature, model)
    }
}

/// Creates the default transport from `config`.
///
/// # Errors
///
/// Returns an error if the transport cannot be constructed.
#[cfg(feature = "openai")]
pub fn create_client(config: ClientConfig) -> crate::Result<Box<dyn CompletionClient>> {
    Ok(Box::new(OpenAiClient::new(config)?))
}

/// Creates the default transport from `config`.
///
/// # Errors
///
/// Always fails: no transport is compiled in without the `openai` feature.
#[cfg(not(feature = "openai"))]
pub fn create_client(_config: ClientConfig) -> crate::Result<Box<dyn CompletionClient>> {
    Err(crate::Error::Config {
        message: "no completion transport compiled in; enable the `openai` feature".to_string(),
    })
}
