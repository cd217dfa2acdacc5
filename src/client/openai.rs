//! OpenAI chat-completions transport.
//!
//! Wraps the async `async-openai` client in a private current-thread Tokio
//! runtime so it satisfies the blocking [`CompletionClient`] contract.

use super::{ClientConfig, CompletionClient};
use crate::core::{Message, Role};
use crate::error::{CompletionError, Error, Result};
use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use std::time::Duration;
use tokio::runtime::Runtime;

/// Blocking OpenAI chat-completions client.
///
/// The library's built-in retry on HTTP 429 is switched off: one call is one
/// request, and any retry policy belongs in a wrapper around this client.
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    runtime: Runtime,
}

impl OpenAiClient {
    /// Creates a client from explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the async runtime cannot be started.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut openai_config = OpenAIConfig::new().with_api_key(config.api_key);
        if let Some(base) = config.api_base {
            openai_config = openai_config.with_api_base(base);
        }

        let no_retry = backoff::ExponentialBackoff {
            max_elapsed_time: Some(Duration::ZERO),
            ..backoff::ExponentialBackoff::default()
        };
        let client = Client::with_config(openai_config).with_backoff(no_retry);

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::Config {
                message: format!("failed to start async runtime: {e}"),
            })?;

        Ok(Self { client, runtime })
    }
}

impl CompletionClient for OpenAiClient {
    fn complete(
        &self,
        messages: &[Message],
        temperature: f32,
        model: &str,
    ) -> std::result::Result<String, CompletionError> {
        let messages = messages
            .iter()
            .map(to_request_message)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(map_openai_error)?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(messages)
            .temperature(temperature)
            .build()
            .map_err(map_openai_error)?;

        let response = self
            .runtime
            .block_on(self.client.chat().create(request))
            .map_err(map_openai_error)?;

        tracing::debug!(
            model = %response.model,
            prompt_tokens = response.usage.as_ref().map(|u| u.prompt_tokens),
            completion_tokens = response.usage.as_ref().map(|u| u.completion_tokens),
            "completion received"
        );

        response
            .choices
            .into_iter()
            .next()
            .ok_or(CompletionError::EmptyResponse)?
            .message
            .content
            .ok_or_else(|| CompletionError::MalformedResponse("choice has no content".to_string()))
    }
}

fn to_request_message(
    message: &Message,
) -> std::result::Result<ChatCompletionRequestMessage, OpenAIError> {
    let content = message.content.clone();
    let name = message.name.clone();
    Ok(match message.role {
        Role::System => {
            let mut args = ChatCompletionRequestSystemMessageArgs::default();
            args.content(content);
            if let Some(name) = name {
                args.name(name);
            }
            args.build()?.into()
        }
        Role::User => {
            let mut args = ChatCompletionRequestUserMessageArgs::default();
            args.content(content);
            if let Some(name) = name {
                args.name(name);
            }
            args.build()?.into()
        }
        Role::Assistant => {
            let mut args = ChatCompletionRequestAssistantMessageArgs::default();
            args.content(content);
            if let Some(name) = name {
                args.name(name);
            }
            args.build()?.into()
        }
    })
}

fn map_openai_error(err: OpenAIError) -> CompletionError {
    match err {
        OpenAIError::Reqwest(e) if e.is_timeout() => CompletionError::Timeout,
        OpenAIError::Reqwest(e) => CompletionError::Transport(e.to_string()),
        OpenAIError::ApiError(api) => {
            let code = api.code.as_deref().unwrap_or_default();
            let kind = api.r#type.as_deref().unwrap_or_default();
            if code == "invalid_api_key" || kind == "authentication_error" {
                CompletionError::Authentication(api.message)
            } else if code == "rate_limit_exceeded"
                || kind == "insufficient_quota"
                || kind == "requests"
                || kind == "tokens"
            {
                CompletionError::RateLimited(api.message)
            } else {
                CompletionError::Transport(api.message)
            }
        }
        OpenAIError::JSONDeserialize(e) => CompletionError::MalformedResponse(e.to_string()),
        other => CompletionError::Transport(other.to_string()),
    }
}
