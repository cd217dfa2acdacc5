//! Error types for wikisynth operations.
//!
//! This module provides the error hierarchy using `thiserror` for token
//! accounting, completion calls, output parsing, pipeline stages, I/O, and
//! CLI commands.

use crate::core::Stage;
use thiserror::Error;

/// Result type alias for wikisynth operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    /// No token accounting formula exists for this model.
    #[error("token accounting is not implemented for model: {model}")]
    UnsupportedModel {
        /// The model identifier that was rejected.
        model: String,
    },

    /// The byte-pair encoding could not be loaded.
    #[error("tokenizer error: {reason}")]
    Tokenizer {
        /// Reason the encoding failed to load.
        reason: String,
    },

    /// Completion call failed.
    #[error("completion error: {0}")]
    Completion(#[from] CompletionError),

    /// Completion text could not be turned into a usable result.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// A pipeline stage failed; wraps the underlying cause.
    #[error("stage {stage} failed: {source}")]
    Stage {
        /// The stage that was running.
        stage: Stage,
        /// Underlying cause.
        source: Box<Self>,
    },

    /// I/O errors (file operations).
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// CLI command errors.
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// Caller-supplied input was unusable.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// Description of the problem.
        message: String,
    },

    /// Invalid state errors.
    #[error("invalid state: {message}")]
    InvalidState {
        /// Description of the invalid state.
        message: String,
    },

    /// Configuration errors.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },
}

impl Error {
    /// Tags an error with the stage it occurred in.
    #[must_use]
    pub fn at_stage(self, stage: Stage) -> Self {
        Self::Stage {
            stage,
            source: Box::new(self),
        }
    }

    /// Returns the failing stage if this error is stage-tagged.
    #[must_use]
    pub const fn stage(&self) -> Option<Stage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Returns the innermost cause, unwrapping any stage tag.
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        match self {
            Self::Stage { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Failures reported by a [`CompletionClient`](crate::client::CompletionClient).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    /// Network or HTTP-level failure.
    #[error("transport failure: {0}")]
    Transport(String),

    /// Credentials were missing or rejected.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The service refused the request due to rate limits or quota.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// The request did not complete in time.
    #[error("request timed out")]
    Timeout,

    /// The response could not be interpreted.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The response carried no completion choice.
    #[error("response contained no completion")]
    EmptyResponse,
}

/// Output parsing errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A text stage produced only whitespace.
    #[error("completion text is empty")]
    EmptyText,

    /// A list stage produced no elements after filtering.
    #[error("completion yielded an empty list")]
    EmptyList,

    /// The selected subsection does not exist.
    #[error("subsection index {index} out of range ({available} available)")]
    SubsectionOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of parsed subsections.
        available: usize,
    },
}

/// I/O-specific errors for file operations.
#[derive(Error, Debug)]
pub enum IoError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path to the file that was not found.
        path: String,
    },

    /// Failed to read file.
    #[error("failed to read file: {path}: {reason}")]
    ReadFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Generic I/O error wrapper.
    #[error("I/O error: {0}")]
    Generic(String),
}

/// CLI command-specific errors.
#[derive(Error, Debug)]
pub enum CommandError {
    /// Invalid argument provided.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(IoError::Generic(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidState {
            message: "test error".to_string(),
        };
        assert_eq!(err.to_string(), "invalid state: test error");
    }

    #[test]
    fn test_unsupported_model_display() {
        let err = Error::UnsupportedModel {
            model: "gpt-4".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "token accounting is not implemented for model: gpt-4"
        );
    }

    #[test]
    fn test_stage_tagging() {
        let err = Error::from(CompletionError::Timeout).at_stage(Stage::Title);
        assert_eq!(err.stage(), Some(Stage::Title));
        assert_eq!(err.to_string(), "stage TITLE failed: completion error: request timed out");
        assert!(matches!(
            err.root_cause(),
            Error::Completion(CompletionError::Timeout)
        ));
    }

    #[test]
    fn test_untagged_error_has_no_stage() {
        let err: Error = ParseError::EmptyList.into();
        assert_eq!(err.stage(), None);
        assert!(matches!(err.root_cause(), Error::Parse(ParseError::EmptyList)));
    }

    #[test]
    fn test_parse_error_variants() {
        let err = ParseError::SubsectionOutOfRange {
            index: 4,
            available: 2,
        };
        assert_eq!(
            err.to_string(),
            "subsection index 4 out of range (2 available)"
        );
        assert!(ParseError::EmptyText.to_string().contains("empty"));
    }

    #[test]
    fn test_completion_error_variants() {
        let err = CompletionError::RateLimited("slow down".to_string());
        assert!(err.to_string().contains("slow down"));

        let err = CompletionError::Authentication("bad key".to_string());
        assert!(err.to_string().contains("authentication"));

        let err = CompletionError::MalformedResponse("no json".to_string());
        assert!(err.to_string().contains("malformed"));
    }

    #[test]
    fn test_io_error_display() {
        let err = IoError::FileNotFound {
            path: "/tmp/test.txt".to_string(),
        };
        assert_eq!(err.to_string(), "file not found: /tmp/test.txt");
    }

    #[test]
    fn test_command_error_display() {
        let err = CommandError::InvalidArgument("unknown role 'tool'".to_string());
        assert_eq!(err.to_string(), "invalid argument: unknown role 'tool'");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_config() {
        let err = Error::Config {
            message: "bad config".to_string(),
        };
        assert_eq!(err.to_string(), "configuration error: bad config");
    }
}
