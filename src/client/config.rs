//! Transport configuration.
//!
//! Credentials are passed into the client as an explicit value. Nothing here
//! writes the process environment; the CLI resolves flags, clap's `env`
//! fallbacks, and an optional env file into a [`ClientConfig`].

use crate::error::{Error, IoError, Result};
use std::collections::HashMap;
use std::path::Path;

/// Environment key holding the API key.
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Environment key holding an alternate API base URL.
pub const API_BASE_VAR: &str = "OPENAI_API_BASE";

/// Connection settings for a completion transport.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ClientConfig {
    /// Secret API key.
    pub api_key: String,

    /// Base URL override (e.g. a proxy or compatible server).
    pub api_base: Option<String>,
}

impl ClientConfig {
    /// Creates a config with the given API key and the default base URL.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: None,
        }
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    /// Resolves a config from explicit values, falling back to `env_file`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if no API key is available from either source.
    pub fn resolve(
        api_key: Option<&str>,
        api_base: Option<&str>,
        env_file: Option<&EnvFile>,
    ) -> Result<Self> {
        let from_file = |key: &str| env_file.and_then(|f| f.get(key));

        let api_key = api_key
            .or_else(|| from_file(API_KEY_VAR))
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::Config {
                message: format!("no API key: pass --api-key or set {API_KEY_VAR}"),
            })?;

        let api_base = api_base.or_else(|| from_file(API_BASE_VAR));

        Ok(Self {
            api_key: api_key.to_string(),
            api_base: api_base.map(String::from),
        })
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// `KEY=VALUE` pairs read from a dotenv file.
///
/// Parsing follows dotenv rules via `dotenvy`, including comments, `export`
/// prefixes, quoting and escapes. Pairs are collected into a map instead of
/// being exported into the process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvFile {
    vars: HashMap<String, String>,
}

impl EnvFile {
    /// Reads and parses an env file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file is missing or unreadable, or a config
    /// error if a line is malformed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let path_str = path.to_string_lossy().to_string();
        if !path.exists() {
            return Err(IoError::FileNotFound { path: path_str }.into());
        }

        let read_failed = |reason: String| IoError::ReadFailed {
            path: path_str.clone(),
            reason,
        };
        let vars = dotenvy::from_path_iter(path)
            .map_err(|e| read_failed(e.to_string()))?
            .collect::<std::result::Result<HashMap<_, _>, _>>()
            .map_err(|e| match e {
                // The offending line is left out of the message, it may hold a secret.
                dotenvy::Error::LineParse(_, index) => Error::Config {
                    message: format!("malformed line in env file {path_str} (column {index})"),
                },
                other => read_failed(other.to_string()).into(),
            })?;

        tracing::debug!(path = %path_str, entries = vars.len(), "loaded env file");
        Ok(Self { vars })
    }

    /// Looks up a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Number of parsed entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Returns true if no entries were parsed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn env_file(content: &str) -> EnvFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{content}").unwrap();
        EnvFile::load(file.path()).unwrap()
    }

    #[test]
    fn test_load_env_file() {
        let env = env_file(
            "# credentials\nOPENAI_API_KEY=sk-test\n\nexport OPENAI_API_BASE=\"http://localhost:8080/v1\"\nEMPTY=\n",
        );
        assert_eq!(env.len(), 3);
        assert_eq!(env.get(API_KEY_VAR), Some("sk-test"));
        assert_eq!(env.get(API_BASE_VAR), Some("http://localhost:8080/v1"));
        assert_eq!(env.get("EMPTY"), Some(""));
        assert_eq!(env.get("MISSING"), None);
    }

    #[test]
    fn test_value_with_equals_sign() {
        let env = env_file("TOKEN=abc=def\n");
        assert_eq!(env.get("TOKEN"), Some("abc=def"));
    }

    #[test]
    fn test_single_quoted_value() {
        let env = env_file("OPENAI_API_KEY='sk-file'\n");
        assert_eq!(env.get(API_KEY_VAR), Some("sk-file"));
    }

    #[test]
    fn test_inline_comment_not_part_of_key() {
        let env = env_file("OPENAI_API_KEY=sk-abc # prod key\n");
        let config = ClientConfig::resolve(None, None, Some(&env)).unwrap();
        assert_eq!(config.api_key, "sk-abc");
    }

    #[test]
    fn test_load_does_not_touch_process_env() {
        env_file("WIKISYNTH_ENV_FILE_ONLY=1\n");
        assert!(std::env::var("WIKISYNTH_ENV_FILE_ONLY").is_err());
    }

    #[test]
    fn test_malformed_line() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "OPENAI_API_KEY=x\nnot a pair\n").unwrap();
        let err = EnvFile::load(file.path()).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert!(!err.to_string().contains("not a pair"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = EnvFile::load("/nonexistent/.env").unwrap_err();
        assert!(matches!(err, Error::Io(IoError::FileNotFound { .. })));
    }

    #[test]
    fn test_resolve_prefers_explicit_values() {
        let env = env_file("OPENAI_API_KEY=from-file\nOPENAI_API_BASE=http://file\n");
        let config = ClientConfig::resolve(Some("explicit"), None, Some(&env)).unwrap();
        assert_eq!(config.api_key, "explicit");
        assert_eq!(config.api_base.as_deref(), Some("http://file"));
    }

    #[test]
    fn test_resolve_from_file() {
        let env = env_file("OPENAI_API_KEY=from-file\n");
        let config = ClientConfig::resolve(None, None, Some(&env)).unwrap();
        assert_eq!(config, ClientConfig::new("from-file"));
    }

    #[test]
    fn test_resolve_without_key() {
        let err = ClientConfig::resolve(None, Some("http://x"), None).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));

        let err = ClientConfig::resolve(Some(""), None, None).unwrap_err();
        assert!(err.to_string().contains(API_KEY_VAR));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = ClientConfig::new("sk-secret").with_api_base("http://b");
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("http://b"));
    }
}
