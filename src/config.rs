use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_MODEL: &str = "gemini-flash-latest";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_API_KEY_VAR: &str = "GOOGLE_API_KEY";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Adapter configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub model: String,
    pub base_url: String,
    /// Applied to every call that does not set its own timeout.
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.into(),
            base_url: DEFAULT_BASE_URL.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl GeminiConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Normalized model id: trimmed, without a leading `models/`.
    pub(crate) fn model_id(&self) -> Result<String, ConfigError> {
        let model = self.model.trim();
        let model = model.strip_prefix("models/").unwrap_or(model);
        if model.is_empty() {
            return Err(ConfigError::InvalidModel);
        }
        Ok(model.to_string())
    }
}

/// Where the API key comes from.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// Read from the named environment variable at construction time.
    Env(String),
    ApiKey(String),
}

impl Default for Credentials {
    fn default() -> Self {
        Credentials::Env(DEFAULT_API_KEY_VAR.into())
    }
}

impl Credentials {
    pub fn from_env() -> Self {
        Self::default()
    }

    pub fn api_key(key: impl Into<String>) -> Self {
        Credentials::ApiKey(key.into())
    }

    /// Resolve to a non-empty key.
    pub fn resolve(&self) -> Result<String, ConfigError> {
        let (var, key) = match self {
            Credentials::Env(var) => (var.as_str(), std::env::var(var).ok()),
            Credentials::ApiKey(key) => ("api key", Some(key.clone())),
        };
        match key {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(ConfigError::MissingCredential { var: var.into() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_env_var_is_missing() {
        let creds = Credentials::Env("GEMINI_LLM_TEST_NEVER_SET".into());
        let err = creds.resolve().unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential { ref var } if var == "GEMINI_LLM_TEST_NEVER_SET"));
    }

    #[test]
    fn env_var_is_read() {
        std::env::set_var("GEMINI_LLM_TEST_CONFIG_KEY", "abc123");
        let creds = Credentials::Env("GEMINI_LLM_TEST_CONFIG_KEY".into());
        assert_eq!(creds.resolve().unwrap(), "abc123");
    }

    #[test]
    fn blank_key_is_missing() {
        assert!(Credentials::api_key("  ").resolve().is_err());
        assert!(Credentials::api_key("").resolve().is_err());
    }

    #[test]
    fn default_source_is_google_api_key() {
        assert!(matches!(Credentials::default(), Credentials::Env(ref v) if v == "GOOGLE_API_KEY"));
    }

    #[test]
    fn model_prefix_is_stripped() {
        let config = GeminiConfig::new("models/gemini-2.0-flash");
        assert_eq!(config.model_id().unwrap(), "gemini-2.0-flash");
    }

    #[test]
    fn empty_model_rejected() {
        assert!(matches!(
            GeminiConfig::new(" ").model_id(),
            Err(ConfigError::InvalidModel)
        ));
        assert!(GeminiConfig::new("models/").model_id().is_err());
    }

    #[test]
    fn defaults() {
        let config = GeminiConfig::default();
        assert_eq!(config.model, "gemini-flash-latest");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(60));
    }
}
