pub mod config;
pub mod error;
pub mod inference;
pub mod types;
pub mod wire;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub use config::{Credentials, GeminiConfig};
pub use error::{CallFailure, ConfigError, FailureKind};
pub use inference::{GeminiClient, GenerativeBackend};
pub use types::{CallOptions, CallResult, Completion, ResponseFormat, Usage};
pub use wire::{GenerateContentRequest, GenerateContentResponse};

/// Gemini adapter. Forwards a prompt, hands back a [`CallResult`].
///
/// Failures during a call never escape as `Err`; they land in
/// [`CallResult::error`] with a [`FailureKind`].
pub struct GeminiLlm {
    backend: Box<dyn GenerativeBackend>,
    model: String,
    config: GeminiConfig,
}

impl GeminiLlm {
    /// Adapter for `model`, authenticating with the key from `credentials`.
    pub fn new(model: impl Into<String>, credentials: &Credentials) -> Result<Self, ConfigError> {
        Self::with_config(GeminiConfig::new(model), credentials)
    }

    /// Default model, key from `GOOGLE_API_KEY`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::with_config(GeminiConfig::default(), &Credentials::from_env())
    }

    pub fn with_config(config: GeminiConfig, credentials: &Credentials) -> Result<Self, ConfigError> {
        let api_key = credentials.resolve()?;
        let client = GeminiClient::new(api_key).with_base_url(config.base_url.as_str());
        Self::with_backend(client, config)
    }

    /// Use any backend. Authentication is the backend's business.
    pub fn with_backend(
        backend: impl GenerativeBackend + 'static,
        config: GeminiConfig,
    ) -> Result<Self, ConfigError> {
        let model = config.model_id()?;
        info!(model = %model, "gemini adapter initialized");
        Ok(Self {
            backend: Box::new(backend),
            model,
            config,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// One call, bounded by the options' timeout or the configured default.
    pub async fn invoke(&self, prompt: &str, options: &CallOptions) -> CallResult {
        self.run(prompt, options, None).await
    }

    /// Invocation with cancellation support.
    pub async fn invoke_with_cancel(
        &self,
        prompt: &str,
        options: &CallOptions,
        cancel: CancellationToken,
    ) -> CallResult {
        self.run(prompt, options, Some(cancel)).await
    }

    async fn run(
        &self,
        prompt: &str,
        options: &CallOptions,
        cancel: Option<CancellationToken>,
    ) -> CallResult {
        if cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
            info!(model = %self.model, "call cancelled before dispatch");
            return CallResult::failure(CallFailure::new(
                FailureKind::Cancelled,
                "call cancelled before dispatch",
            ));
        }

        let request = GenerateContentRequest::from_prompt(prompt, options);
        let timeout = options.timeout.unwrap_or(self.config.timeout);
        debug!(
            model = %self.model,
            prompt_chars = prompt.len(),
            json_mode = options.wants_json(),
            ?timeout,
            "invoking gemini"
        );

        let call = tokio::time::timeout(
            timeout,
            self.backend.generate_content(&self.model, &request),
        );
        let outcome = if let Some(ref cancel) = cancel {
            tokio::select! {
                result = call => result,
                _ = cancel.cancelled() => {
                    info!(model = %self.model, "call cancelled in flight");
                    return CallResult::failure(CallFailure::new(
                        FailureKind::Cancelled,
                        "call cancelled",
                    ));
                }
            }
        } else {
            call.await
        };

        let response = outcome.unwrap_or_else(|_| {
            Err(CallFailure::new(
                FailureKind::Timeout,
                format!("no response within {timeout:?}"),
            ))
        });

        match response.and_then(normalize) {
            Ok(result) => result,
            Err(failure) => {
                warn!(
                    model = %self.model,
                    kind = %failure.kind,
                    error = %failure.message,
                    "error calling Gemini API"
                );
                CallResult::failure(failure)
            }
        }
    }
}

/// Turn a parsed response into text and usage, or say why there is none.
fn normalize(response: GenerateContentResponse) -> Result<CallResult, CallFailure> {
    if let Some(feedback) = &response.prompt_feedback {
        if let Some(reason) = &feedback.block_reason {
            let ratings = wire::ratings_summary(&feedback.safety_ratings);
            warn!(block_reason = %reason, ratings = %ratings, "prompt blocked by safety filter");
            return Err(CallFailure::new(
                FailureKind::SafetyBlocked,
                format!("prompt blocked: {reason}"),
            ));
        }
    }

    let Some(candidate) = response.candidates.first() else {
        return Err(CallFailure::new(
            FailureKind::EmptyResponse,
            "response contained no candidates",
        ));
    };

    let Some(text) = candidate.text() else {
        let reason = candidate.finish_reason.as_deref().unwrap_or("UNSPECIFIED");
        if candidate.blocked() {
            let ratings = wire::ratings_summary(&candidate.safety_ratings);
            warn!(finish_reason = %reason, ratings = %ratings, "candidate blocked by safety filter");
            return Err(CallFailure::new(
                FailureKind::SafetyBlocked,
                format!("candidate blocked: {reason}"),
            ));
        }
        return Err(CallFailure::new(
            FailureKind::EmptyResponse,
            format!("candidate has no text (finish reason {reason})"),
        ));
    };

    let usage = response.usage_metadata.map(Usage::from).unwrap_or_default();
    Ok(CallResult::success(text, usage))
}
