use async_trait::async_trait;
use tracing::debug;

use super::GenerativeBackend;
use crate::config::DEFAULT_BASE_URL;
use crate::error::{CallFailure, FailureKind};
use crate::wire::{ErrorEnvelope, GenerateContentRequest, GenerateContentResponse};

/// Gemini client via the Generative Language `generateContent` endpoint.
///
/// Owns its key and HTTP client; nothing is configured process-wide.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.into(),
        }
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }
}

/// Map a non-success status and its body to a typed failure.
pub(crate) fn classify_status(status: u16, body: &str) -> CallFailure {
    let envelope = serde_json::from_str::<ErrorEnvelope>(body).ok();
    let key_invalid = envelope
        .as_ref()
        .is_some_and(|e| e.error.has_reason("API_KEY_INVALID"));

    let kind = match status {
        401 | 403 => FailureKind::Auth,
        400 if key_invalid => FailureKind::Auth,
        429 => FailureKind::RateLimited,
        500..=599 => FailureKind::Server,
        _ => FailureKind::Api,
    };

    let message = match envelope {
        Some(e) if !e.error.message.is_empty() && !e.error.status.is_empty() => {
            format!("API returned {status} ({}): {}", e.error.status, e.error.message)
        }
        Some(e) if !e.error.message.is_empty() => {
            format!("API returned {status}: {}", e.error.message)
        }
        _ => format!("API returned {status}: {}", body.trim()),
    };
    CallFailure::new(kind, message)
}

#[async_trait]
impl GenerativeBackend for GeminiClient {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, CallFailure> {
        debug!(
            model = %model,
            json_mode = request.response_mime_type().is_some(),
            "gemini generateContent request"
        );

        let resp = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(CallFailure::from_reqwest)?;

        let status = resp.status().as_u16();
        let text = resp.text().await.map_err(CallFailure::from_reqwest)?;

        if !(200..300).contains(&status) {
            return Err(classify_status(status, &text));
        }

        serde_json::from_str(&text).map_err(|e| {
            CallFailure::new(FailureKind::Parse, format!("failed to parse response: {e}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_key_400_is_auth() {
        let body = r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT","details":[{"reason":"API_KEY_INVALID"}]}}"#;
        let failure = classify_status(400, body);
        assert_eq!(failure.kind, FailureKind::Auth);
        assert!(failure.message.contains("API key not valid"));
        assert!(failure.message.contains("400"));
        assert!(failure.message.contains("INVALID_ARGUMENT"));
    }

    #[test]
    fn plain_400_is_api() {
        let body = r#"{"error":{"code":400,"message":"Invalid JSON payload","status":"INVALID_ARGUMENT"}}"#;
        let failure = classify_status(400, body);
        assert_eq!(failure.kind, FailureKind::Api);
        assert_eq!(
            failure.message,
            "API returned 400 (INVALID_ARGUMENT): Invalid JSON payload"
        );
    }

    #[test]
    fn status_mapping() {
        assert_eq!(classify_status(403, "").kind, FailureKind::Auth);
        assert_eq!(classify_status(429, "").kind, FailureKind::RateLimited);
        assert_eq!(classify_status(503, "").kind, FailureKind::Server);
        assert_eq!(classify_status(404, "").kind, FailureKind::Api);
    }

    #[test]
    fn unparseable_body_kept_verbatim() {
        let failure = classify_status(502, "<html>bad gateway</html>");
        assert_eq!(failure.message, "API returned 502: <html>bad gateway</html>");
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        let client = GeminiClient::new("k").with_base_url("http://localhost:1234/");
        assert_eq!(
            client.endpoint("gemini-flash-latest"),
            "http://localhost:1234/v1beta/models/gemini-flash-latest:generateContent"
        );
    }
}
