use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CallFailure;

/// Per-call options. Deserializes from a loose options map such as
/// `{"json": true}` or `{"response_format": {"type": "json_object"}}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CallOptions {
    /// Ask the model for JSON output. `null` counts as false.
    #[serde(deserialize_with = "null_as_false")]
    pub json: bool,
    pub response_format: Option<ResponseFormat>,
    #[serde(skip)]
    pub timeout: Option<Duration>,
}

impl CallOptions {
    pub fn json() -> Self {
        Self {
            json: true,
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn wants_json(&self) -> bool {
        self.json || self.response_format == Some(ResponseFormat::JsonObject)
    }
}

fn null_as_false<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or_default())
}

/// Only `json_object` turns on JSON mode; any other type is plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseFormat {
    Text,
    JsonObject,
    #[serde(other)]
    Other,
}

/// Token usage for a single call. Zero where the provider reports nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Normalized outcome of one invocation. Always returned, never raised.
#[derive(Debug, Clone, PartialEq)]
pub struct CallResult {
    pub raw_output: String,
    pub usage: Usage,
    pub error: Option<CallFailure>,
}

/// Successful half of [`CallResult::into_result`].
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub usage: Usage,
}

impl CallResult {
    pub fn success(raw_output: impl Into<String>, usage: Usage) -> Self {
        Self {
            raw_output: raw_output.into(),
            usage,
            error: None,
        }
    }

    pub fn failure(error: CallFailure) -> Self {
        Self {
            raw_output: String::new(),
            usage: Usage::default(),
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> Result<Completion, CallFailure> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(Completion {
                text: self.raw_output,
                usage: self.usage,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use serde_json::json;

    #[test]
    fn options_from_json_flag() {
        let opts: CallOptions = serde_json::from_value(json!({"json": true})).unwrap();
        assert!(opts.wants_json());
    }

    #[test]
    fn options_from_response_format() {
        let opts: CallOptions =
            serde_json::from_value(json!({"response_format": {"type": "json_object"}})).unwrap();
        assert!(!opts.json);
        assert!(opts.wants_json());

        let opts: CallOptions =
            serde_json::from_value(json!({"response_format": {"type": "text"}})).unwrap();
        assert!(!opts.wants_json());
    }

    #[test]
    fn unknown_response_format_is_plain_text() {
        let opts: CallOptions =
            serde_json::from_value(json!({"response_format": {"type": "json_schema"}})).unwrap();
        assert_eq!(opts.response_format, Some(ResponseFormat::Other));
        assert!(!opts.wants_json());
    }

    #[test]
    fn null_json_flag_is_false() {
        let opts: CallOptions = serde_json::from_value(json!({"json": null})).unwrap();
        assert!(!opts.json);
        assert!(!opts.wants_json());

        let opts: CallOptions =
            serde_json::from_value(json!({"json": null, "response_format": {"type": "json_object"}}))
                .unwrap();
        assert!(opts.wants_json());
    }

    #[test]
    fn empty_options_are_plain_text() {
        let opts: CallOptions = serde_json::from_value(json!({})).unwrap();
        assert!(!opts.wants_json());
        assert!(opts.timeout.is_none());
    }

    #[test]
    fn failure_has_empty_text_and_zero_usage() {
        let result = CallResult::failure(CallFailure::new(FailureKind::Auth, "bad key"));
        assert_eq!(result.raw_output, "");
        assert_eq!(result.usage, Usage::default());
        assert!(!result.is_ok());
        let err = result.into_result().unwrap_err();
        assert_eq!(err.kind, FailureKind::Auth);
    }

    #[test]
    fn success_converts_to_completion() {
        let usage = Usage {
            prompt_tokens: 3,
            completion_tokens: 1,
            total_tokens: 4,
        };
        let completion = CallResult::success("4", usage).into_result().unwrap();
        assert_eq!(completion.text, "4");
        assert_eq!(completion.usage.total_tokens, 4);
    }
}
