use std::fmt;

/// Construction-time failures. These should abort startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("credential not set: {var} is missing or empty")]
    MissingCredential { var: String },
    #[error("model name must not be empty")]
    InvalidModel,
}

/// What went wrong during a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Key rejected or missing permission.
    Auth,
    /// Could not reach the service or the connection dropped.
    Network,
    Timeout,
    Cancelled,
    /// Prompt or candidate stopped by the safety filter.
    SafetyBlocked,
    RateLimited,
    /// 5xx from the service.
    Server,
    /// Any other non-success status.
    Api,
    Parse,
    /// Well-formed response with no usable text.
    EmptyResponse,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Auth => "auth",
            FailureKind::Network => "network",
            FailureKind::Timeout => "timeout",
            FailureKind::Cancelled => "cancelled",
            FailureKind::SafetyBlocked => "safety_blocked",
            FailureKind::RateLimited => "rate_limited",
            FailureKind::Server => "server",
            FailureKind::Api => "api",
            FailureKind::Parse => "parse",
            FailureKind::EmptyResponse => "empty_response",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed call, carried inside a [`CallResult`](crate::CallResult) rather than raised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct CallFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl CallFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        let mut message = message.into();
        if message.is_empty() {
            message = kind.as_str().to_string();
        }
        Self { kind, message }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            FailureKind::Timeout
        } else if err.is_decode() {
            FailureKind::Parse
        } else {
            FailureKind::Network
        };
        Self::new(kind, err.to_string())
    }
}
