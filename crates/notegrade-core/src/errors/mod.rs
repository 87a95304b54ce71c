use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse classification of a failed judge call, used for reporting only.
/// Every kind has the same control flow: the task is dropped and the batch continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JudgeFailureKind {
    RateLimit,
    Timeout,
    Auth,
    Server,
    Network,
    Other,
}

impl JudgeFailureKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => JudgeFailureKind::Auth,
            408 => JudgeFailureKind::Timeout,
            429 => JudgeFailureKind::RateLimit,
            500..=599 => JudgeFailureKind::Server,
            _ => JudgeFailureKind::Other,
        }
    }

    /// Best-effort classification from free-form provider messages.
    pub fn classify_message(message: &str) -> Self {
        let msg = message.to_lowercase();
        if msg.contains("rate limit") || msg.contains("429") || msg.contains("quota") {
            JudgeFailureKind::RateLimit
        } else if msg.contains("timeout") || msg.contains("timed out") {
            JudgeFailureKind::Timeout
        } else if msg.contains("401")
            || msg.contains("403")
            || msg.contains("unauthorized")
            || msg.contains("api key")
        {
            JudgeFailureKind::Auth
        } else if msg.contains("500")
            || msg.contains("502")
            || msg.contains("503")
            || msg.contains("504")
            || msg.contains("provider error")
        {
            JudgeFailureKind::Server
        } else if msg.contains("network") || msg.contains("connection") || msg.contains("dns") {
            JudgeFailureKind::Network
        } else {
            JudgeFailureKind::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JudgeFailureKind::RateLimit => "rate_limit",
            JudgeFailureKind::Timeout => "timeout",
            JudgeFailureKind::Auth => "auth",
            JudgeFailureKind::Server => "server",
            JudgeFailureKind::Network => "network",
            JudgeFailureKind::Other => "other",
        }
    }
}

/// Typed transport error raised by LLM providers; travels inside `anyhow::Error`
/// and is recovered with `downcast_ref`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{provider} API error{}: {message}", .status.map(|s| format!(" (status {s})")).unwrap_or_default())]
pub struct ProviderError {
    pub provider: String,
    pub status: Option<u16>,
    pub message: String,
}

impl ProviderError {
    pub fn new(provider: impl Into<String>, status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            status,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> JudgeFailureKind {
        match self.status {
            Some(status) => JudgeFailureKind::from_status(status),
            None => JudgeFailureKind::classify_message(&self.message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JudgeError {
    #[error("judge call failed ({}): {message}", .kind.as_str())]
    CallFailed {
        kind: JudgeFailureKind,
        status: Option<u16>,
        message: String,
    },

    #[error("judge response invalid: {reason}")]
    ResponseInvalid { reason: String },
}

impl JudgeError {
    pub fn response_invalid(reason: impl Into<String>) -> Self {
        JudgeError::ResponseInvalid {
            reason: reason.into(),
        }
    }

    /// Maps a provider failure onto `CallFailed`, keeping the status when the
    /// provider raised a typed [`ProviderError`].
    pub fn from_provider(err: &anyhow::Error) -> Self {
        if let Some(provider) = err.downcast_ref::<ProviderError>() {
            return JudgeError::CallFailed {
                kind: provider.kind(),
                status: provider.status,
                message: provider.to_string(),
            };
        }
        let message = format!("{err:#}");
        JudgeError::CallFailed {
            kind: JudgeFailureKind::classify_message(&message),
            status: None,
            message,
        }
    }

    /// Stable label for reports: `judge_call_failed` or `judge_response_invalid`.
    pub fn code(&self) -> &'static str {
        match self {
            JudgeError::CallFailed { .. } => "judge_call_failed",
            JudgeError::ResponseInvalid { .. } => "judge_response_invalid",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    #[error("batch aborted: {reason}")]
    Aborted { reason: String },
}

impl BatchError {
    pub fn aborted(reason: impl Into<String>) -> Self {
        BatchError::Aborted {
            reason: reason.into(),
        }
    }
}

/// Why a group produced no tasks. Recovered locally, never fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    ReferenceMissing,
    NoVariants,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::ReferenceMissing => "reference missing",
            SkipReason::NoVariants => "no variants",
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write config {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("unsupported config version {found} (supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("invalid config: {0}")]
    Invalid(String),
}
