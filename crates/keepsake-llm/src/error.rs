use reqwest::StatusCode;
use thiserror::Error;

/// Errors crossing the client boundary.
///
/// Malformed individual events inside a stream are absorbed by the assembler
/// and never surface here; only transport failures and explicit non-success
/// responses from the upstream service do.
#[derive(Debug, Error)]
pub enum LlmError {
    /// The upstream service answered with a non-success status before any
    /// streaming began.
    #[error("upstream error ({status}): {message}")]
    Upstream { status: StatusCode, message: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl LlmError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::Upstream { status, .. } if *status == StatusCode::TOO_MANY_REQUESTS)
    }

    pub fn is_payment_required(&self) -> bool {
        matches!(self, Self::Upstream { status, .. } if *status == StatusCode::PAYMENT_REQUIRED)
    }
}

pub type Result<T> = std::result::Result<T, LlmError>;
