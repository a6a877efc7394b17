use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use keepsake_llm::LlmError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Missing or invalid credentials.")]
    Unauthorized,

    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    #[error("Payment required. Please add credits to continue.")]
    PaymentRequired,

    #[error("AI gateway error: {0}")]
    Upstream(String),

    #[error(transparent)]
    Persist(#[from] keepsake_persist::PersistError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<LlmError> for ApiError {
    fn from(err: LlmError) -> Self {
        if err.is_rate_limited() {
            Self::RateLimited
        } else if err.is_payment_required() {
            Self::PaymentRequired
        } else {
            Self::Upstream(err.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            Self::RateLimited => (StatusCode::TOO_MANY_REQUESTS, self.to_string()),
            Self::PaymentRequired => (StatusCode::PAYMENT_REQUIRED, self.to_string()),
            Self::Upstream(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
            Self::Persist(e) => {
                tracing::error!(error = %e, "persistence failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error.".to_string())
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, "internal failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error.".to_string())
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
