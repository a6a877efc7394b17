//! Bearer-token authentication.
//!
//! Token verification is a pluggable boundary: the service only needs a way
//! to turn a bearer token into a user id. [`StaticTokenVerifier`] covers
//! development and tests; a managed identity provider slots in behind the
//! same trait.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::error::ApiError;
use crate::state::AppState;

/// Resolves a bearer token to a user identity.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Returns the user id for a valid token, None otherwise.
    async fn verify(&self, token: &str) -> Option<String>;
}

/// Shared-secret verifier backed by a static token map.
///
/// Configured from a comma-separated list of `token=user_id` pairs.
pub struct StaticTokenVerifier {
    tokens: HashMap<String, String>,
}

impl StaticTokenVerifier {
    pub fn from_spec(spec: &str) -> Self {
        let tokens = spec
            .split(',')
            .filter_map(|pair| {
                let (token, user_id) = pair.trim().split_once('=')?;
                if token.is_empty() || user_id.is_empty() {
                    return None;
                }
                Some((token.to_string(), user_id.to_string()))
            })
            .collect();
        Self { tokens }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Option<String> {
        self.tokens.get(token).cloned()
    }
}

/// Authenticated caller, extracted from the Authorization header.
pub struct AuthUser {
    pub user_id: String,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized)?;

        let user_id = state
            .verifier
            .verify(token)
            .await
            .ok_or(ApiError::Unauthorized)?;

        Ok(AuthUser { user_id })
    }
}
