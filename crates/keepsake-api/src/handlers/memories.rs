use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use keepsake_llm::suggest_tags;
use keepsake_llm::tags::FALLBACK_TAG;
use keepsake_persist::Memory;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateMemoryRequest {
    pub thought: String,
    #[serde(default)]
    pub photo_url: Option<String>,
    /// When absent, tags are generated server-side.
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// Save a new memory, generating tags when the caller did not supply any.
pub async fn create_memory(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<CreateMemoryRequest>,
) -> ApiResult<(StatusCode, Json<Memory>)> {
    if req.thought.trim().is_empty() {
        return Err(ApiError::BadRequest("thought must not be empty".to_string()));
    }

    let tags = match req.tags {
        Some(tags) if !tags.is_empty() => tags,
        _ => {
            // A tag-generation failure never blocks the upload.
            match suggest_tags(
                &state.gateway,
                &state.config.tags.model,
                &req.thought,
                req.photo_url.is_some(),
            )
            .await
            {
                Ok(tags) => tags,
                Err(e) => {
                    tracing::error!(error = %e, "tag generation failed");
                    vec![FALLBACK_TAG.to_string()]
                }
            }
        }
    };

    let mut memory = Memory::new(&user.user_id, req.thought).with_tags(tags);
    if let Some(photo_url) = req.photo_url {
        memory = memory.with_photo_url(photo_url);
    }

    state.persist.memories().save_memory(memory.clone()).await?;

    tracing::info!(user_id = %user.user_id, memory_id = %memory.id, "memory saved");

    Ok((StatusCode::CREATED, Json(memory)))
}

/// The caller's feed, newest first.
pub async fn list_memories(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> ApiResult<Json<Vec<Memory>>> {
    let memories = state.persist.memories().list_memories(&user.user_id).await?;
    Ok(Json(memories))
}
