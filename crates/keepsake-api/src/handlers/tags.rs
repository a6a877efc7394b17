use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use keepsake_llm::suggest_tags;

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateTagsRequest {
    pub thought: String,
    #[serde(default)]
    pub has_photo: bool,
}

#[derive(Debug, Serialize)]
pub struct GenerateTagsResponse {
    pub tags: Vec<String>,
}

/// Suggest 2-4 classification tags for a memory.
pub async fn generate_tags(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<GenerateTagsRequest>,
) -> ApiResult<Json<GenerateTagsResponse>> {
    tracing::info!(user_id = %user.user_id, "generating tags");

    let tags = suggest_tags(
        &state.gateway,
        &state.config.tags.model,
        &req.thought,
        req.has_photo,
    )
    .await?;

    Ok(Json(GenerateTagsResponse { tags }))
}
