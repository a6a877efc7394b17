use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures::stream::{Stream, StreamExt};
use serde::Deserialize;

use keepsake_llm::streaming::DONE_SENTINEL;
use keepsake_llm::{ChatMessage, MessagesRequest, StreamEvent};
use keepsake_persist::Memory;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const SYSTEM_PROMPT: &str = "You are a thoughtful, empathetic memory \
companion. You help users reflect on their memories, emotions, and personal \
growth. You have access to their memory scrapbook and can provide insights, \
identify patterns, and offer gentle guidance.\n\nBe warm, nostalgic, and \
supportive. Use their actual memories to give personalized insights. Help \
them see connections between memories, track emotional patterns, and \
celebrate their journey.";

#[derive(Debug, Deserialize)]
pub struct ChatInsightsRequest {
    pub messages: Vec<ChatMessage>,
}

/// Chat about memories and stream the reply as Server-Sent Events.
///
/// The caller supplies the full prior conversation plus the new user message;
/// the handler folds the caller's recent memories into the system prompt and
/// re-emits upstream content deltas in the documented wire shape, terminated
/// by the `[DONE]` sentinel.
pub async fn chat_insights(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<ChatInsightsRequest>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    if req.messages.is_empty() {
        return Err(ApiError::BadRequest("messages must not be empty".to_string()));
    }

    // A context fetch failure degrades to an uncontextualized chat rather
    // than failing the request.
    let memories = match state
        .persist
        .memories()
        .recent_memories(&user.user_id, state.config.chat.memory_limit)
        .await
    {
        Ok(memories) => memories,
        Err(e) => {
            tracing::error!(error = %e, "failed to fetch memories for context");
            Vec::new()
        }
    };

    tracing::info!(
        user_id = %user.user_id,
        turns = req.messages.len(),
        memories = memories.len(),
        "chat insights request"
    );

    let request = MessagesRequest::new(state.config.chat.model.clone(), req.messages)
        .with_system(build_system_prompt(&memories))
        .with_max_tokens(state.config.chat.max_tokens);

    let upstream = state.anthropic.messages_stream(&request).await?;

    let sse_stream = upstream.map(|event| {
        let sse_event = match event {
            Ok(StreamEvent::Delta { text }) => Event::default()
                .json_data(serde_json::json!({
                    "type": "content_block_delta",
                    "delta": { "text": text },
                }))
                .unwrap_or_else(|_| Event::default()),
            Ok(StreamEvent::Done) => Event::default().data(DONE_SENTINEL),
            Err(e) => {
                tracing::error!(error = %e, "upstream stream failed");
                Event::default()
                    .json_data(serde_json::json!({ "error": e.to_string() }))
                    .unwrap_or_else(|_| Event::default())
            }
        };
        Ok::<Event, Infallible>(sse_event)
    });

    Ok(Sse::new(sse_stream).keep_alive(KeepAlive::default()))
}

fn build_system_prompt(memories: &[Memory]) -> String {
    if memories.is_empty() {
        return SYSTEM_PROMPT.to_string();
    }

    let entries: Vec<String> = memories
        .iter()
        .map(|m| {
            let tags = if m.tags.is_empty() {
                "none".to_string()
            } else {
                m.tags.join(", ")
            };
            format!(
                "- {}: {} [Tags: {}]",
                m.created_at.format("%Y-%m-%d"),
                m.thought,
                tags
            )
        })
        .collect();

    format!(
        "{}\n\nUser's recent memories:\n{}",
        SYSTEM_PROMPT,
        entries.join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn memory_at(thought: &str, tags: &[&str], date: (i32, u32, u32)) -> Memory {
        let mut memory = Memory::new("user-1", thought)
            .with_tags(tags.iter().map(|t| t.to_string()).collect());
        memory.created_at = chrono::Utc
            .with_ymd_and_hms(date.0, date.1, date.2, 12, 0, 0)
            .unwrap();
        memory
    }

    #[test]
    fn test_prompt_without_memories() {
        assert_eq!(build_system_prompt(&[]), SYSTEM_PROMPT);
    }

    #[test]
    fn test_prompt_renders_memories_with_tags() {
        let memories = vec![
            memory_at("Walked on the beach", &["calm", "ocean"], (2025, 6, 1)),
            memory_at("Quiet morning", &[], (2025, 6, 2)),
        ];

        let prompt = build_system_prompt(&memories);
        assert!(prompt.starts_with(SYSTEM_PROMPT));
        assert!(prompt.contains("- 2025-06-01: Walked on the beach [Tags: calm, ocean]"));
        assert!(prompt.contains("- 2025-06-02: Quiet morning [Tags: none]"));
    }
}
