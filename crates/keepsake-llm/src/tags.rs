//! AI tag suggestion for memories.

use crate::error::Result;
use crate::gateway::{GatewayClient, GatewayMessage};

/// Tag applied when the model reply cannot be parsed.
pub const FALLBACK_TAG: &str = "memory";

const TAG_SYSTEM_PROMPT: &str = "You are a memory classification assistant. \
Generate 2-4 relevant tags for a memory based on the thought and whether it \
has a photo. Tags should be short (1-2 words), lowercase, and describe \
emotions, activities, people, places, or themes. Return ONLY a JSON array of \
strings, nothing else.";

/// Ask the gateway model for 2-4 classification tags for a memory.
pub async fn suggest_tags(
    client: &GatewayClient,
    model: &str,
    thought: &str,
    has_photo: bool,
) -> Result<Vec<String>> {
    let messages = vec![
        GatewayMessage::system(TAG_SYSTEM_PROMPT),
        GatewayMessage::user(format!(
            "Memory: \"{}\"\nHas photo: {}\n\nGenerate tags as a JSON array.",
            thought,
            if has_photo { "yes" } else { "no" },
        )),
    ];

    let content = client.chat(model, &messages).await?;
    Ok(parse_tag_array(&content))
}

/// Parse a model reply as a JSON array of strings, falling back to the
/// single [`FALLBACK_TAG`] when the reply is not usable.
pub fn parse_tag_array(content: &str) -> Vec<String> {
    match serde_json::from_str::<Vec<String>>(content.trim()) {
        Ok(tags) if !tags.is_empty() => tags,
        _ => {
            tracing::warn!("failed to parse tags, using fallback");
            vec![FALLBACK_TAG.to_string()]
        }
    }
}
