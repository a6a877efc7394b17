use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// One scrapbook entry: a thought, an optional photo reference and the tags
/// attached at upload time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Memory {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub user_id: String,
    pub thought: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Memory {
    pub fn new(user_id: impl Into<String>, thought: impl Into<String>) -> Self {
        Self {
            id: ObjectId::new(),
            user_id: user_id.into(),
            thought: thought.into(),
            photo_url: None,
            tags: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_photo_url(mut self, photo_url: impl Into<String>) -> Self {
        self.photo_url = Some(photo_url.into());
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}
