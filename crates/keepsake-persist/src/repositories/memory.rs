use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::bson::oid::ObjectId;
use mongodb::{Client, Collection};

use crate::error::Result;
use crate::models::Memory;

#[derive(Clone)]
pub struct MemoryRepository {
    collection: Collection<Memory>,
}

impl MemoryRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("memories");
        Self { collection }
    }

    /// Save a single memory
    pub async fn save_memory(&self, memory: Memory) -> Result<ObjectId> {
        self.collection.insert_one(&memory).await?;
        Ok(memory.id)
    }

    /// Get a user's full feed, newest first
    pub async fn list_memories(&self, user_id: &str) -> Result<Vec<Memory>> {
        let filter = doc! { "user_id": user_id };
        let memories = self
            .collection
            .find(filter)
            .sort(doc! { "created_at": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(memories)
    }

    /// Get a user's most recent memories, newest first, capped at `limit`.
    /// Used to build chat context.
    pub async fn recent_memories(&self, user_id: &str, limit: i64) -> Result<Vec<Memory>> {
        let filter = doc! { "user_id": user_id };
        let memories = self
            .collection
            .find(filter)
            .sort(doc! { "created_at": -1 })
            .limit(limit)
            .await?
            .try_collect()
            .await?;
        Ok(memories)
    }

    /// Count a user's memories
    pub async fn count_memories(&self, user_id: &str) -> Result<u64> {
        let filter = doc! { "user_id": user_id };
        Ok(self.collection.count_documents(filter).await?)
    }
}
