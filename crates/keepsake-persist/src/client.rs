use mongodb::Client;

use crate::error::{PersistError, Result};
use crate::repositories::MemoryRepository;

pub struct PersistClient {
    memory_repo: MemoryRepository,
}

impl PersistClient {
    pub async fn new(mongodb_uri: &str, db_name: &str) -> Result<Self> {
        let client = Client::with_uri_str(mongodb_uri)
            .await
            .map_err(|e| PersistError::Connection(e.to_string()))?;

        tracing::debug!(database = db_name, "mongodb client ready");

        let memory_repo = MemoryRepository::new(&client, db_name);

        Ok(Self { memory_repo })
    }

    pub fn memories(&self) -> &MemoryRepository {
        &self.memory_repo
    }
}
