pub mod client;
pub mod error;
pub mod models;
pub mod repositories;

pub use client::PersistClient;
pub use error::PersistError;
pub use models::Memory;
pub use repositories::MemoryRepository;
