pub mod anthropic;
pub mod assembler;
pub mod buffer_utils;
pub mod error;
pub mod gateway;
pub mod streaming;
pub mod tags;
pub mod types;

pub use anthropic::{AnthropicClient, MessagesRequest};
pub use assembler::{assemble_message_stream, DeltaAssembler, Transcript, Update};
pub use buffer_utils::LineBuffer;
pub use error::LlmError;
pub use gateway::{GatewayClient, GatewayMessage};
pub use streaming::{parse_message_stream, StreamEvent};
pub use tags::suggest_tags;
pub use types::{ChatMessage, Role};
