use std::pin::Pin;

use futures::{Stream, StreamExt};
use reqwest::Response;
use serde::{Deserialize, Serialize};

use crate::assembler::DeltaAssembler;
use crate::error::LlmError;

/// Sentinel payload marking the end of an event stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Events surfaced to consumers of a message stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// An incremental fragment of assistant text.
    Delta { text: String },

    /// The stream terminated, via sentinel, stop event or end of transport.
    Done,
}

/// One JSON-framed event as it appears on the wire.
///
/// Only `content_block_delta` and `message_stop` matter; everything else
/// (`message_start`, `ping`, ...) deserializes fine and is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct WireEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub delta: Option<WireDelta>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireDelta {
    #[serde(default)]
    pub text: Option<String>,
}

impl WireEvent {
    /// Delta text, if this is a content delta carrying a non-empty fragment.
    pub fn delta_text(&self) -> Option<&str> {
        if self.event_type != "content_block_delta" {
            return None;
        }
        self.delta
            .as_ref()
            .and_then(|d| d.text.as_deref())
            .filter(|t| !t.is_empty())
    }

    pub fn is_stop(&self) -> bool {
        self.event_type == "message_stop"
    }
}

/// Parse a streaming messages response into discrete [`StreamEvent`]s.
///
/// Exactly one `Done` is yielded on any successful completion, including the
/// transport closing without a terminator event. After a transport error
/// nothing further is yielded.
pub fn parse_message_stream(
    response: Response,
) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send>> {
    let stream = response.bytes_stream();

    Box::pin(async_stream::stream! {
        let mut byte_chunks = Box::pin(stream);
        let mut assembler = DeltaAssembler::new();
        let mut failed = false;

        while let Some(chunk_result) = byte_chunks.next().await {
            match chunk_result {
                Ok(bytes) => {
                    for update in assembler.push_chunk(&bytes) {
                        yield Ok(StreamEvent::Delta { text: update.fragment });
                    }
                    if assembler.is_finished() {
                        break;
                    }
                }
                Err(e) => {
                    yield Err(LlmError::from(e));
                    failed = true;
                    break;
                }
            }
        }

        if !failed {
            yield Ok(StreamEvent::Done);
        }
    })
}
