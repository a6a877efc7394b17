use futures::StreamExt;
use reqwest::Response;

use crate::buffer_utils::LineBuffer;
use crate::error::Result;
use crate::streaming::{WireEvent, DONE_SENTINEL};
use crate::types::ChatMessage;

/// One cumulative update produced by a recognized content delta.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    /// The text fragment carried by the delta event.
    pub fragment: String,
    /// The whole assistant message assembled so far, fragment included.
    pub message: String,
}

/// Write access to the tail of a caller-owned conversation log.
///
/// The assembler mutates exactly the most recent entry; the caller creates an
/// empty assistant placeholder before streaming begins and retracts it if the
/// session errors.
pub trait Transcript {
    /// Append a new entry to the log.
    fn push_message(&mut self, message: ChatMessage);

    /// Replace the content of the most recent entry.
    fn replace_last(&mut self, content: &str);
}

impl Transcript for Vec<ChatMessage> {
    fn push_message(&mut self, message: ChatMessage) {
        self.push(message);
    }

    fn replace_last(&mut self, content: &str) {
        if let Some(last) = self.last_mut() {
            last.content = content.to_string();
        }
    }
}

/// Incremental assembler for one streaming chat session.
///
/// Feed it transport chunks as they arrive; it extracts event-stream lines,
/// folds `content_block_delta` payloads into a growing assistant message and
/// stops on `[DONE]` or `message_stop`. Chunk boundaries never affect the
/// assembled output: partial lines stay buffered, and a data line whose JSON
/// payload is still incomplete is pushed back in front of the buffer until
/// more bytes arrive.
pub struct DeltaAssembler {
    buffer: LineBuffer,
    message: String,
    finished: bool,
    pending_retry: Option<String>,
}

impl DeltaAssembler {
    pub fn new() -> Self {
        Self {
            buffer: LineBuffer::with_capacity(8192),
            message: String::new(),
            finished: false,
            pending_retry: None,
        }
    }

    /// Feed one transport chunk. Returns a cumulative [`Update`] per content
    /// delta recognized in it, in stream order. Once the stream has
    /// terminated, further chunks are ignored.
    pub fn push_chunk(&mut self, bytes: &[u8]) -> Vec<Update> {
        let mut updates = Vec::new();
        if self.finished {
            return updates;
        }

        self.buffer.extend(bytes);

        while !self.finished {
            let Some(line) = self.buffer.next_line() else {
                break;
            };

            // SSE comments and blank separators carry no data. Lines with
            // any other field name (e.g. `event:`) are skipped too.
            if line.trim().is_empty() || line.starts_with(':') {
                continue;
            }
            let Some(payload) = line.strip_prefix("data: ") else {
                continue;
            };

            let payload = payload.trim();
            if payload == DONE_SENTINEL {
                self.finished = true;
                break;
            }

            match serde_json::from_str::<WireEvent>(payload) {
                Ok(event) => {
                    self.pending_retry = None;
                    if let Some(text) = event.delta_text() {
                        self.message.push_str(text);
                        updates.push(Update {
                            fragment: text.to_string(),
                            message: self.message.clone(),
                        });
                    } else if event.is_stop() {
                        self.finished = true;
                    }
                }
                Err(_) if self.pending_retry.as_deref() == Some(line.as_str()) => {
                    // Same line failed after more bytes arrived, so it is
                    // genuinely malformed rather than partial. Drop it and
                    // keep the session going.
                    tracing::debug!(line_len = line.len(), "discarding unparseable data line");
                    self.pending_retry = None;
                }
                Err(_) => {
                    // The payload may have been cut at the JSON level by a
                    // chunk boundary. Put the line back and wait for more
                    // bytes before extracting anything further.
                    self.pending_retry = Some(line.clone());
                    self.buffer.unread_line(&line);
                    break;
                }
            }
        }

        updates
    }

    /// The assistant message assembled so far.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether a terminator (`[DONE]` or `message_stop`) has been seen.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Consume the assembler, yielding the final message. End of transport
    /// without a terminator event is a normal completion.
    pub fn into_message(self) -> String {
        self.message
    }
}

impl Default for DeltaAssembler {
    fn default() -> Self {
        Self::new()
    }
}

/// Drive an event-stream response to completion, folding every content delta
/// into the transcript's most recent entry.
///
/// The caller pushes an empty assistant placeholder before calling, so every
/// update has a target to mutate; on `Err` the caller retracts it. Updates
/// are applied in stream order, and none are applied after an error. Dropping
/// the returned future cancels the session and releases the transport.
pub async fn assemble_message_stream<T: Transcript>(
    response: Response,
    transcript: &mut T,
) -> Result<String> {
    let mut byte_chunks = Box::pin(response.bytes_stream());
    let mut assembler = DeltaAssembler::new();

    while let Some(chunk) = byte_chunks.next().await {
        let bytes = chunk?;
        for update in assembler.push_chunk(&bytes) {
            transcript.replace_last(&update.message);
        }
        if assembler.is_finished() {
            break;
        }
    }

    Ok(assembler.into_message())
}
