use std::collections::VecDeque;

/// Byte-level line buffer for event-stream parsing.
///
/// Bytes are only decoded once a full `\n`-terminated record is buffered.
/// A `\n` byte never occurs inside a multi-byte UTF-8 sequence, so a
/// character whose bytes arrive in separate transport chunks is always
/// reassembled before decoding.
pub struct LineBuffer {
    buffer: VecDeque<u8>,
}

impl LineBuffer {
    /// Create a new buffer with specified capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
        }
    }

    /// Add bytes to the buffer
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buffer.extend(bytes);
    }

    /// Extract the next complete line, without its terminator.
    /// A trailing carriage return is stripped.
    /// Returns None until a line feed is buffered.
    pub fn next_line(&mut self) -> Option<String> {
        let newline_pos = self.buffer.iter().position(|&b| b == b'\n')?;

        let mut line_bytes: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
        line_bytes.pop();
        if line_bytes.last() == Some(&b'\r') {
            line_bytes.pop();
        }

        Some(String::from_utf8_lossy(&line_bytes).into_owned())
    }

    /// Push a previously extracted line back in front of the buffer,
    /// restoring its line feed. Used when a data payload turns out to be
    /// incomplete and must wait for more bytes.
    pub fn unread_line(&mut self, line: &str) {
        self.buffer.push_front(b'\n');
        for &b in line.as_bytes().iter().rev() {
            self.buffer.push_front(b);
        }
    }

    /// Current buffer size
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}
