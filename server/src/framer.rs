//! Line framing for the text protocol
//!
//! Each connection owns a fixed-capacity [`LineBuffer`]. Bytes read from the
//! socket are appended to it and complete lines are extracted as soon as a
//! delimiter (`\r`) shows up. Input that fills the whole buffer without a
//! delimiter is dropped so a client can never make the server grow memory.

use log::debug;
use shared::DELIMITER;

/// Bounded accumulation buffer turning a byte stream into lines
#[derive(Debug)]
pub struct LineBuffer {
    buf: Box<[u8]>,
    /// End of unconsumed bytes; always `<= buf.len()`
    cursor: usize,
}

impl LineBuffer {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "line buffer needs a non-zero capacity");
        Self {
            buf: vec![0u8; capacity].into_boxed_slice(),
            cursor: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Number of buffered bytes not yet part of a complete line
    pub fn len(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    /// Appends `data` and returns every line it completes, in order.
    ///
    /// Data larger than the free space is consumed in capacity-sized steps,
    /// as if it had arrived in several reads. Bytes following the last
    /// delimiter stay buffered for the next call.
    pub fn push(&mut self, mut data: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();

        while !data.is_empty() {
            let room = self.capacity() - self.cursor;
            let take = room.min(data.len());
            self.buf[self.cursor..self.cursor + take].copy_from_slice(&data[..take]);
            self.cursor += take;
            data = &data[take..];

            while let Some(line) = self.extract_line() {
                lines.push(line);
            }

            if self.cursor == self.capacity() {
                debug!(
                    "Discarding {} bytes of unterminated input",
                    self.capacity()
                );
                self.cursor = 0;
            }
        }

        lines
    }

    /// Pulls the first complete line out of the buffer and compacts the rest.
    fn extract_line(&mut self) -> Option<String> {
        let pending = &self.buf[..self.cursor];
        let end = pending.iter().position(|&b| b == DELIMITER)?;

        // A leading '\n' is the tail of the previous "\r\n" terminator
        let start = usize::from(end > 0 && pending[0] == b'\n');
        let line = String::from_utf8_lossy(&pending[start..end]).into_owned();

        self.buf.copy_within(end + 1..self.cursor, 0);
        self.cursor -= end + 1;

        Some(line)
    }
}
