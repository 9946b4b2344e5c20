//! Incremental SSE framing
//!
//! Splits the raw response body into complete `data:` frames. Transport chunk
//! boundaries never line up with record boundaries, so the framer keeps the
//! unfinished tail of the body between calls and only emits a frame once its
//! terminating blank line has arrived.

/// Stateful byte framer for one response body.
///
/// Records are separated by a blank line (`\n\n`, `\r\n\r\n`, or a mix of the
/// two). Within a record, every `data:` line contributes to the frame payload;
/// comment lines (`:`) and the `event:`, `id:` and `retry:` fields carry no
/// payload and are skipped.
#[derive(Debug, Default)]
pub struct ByteFramer {
    /// Unconsumed tail of the body. Always starts at a record boundary.
    buffer: Vec<u8>,
    /// Offset just past the last complete line in `buffer`. Bytes before it
    /// have been scanned and are not scanned again.
    scanned: usize,
}

impl ByteFramer {
    /// Create an empty framer
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `bytes` and return every frame completed by them, in order.
    ///
    /// Zero-length input is a keepalive and returns nothing.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        if bytes.is_empty() {
            return Vec::new();
        }
        self.buffer.extend_from_slice(bytes);

        let mut frames = Vec::new();
        let mut record_start = 0;

        while let Some(offset) = self.buffer[self.scanned..].iter().position(|&b| b == b'\n') {
            let line_start = self.scanned;
            let line_end = line_start + offset;
            self.scanned = line_end + 1;

            if strip_cr(&self.buffer[line_start..line_end]).is_empty() {
                if let Some(frame) = parse_record(&self.buffer[record_start..line_start]) {
                    frames.push(frame);
                }
                record_start = self.scanned;
            }
        }

        if record_start > 0 {
            self.buffer.drain(..record_start);
            self.scanned -= record_start;
        }

        frames
    }

    /// Flush the tail at end of body.
    ///
    /// Some servers close the body right after the last `data:` line without
    /// the terminating blank line; end of body completes that record.
    pub fn finish(&mut self) -> Option<String> {
        let frame = parse_record(&self.buffer);
        self.reset();
        frame
    }

    /// Discard all buffered data
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.scanned = 0;
    }

    /// Number of bytes held for the next call
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }
}

fn strip_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Extract the payload of one complete record.
///
/// Returns `None` for records without a non-empty `data:` payload (keepalives,
/// comment-only records).
fn parse_record(record: &[u8]) -> Option<String> {
    // Record boundaries are ASCII, so a complete record holds whole UTF-8 sequences.
    let text = String::from_utf8_lossy(record);

    let data_lines: Vec<&str> = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|value| value.strip_prefix(' ').unwrap_or(value))
        .collect();

    if data_lines.is_empty() {
        return None;
    }

    let payload = data_lines.join("\n");
    let payload = payload.trim();
    if payload.is_empty() {
        None
    } else {
        Some(payload.to_string())
    }
}
