//! Server-sent event framing

/// Incremental parser for SSE text streams.
///
/// Yields the `data:` payload of each complete frame. Frames may be split
/// across network chunks at any byte.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: String,
    pending: Vec<u8>,
}

impl SseDecoder {
    /// Feed bytes and drain the payloads of complete frames.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);
        let valid = match std::str::from_utf8(&self.pending) {
            Ok(_) => self.pending.len(),
            Err(error) if error.error_len().is_none() => error.valid_up_to(),
            Err(_) => self.pending.len(),
        };
        let decoded: Vec<u8> = self.pending.drain(..valid).collect();
        self.buffer
            .push_str(&String::from_utf8_lossy(&decoded).replace("\r\n", "\n"));

        let mut payloads = Vec::new();
        while let Some(split) = self.buffer.find("\n\n") {
            let frame: String = self.buffer.drain(..split + 2).collect();
            if let Some(payload) = extract_data_payload(&frame) {
                payloads.push(payload);
            }
        }
        payloads
    }

    /// Payload of a trailing frame that never got its blank line.
    pub fn finish(&mut self) -> Option<String> {
        if !self.pending.is_empty() {
            let rest = std::mem::take(&mut self.pending);
            self.buffer.push_str(&String::from_utf8_lossy(&rest));
        }
        let frame = std::mem::take(&mut self.buffer);
        extract_data_payload(&frame)
    }

    /// Whether no partial frame is buffered
    pub fn is_empty_buffer(&self) -> bool {
        self.buffer.trim().is_empty() && self.pending.is_empty()
    }
}

fn extract_data_payload(frame: &str) -> Option<String> {
    let data_lines: Vec<&str> = frame
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .collect();

    let payload = data_lines.join("\n");
    if payload.is_empty() || payload == "[DONE]" {
        None
    } else {
        Some(payload)
    }
}
