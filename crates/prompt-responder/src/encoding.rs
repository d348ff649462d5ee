//! Incremental UTF-8 decoding for pipe output.
//!
//! Pipes deliver bytes in arbitrary chunks, so a multi-byte character (the
//! `❯` pointer of a list prompt, for instance) can be split between two reads.
//! [`Utf8StreamDecoder`] holds back an incomplete trailing sequence until the
//! rest arrives instead of replacing it with U+FFFD.

/// Stateful UTF-8 decoder for a byte stream.
#[derive(Debug, Default)]
pub struct Utf8StreamDecoder {
    /// Bytes of an incomplete character carried to the next call.
    pending: Vec<u8>,
    /// Number of replacement characters emitted so far.
    replacements: usize,
}

impl Utf8StreamDecoder {
    /// Create a new decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a chunk, returning all complete characters.
    ///
    /// Invalid sequences become U+FFFD. An incomplete sequence at the end of
    /// the chunk is kept for the next call.
    pub fn decode(&mut self, bytes: &[u8]) -> String {
        let mut data = std::mem::take(&mut self.pending);
        data.extend_from_slice(bytes);

        let mut result = String::with_capacity(data.len());
        let mut i = 0;

        while i < data.len() {
            match std::str::from_utf8(&data[i..]) {
                Ok(valid) => {
                    result.push_str(valid);
                    break;
                }
                Err(e) => {
                    let valid_up_to = e.valid_up_to();
                    result.push_str(&String::from_utf8_lossy(&data[i..i + valid_up_to]));
                    i += valid_up_to;

                    match e.error_len() {
                        Some(error_len) => {
                            result.push('\u{FFFD}');
                            self.replacements += 1;
                            i += error_len;
                        }
                        None => {
                            // Truncated character at the end of the chunk
                            self.pending.extend_from_slice(&data[i..]);
                            break;
                        }
                    }
                }
            }
        }

        result
    }

    /// Flush any held-back bytes once the stream has ended.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            return String::new();
        }
        let pending = std::mem::take(&mut self.pending);
        let text = String::from_utf8_lossy(&pending).into_owned();
        self.replacements += text.matches('\u{FFFD}').count();
        text
    }

    /// Check if bytes are held back waiting for the rest of a character.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Number of replacement characters emitted so far.
    #[must_use]
    pub const fn replacements(&self) -> usize {
        self.replacements
    }
}
