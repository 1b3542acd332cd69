use super::Sentence;

/// Incremental framer for `$...\r\n` sentences.
///
/// Fed one byte at a time; hands back a completed sentence the moment its
/// terminator arrives. Holds no knowledge of sentence contents.
pub struct NmeaParser {
    buf: Sentence,
    in_sentence: bool,
    truncated: bool,
}

impl NmeaParser {
    pub fn new() -> Self {
        Self {
            buf: Sentence::default(),
            in_sentence: false,
            truncated: false,
        }
    }

    /// Whether the current (or just-closed) sentence overflowed the buffer.
    /// Cleared when the next `$` starts a fresh sentence.
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    pub fn parse_byte(&mut self, b: u8) -> Option<Sentence> {
        match b {
            // Start delimiter restarts assembly, even mid-sentence: a `$`
            // inside a corrupted stream discards the partial content.
            b'$' => {
                self.buf.clear();
                self.in_sentence = true;
                self.truncated = false;
                None
            }
            b'\r' | b'\n' => {
                let done = if self.in_sentence && !self.buf.is_empty() {
                    Some(self.buf)
                } else {
                    None
                };
                self.buf.clear();
                self.in_sentence = false;
                done
            }
            _ => {
                if self.in_sentence && self.buf.try_push(b).is_some() {
                    // Buffer full: the byte is dropped, not buffered.
                    self.truncated = true;
                }
                None
            }
        }
    }
}
