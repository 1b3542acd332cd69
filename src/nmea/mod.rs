//! NMEA 0183 sentence handling: stream framing and RMC decoding.

use tinyvec::ArrayVec;

pub mod parser;
pub mod rmc;

pub use parser::NmeaParser;
pub use rmc::{to_local, DecodeOutcome, FixStatus, RmcDecoder, RmcFix};

/// NMEA 0183 caps a sentence at 82 characters between `$` and the line end.
pub const SENTENCE_CAP: usize = 82;

/// One framed sentence, `$` and line terminator stripped.
#[derive(Default, Debug, Copy, Clone)]
pub struct Sentence(pub ArrayVec<[u8; SENTENCE_CAP]>);

#[cfg(feature = "defmt")]
impl defmt::Format for Sentence {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}", self.0.as_slice())
    }
}

impl core::ops::Deref for Sentence {
    type Target = ArrayVec<[u8; SENTENCE_CAP]>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl core::ops::DerefMut for Sentence {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl Sentence {
    /// Sentences come off an ASCII wire; anything non-UTF8 is line noise.
    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(self.0.as_slice()).ok()
    }
}
