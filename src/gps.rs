//! Serial-facing driver: drains ready bytes, frames them, decodes RMC.

use chrono::FixedOffset;
use embedded_hal_nb::serial::Read;

use crate::nmea::{DecodeOutcome, NmeaParser, RmcDecoder, RmcFix};

/// Upper bound on bytes consumed per `poll` call, so one call can never
/// monopolize the loop when the receiver floods the UART.
pub const POLL_BUDGET: usize = 64;

/// What a single `poll` call saw, for the status channel.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollSummary {
    pub bytes: usize,
    pub sentences: usize,
    pub updates: usize,
    pub read_error: bool,
}

pub struct Gps {
    parser: NmeaParser,
    decoder: RmcDecoder,

    pub last_outcome: Option<DecodeOutcome>,
    pub count: usize,
}

impl Gps {
    pub fn new(offset: FixedOffset) -> Self {
        Self {
            parser: NmeaParser::new(),
            decoder: RmcDecoder::new(offset),
            last_outcome: None,
            count: 0,
        }
    }

    /// The current fix record. One writer (this driver), any readers.
    pub fn fix(&self) -> &RmcFix {
        self.decoder.fix()
    }

    /// Drain bytes already waiting on the wire. Never blocks: stops at
    /// `WouldBlock`, on a line error, or after [`POLL_BUDGET`] bytes.
    pub fn poll<R: Read<u8>>(&mut self, serial: &mut R) -> PollSummary {
        let mut summary = PollSummary::default();
        for _ in 0..POLL_BUDGET {
            let b = match serial.read() {
                Ok(b) => b,
                Err(nb::Error::WouldBlock) => break,
                Err(nb::Error::Other(_)) => {
                    // Line noise; the framer resynchronizes on the next `$`.
                    summary.read_error = true;
                    break;
                }
            };
            self.count += 1;
            summary.bytes += 1;
            #[cfg(feature = "defmt")]
            defmt::trace!("got {:x} #{}", b, self.count);

            if let Some(sentence) = self.parser.parse_byte(b) {
                summary.sentences += 1;
                let outcome = match sentence.as_str() {
                    Some(s) => self.decoder.decode(s),
                    // Undecodable bytes never reach the RMC filter.
                    None => DecodeOutcome::NotRmc,
                };
                #[cfg(feature = "defmt")]
                defmt::debug!("decode: {}", outcome);
                if outcome == DecodeOutcome::Updated {
                    summary.updates += 1;
                }
                self.last_outcome = Some(outcome);
            }
        }
        summary
    }
}
