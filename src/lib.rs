#![cfg_attr(not(test), no_std)]

//! Hardware-agnostic core of a GPS track logger.
//!
//! Bytes from a serial-attached receiver are framed into NMEA sentences,
//! RMC sentences update a single current-fix record, and a fixed-period
//! scheduler decides when that record is appended to durable storage.
//! The UART and the storage medium stay behind traits
//! ([`embedded_hal_nb::serial::Read`] and [`logger::LogSink`]), so the
//! whole crate builds and tests on the host.
//!
//! The intended driving loop is single-threaded and cooperative:
//!
//! ```ignore
//! loop {
//!     gps.poll(&mut uart);
//!     match logger.tick(clock.now(), gps.fix()) {
//!         Ok(Some(outcome)) => info!("{}", outcome),
//!         Ok(None) => {}
//!         Err(e) => warn!("log sink: {}", e),
//!     }
//! }
//! ```

use chrono::FixedOffset;

pub mod gps;
pub mod logger;
pub mod nmea;

pub use gps::{Gps, PollSummary};
pub use logger::{FixLogger, LogAction, LogOutcome, LogScheduler, LogSink, SinkError};
pub use nmea::{DecodeOutcome, FixStatus, NmeaParser, RmcDecoder, RmcFix, Sentence};

/// Milliseconds on a 32-bit monotonic tick clock; wraps after ~49.7 days
/// and the scheduler's modular arithmetic tolerates the wrap.
pub type Instant = fugit::TimerInstantU32<1_000>;
/// Millisecond span on the same clock.
pub type Duration = fugit::TimerDurationU32<1_000>;

// Reference build configuration: IST (UTC+05:30), one record every 5 s.
pub const TZ_OFFSET_HOURS: i32 = 5;
pub const TZ_OFFSET_MINUTES: i32 = 30;
pub const LOG_PERIOD_MS: u32 = 5_000;

/// The fixed local-zone offset of the reference configuration.
pub fn tz_offset() -> FixedOffset {
    FixedOffset::east_opt(TZ_OFFSET_HOURS * 3600 + TZ_OFFSET_MINUTES * 60).unwrap()
}

/// The logging period of the reference configuration.
pub fn log_period() -> Duration {
    Duration::from_ticks(LOG_PERIOD_MS)
}
