//! Time-gated persistence of the current fix.

use core::fmt::Write as _;

use heapless::String;
use thiserror::Error;

use crate::nmea::{FixStatus, RmcFix};
use crate::{Duration, Instant};

/// Longest line ever emitted: five comma-joined fields, speed included,
/// stays well under this.
pub const LINE_CAP: usize = 48;

pub type LogLine = String<LINE_CAP>;

/// Append-only durable storage for fix records.
///
/// Mirrors the open/write/close shape of a FAT volume on an SD card; each
/// call may fail and the caller decides what a failure means.
pub trait LogSink {
    type Error;

    fn open(&mut self) -> Result<(), Self::Error>;
    fn write_line(&mut self, line: &str) -> Result<(), Self::Error>;
    fn close(&mut self) -> Result<(), Self::Error>;
}

impl<T: LogSink + ?Sized> LogSink for &mut T {
    type Error = T::Error;

    fn open(&mut self) -> Result<(), Self::Error> {
        (**self).open()
    }

    fn write_line(&mut self, line: &str) -> Result<(), Self::Error> {
        (**self).write_line(line)
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        (**self).close()
    }
}

/// Which sink operation failed. The tick's record is dropped either way;
/// nothing is retried or queued.
#[derive(Debug, Error, Copy, Clone, PartialEq, Eq)]
pub enum SinkError<E> {
    #[error("log sink open failed")]
    Open(E),
    #[error("log sink write failed")]
    Write(E),
    #[error("log sink close failed")]
    Close(E),
}

/// Decision produced by one scheduler fire. Executing it is someone
/// else's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogAction {
    /// Append this line to the sink.
    Write(LogLine),
    /// Receiver says Void: report the outage, write nothing.
    ReportLost,
    /// No complete fix decoded yet.
    ReportNotReady,
}

#[cfg(feature = "defmt")]
impl defmt::Format for LogAction {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            LogAction::Write(line) => defmt::write!(fmt, "Write({})", line.as_str()),
            LogAction::ReportLost => defmt::write!(fmt, "ReportLost"),
            LogAction::ReportNotReady => defmt::write!(fmt, "ReportNotReady"),
        }
    }
}

/// What one executed tick did, for the status channel.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LogOutcome {
    Wrote,
    SignalLost,
    NotReady,
}

/// Pure decision function over elapsed time and fix state.
pub struct LogScheduler {
    period: Duration,
    last_fire: Instant,
}

impl LogScheduler {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            // Zero epoch, so the first record lands one full period in.
            last_fire: Instant::from_ticks(0),
        }
    }

    /// `Some(action)` once per elapsed period, `None` between fires.
    pub fn tick(&mut self, now: Instant, fix: &RmcFix) -> Option<LogAction> {
        match now.checked_duration_since(self.last_fire) {
            Some(elapsed) if elapsed >= self.period => {}
            _ => return None,
        }
        // Anchor to `now`, not `last_fire + period`: a late tick costs one
        // stale interval, never a catch-up burst.
        self.last_fire = now;

        Some(if fix.loggable() {
            LogAction::Write(format_fix(fix))
        } else if fix.status == FixStatus::Void {
            LogAction::ReportLost
        } else {
            LogAction::ReportNotReady
        })
    }
}

/// `DDMMYY,HHMMSS,<lon><E|W>,<lat><N|S>,<km/h to one decimal>`, the exact
/// layout readers of the card expect.
pub fn format_fix(fix: &RmcFix) -> LogLine {
    let mut line = LogLine::new();
    let _ = write!(
        line,
        "{},{},{}{},{}{},{:.1}",
        fix.date, fix.local_time, fix.longitude, fix.lon_hemi, fix.latitude, fix.lat_hemi, fix.speed_kmh
    );
    line
}

/// Drives scheduler decisions into a sink.
pub struct FixLogger<S: LogSink> {
    scheduler: LogScheduler,
    sink: S,
}

impl<S: LogSink> FixLogger<S> {
    /// Probes the sink once. A logger that cannot reach its storage at
    /// startup is unusable; the returned error is the caller's halt signal.
    pub fn new(mut sink: S, period: Duration) -> Result<Self, SinkError<S::Error>> {
        sink.open().map_err(SinkError::Open)?;
        sink.close().map_err(SinkError::Close)?;
        Ok(Self {
            scheduler: LogScheduler::new(period),
            sink,
        })
    }

    /// Run one loop iteration's worth of logging. `Ok(None)` means the
    /// gate hasn't opened yet. A sink error drops the current record;
    /// the next fire starts from scratch.
    pub fn tick(
        &mut self,
        now: Instant,
        fix: &RmcFix,
    ) -> Result<Option<LogOutcome>, SinkError<S::Error>> {
        let action = match self.scheduler.tick(now, fix) {
            Some(action) => action,
            None => return Ok(None),
        };
        match action {
            LogAction::Write(line) => {
                self.sink.open().map_err(SinkError::Open)?;
                self.sink.write_line(&line).map_err(SinkError::Write)?;
                self.sink.close().map_err(SinkError::Close)?;
                Ok(Some(LogOutcome::Wrote))
            }
            LogAction::ReportLost => Ok(Some(LogOutcome::SignalLost)),
            LogAction::ReportNotReady => Ok(Some(LogOutcome::NotReady)),
        }
    }
}
