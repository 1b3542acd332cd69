//! RMC ("recommended minimum") decoding into the current-fix record.

use core::fmt::Write as _;

use chrono::{FixedOffset, NaiveTime, TimeDelta, Timelike};
use heapless::String;

/// Positional layout of an RMC sentence. Fields are addressed by index and
/// nothing else; the names only make the indices readable. Index 0 is the
/// sentence id, 8 (track angle) and everything from 10 up are unused here.
mod field {
    pub const TIME: usize = 1;
    pub const STATUS: usize = 2;
    pub const LAT: usize = 3;
    pub const NS: usize = 4;
    pub const LON: usize = 5;
    pub const EW: usize = 6;
    pub const SPEED_KN: usize = 7;
    pub const DATE: usize = 9;
}

const KNOTS_TO_KMH: f32 = 1.852;

/// Receiver validity flag from the RMC status field.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FixStatus {
    Active,
    Void,
    #[default]
    Unknown,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeOutcome {
    /// The record now holds a complete, loggable fix.
    Updated,
    /// The receiver reports no usable signal. Not an error.
    SignalLost,
    /// Some other sentence type; the record was left untouched.
    NotRmc,
    /// RMC sentence without a complete fix (e.g. short date field).
    Malformed,
}

/// The latest decoded fix. A decoder owns exactly one of these for its
/// whole life; there is no history.
///
/// Coordinates stay in the receiver's raw degrees+minutes text form.
#[derive(Debug, Default, Clone)]
pub struct RmcFix {
    pub date: String<6>,
    pub local_time: String<6>,
    pub latitude: String<10>,
    pub lat_hemi: char,
    pub longitude: String<10>,
    pub lon_hemi: char,
    pub speed_kmh: f32,
    pub status: FixStatus,
    /// Raised only after a full, well-formed RMC sentence decoded; cleared
    /// at the start of every decode attempt.
    pub ready: bool,
}

impl RmcFix {
    /// Sole precondition for writing the record out.
    pub fn loggable(&self) -> bool {
        self.ready && self.status == FixStatus::Active
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for RmcFix {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "RmcFix {{ date: {}, local_time: {}, status: {}, ready: {} }}",
            self.date.as_str(),
            self.local_time.as_str(),
            self.status,
            self.ready,
        )
    }
}

/// Decodes RMC sentences into its fix record.
pub struct RmcDecoder {
    offset: FixedOffset,
    fix: RmcFix,
}

impl RmcDecoder {
    /// `offset` is the fixed local zone every UTC stamp is shifted into.
    pub fn new(offset: FixedOffset) -> Self {
        Self {
            offset,
            fix: RmcFix::default(),
        }
    }

    pub fn fix(&self) -> &RmcFix {
        &self.fix
    }

    /// Decode one framed sentence, updating the fix record in place.
    ///
    /// Fields are applied as they are traversed, so a sentence that goes
    /// bad partway leaves a mix of old and new fields behind with `ready`
    /// low. Downstream must gate on `ready`, never on individual fields.
    pub fn decode(&mut self, sentence: &str) -> DecodeOutcome {
        // Type filter before anything else: other sentence types must not
        // disturb the record, `ready` included.
        if !sentence.contains("GPRMC") && !sentence.contains("GNRMC") {
            return DecodeOutcome::NotRmc;
        }

        self.fix.ready = false;
        let mut utc: Option<&str> = None;

        for (idx, fld) in sentence.split(',').enumerate() {
            match idx {
                field::TIME => {
                    if fld.len() >= 6 {
                        utc = fld.get(..6);
                    }
                }
                field::STATUS => match fld.as_bytes().first() {
                    Some(b'A') => self.fix.status = FixStatus::Active,
                    Some(b'V') => self.fix.status = FixStatus::Void,
                    _ => {}
                },
                field::LAT => copy_truncated(&mut self.fix.latitude, fld),
                field::NS => {
                    if let Some(c) = fld.chars().next() {
                        self.fix.lat_hemi = c;
                    }
                }
                field::LON => copy_truncated(&mut self.fix.longitude, fld),
                field::EW => {
                    if let Some(c) = fld.chars().next() {
                        self.fix.lon_hemi = c;
                    }
                }
                field::SPEED_KN => {
                    self.fix.speed_kmh = if fld.is_empty() {
                        0.0
                    } else {
                        fld.parse::<f32>().unwrap_or(0.0) * KNOTS_TO_KMH
                    };
                }
                field::DATE => {
                    if let Some(date) = fld.get(..6) {
                        copy_truncated(&mut self.fix.date, date);
                        self.fix.ready = true;
                    }
                }
                _ => {}
            }
        }

        if self.fix.loggable() {
            if let Some(local) = utc.and_then(|u| to_local(u, self.offset)) {
                self.fix.local_time = local;
            }
            DecodeOutcome::Updated
        } else if self.fix.status == FixStatus::Void {
            DecodeOutcome::SignalLost
        } else {
            DecodeOutcome::Malformed
        }
    }
}

/// Shift an `HHMMSS` UTC stamp into `offset`'s zone, wrapping midnight in
/// either direction. `None` if the stamp doesn't parse as a time of day.
pub fn to_local(utc: &str, offset: FixedOffset) -> Option<String<6>> {
    let h: u32 = utc.get(0..2)?.parse().ok()?;
    let m: u32 = utc.get(2..4)?.parse().ok()?;
    let s: u32 = utc.get(4..6)?.parse().ok()?;
    let t = NaiveTime::from_hms_opt(h, m, s)?;
    let (local, _) = t.overflowing_add_signed(TimeDelta::seconds(offset.local_minus_utc() as i64));

    let mut out = String::new();
    // Three two-digit components always fit the 6-byte field.
    let _ = write!(
        out,
        "{:02}{:02}{:02}",
        local.hour(),
        local.minute(),
        local.second()
    );
    Some(out)
}

// strncpy-style bounded copy; anything past the field capacity is dropped.
fn copy_truncated<const N: usize>(dst: &mut String<N>, src: &str) {
    dst.clear();
    for c in src.chars() {
        if dst.push(c).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = "GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A";

    fn ist() -> FixedOffset {
        FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap()
    }

    fn decoder() -> RmcDecoder {
        RmcDecoder::new(ist())
    }

    #[test]
    fn full_sentence_updates_fix() {
        let mut d = decoder();
        assert_eq!(d.decode(FULL), DecodeOutcome::Updated);

        let fix = d.fix();
        assert!(fix.ready);
        assert_eq!(fix.status, FixStatus::Active);
        assert_eq!(fix.date.as_str(), "230394");
        assert_eq!(fix.local_time.as_str(), "180019");
        assert_eq!(fix.latitude.as_str(), "4807.038");
        assert_eq!(fix.lat_hemi, 'N');
        assert_eq!(fix.longitude.as_str(), "01131.000");
        assert_eq!(fix.lon_hemi, 'E');
        // 22.4 kn × 1.852
        assert!((fix.speed_kmh - 41.48848).abs() < 1e-3);
    }

    #[test]
    fn gnrmc_variant_is_accepted() {
        let mut d = decoder();
        let s = FULL.replace("GPRMC", "GNRMC");
        assert_eq!(d.decode(&s), DecodeOutcome::Updated);
    }

    #[test]
    fn void_status_is_signal_lost() {
        let mut d = decoder();
        let s = FULL.replace(",A,", ",V,");
        assert_eq!(d.decode(&s), DecodeOutcome::SignalLost);
        // Even with a valid date the record must not be treated as loggable.
        assert!(!d.fix().loggable());
    }

    #[test]
    fn void_wins_even_without_date() {
        let mut d = decoder();
        assert_eq!(d.decode("GPRMC,123519,V,,,,,,,,"), DecodeOutcome::SignalLost);
    }

    #[test]
    fn short_date_is_malformed() {
        let mut d = decoder();
        let s = FULL.replace("230394", "2303");
        assert_eq!(d.decode(&s), DecodeOutcome::Malformed);
        assert!(!d.fix().ready);
        // Partial-update policy: earlier fields did land.
        assert_eq!(d.fix().latitude.as_str(), "4807.038");
    }

    #[test]
    fn truncated_sentence_is_malformed() {
        let mut d = decoder();
        assert_eq!(
            d.decode("GPRMC,123519,A,4807.038,N"),
            DecodeOutcome::Malformed
        );
        assert!(!d.fix().ready);
    }

    #[test]
    fn non_rmc_leaves_record_untouched() {
        let mut d = decoder();
        assert_eq!(d.decode(FULL), DecodeOutcome::Updated);
        assert_eq!(
            d.decode("GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M"),
            DecodeOutcome::NotRmc
        );
        // A GGA between two RMCs must not lower readiness.
        assert!(d.fix().ready);
        assert_eq!(d.fix().date.as_str(), "230394");
    }

    #[test]
    fn empty_speed_field_reads_zero() {
        let mut d = decoder();
        assert_eq!(d.decode(FULL), DecodeOutcome::Updated);
        let s = FULL.replace(",022.4,", ",,");
        assert_eq!(d.decode(&s), DecodeOutcome::Updated);
        assert_eq!(d.fix().speed_kmh, 0.0);
    }

    #[test]
    fn unknown_status_keeps_previous() {
        let mut d = decoder();
        assert_eq!(d.decode(FULL), DecodeOutcome::Updated);
        let s = FULL.replace(",A,", ",?,");
        // Status survives from the previous sentence, so this still updates.
        assert_eq!(d.decode(&s), DecodeOutcome::Updated);
        assert_eq!(d.fix().status, FixStatus::Active);
    }

    #[test]
    fn oversize_coordinates_truncate_to_capacity() {
        let mut d = decoder();
        let s = FULL.replace("4807.038", "4807.03812345");
        assert_eq!(d.decode(&s), DecodeOutcome::Updated);
        assert_eq!(d.fix().latitude.as_str(), "4807.03812");
    }

    #[test]
    fn unparseable_time_keeps_previous_local_time() {
        let mut d = decoder();
        assert_eq!(d.decode(FULL), DecodeOutcome::Updated);
        let s = FULL.replace("123519", "12x519");
        assert_eq!(d.decode(&s), DecodeOutcome::Updated);
        assert_eq!(d.fix().local_time.as_str(), "180019");
    }

    #[test]
    fn conversion_carries_minutes_into_hours() {
        // 12:35:19 + 5:30 → minutes 35+30=65 carry one hour, 12+5+1=18.
        let local = to_local("123519", ist()).unwrap();
        assert_eq!(local.as_str(), "180019");
    }

    #[test]
    fn conversion_wraps_forward_past_midnight() {
        let local = to_local("233000", FixedOffset::east_opt(2 * 3600).unwrap()).unwrap();
        assert_eq!(local.as_str(), "013000");
    }

    #[test]
    fn conversion_wraps_backward_past_midnight() {
        let local = to_local("003000", FixedOffset::west_opt(3600).unwrap()).unwrap();
        assert_eq!(local.as_str(), "233000");
    }

    #[test]
    fn conversion_rejects_nonsense() {
        assert!(to_local("25zz00", ist()).is_none());
        assert!(to_local("1235", ist()).is_none());
    }
}
