//! Leap second table and GPST/UTC conversions.
use crate::epoch::Epoch;
use crate::timescale::TimeScale;
use log::debug;
use std::fs::read_to_string;
use std::path::Path;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Leap second table loading related errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to read leap second table")]
    IoError(#[from] std::io::Error),
    #[error("no leap second record recognized")]
    NoEntries,
}

/// One leap second introduction: the UTC instant it became effective
/// and the UTC-GPST offset (s) from that instant on.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LeapEntry {
    /// Start UTC instant for this offset
    pub effective: Epoch,
    /// UTC-GPST (s), negative since GPST runs ahead of UTC
    pub utc_minus_gpst: i32,
}

/// Leap seconds effective since the GPS epoch, newest first,
/// (year, month, day, UTC-GPST). Table cutoff: 2017-01-01.
const LEAP_HISTORY: [(i32, u8, u8, i32); 18] = [
    (2017, 1, 1, -18),
    (2015, 7, 1, -17),
    (2012, 7, 1, -16),
    (2009, 1, 1, -15),
    (2006, 1, 1, -14),
    (1999, 1, 1, -13),
    (1997, 7, 1, -12),
    (1996, 1, 1, -11),
    (1994, 7, 1, -10),
    (1993, 7, 1, -9),
    (1992, 7, 1, -8),
    (1991, 1, 1, -7),
    (1990, 1, 1, -6),
    (1988, 1, 1, -5),
    (1985, 7, 1, -4),
    (1983, 7, 1, -3),
    (1982, 7, 1, -2),
    (1981, 7, 1, -1),
];

const MONTHS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

lazy_static! {
    static ref BUILTIN: LeapTable = LeapTable {
        entries: LEAP_HISTORY
            .iter()
            .map(|&(y, m, d, dt)| LeapEntry {
                // the compiled-in history only holds valid dates
                effective: Epoch::from_calendar(y, m, d, 0, 0, 0.0).unwrap_or_default(),
                utc_minus_gpst: dt,
            })
            .collect(),
    };
}

/// An immutable snapshot of the leap second history, ordered newest
/// first. The default table covers the known leap seconds through the
/// compiled-in cutoff; reloading from a file builds a **new** snapshot,
/// it never mutates a shared one.
/// ```
/// use gnss_core::prelude::*;
///
/// let leaps = LeapTable::default();
/// let t = Epoch::from_time_of_week(2190, 0.0, TimeScale::GPST);
/// let utc = leaps.gpst_to_utc(t);
/// assert_eq!(t - utc, 18.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct LeapTable {
    entries: Vec<LeapEntry>,
}

impl Default for LeapTable {
    fn default() -> Self {
        BUILTIN.clone()
    }
}

impl LeapTable {
    /// Loaded entries, newest first.
    pub fn entries(&self) -> &[LeapEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Converts GPS time to UTC. Scans from the most recent entry and
    /// applies the first offset whose effective date the shifted
    /// instant has reached; an instant older than the whole table
    /// passes through unchanged.
    pub fn gpst_to_utc(&self, t: Epoch) -> Epoch {
        for entry in self.entries.iter() {
            let tu = t + f64::from(entry.utc_minus_gpst);
            if tu - entry.effective >= 0.0 {
                return tu;
            }
        }
        t
    }

    /// Converts UTC to GPS time, the symmetric scan of
    /// [`LeapTable::gpst_to_utc`].
    pub fn utc_to_gpst(&self, t: Epoch) -> Epoch {
        for entry in self.entries.iter() {
            if t - entry.effective >= 0.0 {
                return t + f64::from(-entry.utc_minus_gpst);
            }
        }
        t
    }

    /// Disambiguates a 10-bit-rollover-truncated GPS week number
    /// against the current wall-clock GPS week, with a floor at week
    /// 1560 protecting against a badly set system clock.
    pub fn adjust_gps_week(&self, week: i32) -> i32 {
        let (mut now_week, _) = self.utc_to_gpst(Epoch::now()).to_time_of_week(TimeScale::GPST);
        if now_week < 1560 {
            now_week = 1560;
        }
        week + (now_week - week + 512) / 1024 * 1024
    }

    /// Loads a leap second table file, replacing nothing: the result is
    /// a fresh snapshot. Two formats are recognized: plain text records
    /// `year month day hour min sec UTC-GPST` (`#` starts a comment),
    /// and the USNO `leapsec.dat` format with `TAI-UTC=` fields.
    /// Descending date order is enforced here, not required of the file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let content = read_to_string(&path)?;
        let mut entries = Self::parse_text(&content);
        if entries.is_empty() {
            entries = Self::parse_usno(&content);
        }
        if entries.is_empty() {
            return Err(Error::NoEntries);
        }
        entries.sort_by(|a, b| {
            b.effective
                .partial_cmp(&a.effective)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        debug!(
            "loaded {} leap second entries from {}",
            entries.len(),
            path.as_ref().display()
        );
        Ok(Self { entries })
    }

    /// `year month day hour min sec UTC-GPST` records.
    fn parse_text(content: &str) -> Vec<LeapEntry> {
        let mut entries = Vec::new();
        for line in content.lines() {
            let line = line.split('#').next().unwrap_or("");
            let fields: Vec<i32> = line
                .split_whitespace()
                .map_while(|v| v.parse::<i32>().ok())
                .collect();
            if fields.len() < 7 {
                continue;
            }
            if let Ok(effective) = Epoch::from_calendar(
                fields[0],
                fields[1] as u8,
                fields[2] as u8,
                fields[3] as u8,
                fields[4] as u8,
                f64::from(fields[5]),
            ) {
                entries.push(LeapEntry {
                    effective,
                    utc_minus_gpst: fields[6],
                });
            }
        }
        entries
    }

    /// USNO style records: `1981 JUL  1 =JD 2444786.5  TAI-UTC= 20.0 ...`,
    /// converted with `UTC-GPST = 19 - (TAI-UTC)`. Entries before the
    /// GPS era carry no GPST offset and are skipped.
    fn parse_usno(content: &str) -> Vec<LeapEntry> {
        let mut entries = Vec::new();
        for line in content.lines() {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 7 || fields[3] != "=JD" || fields[5] != "TAI-UTC=" {
                continue;
            }
            let (year, day, tai_utc) = match (
                fields[0].parse::<i32>(),
                fields[2].parse::<u8>(),
                fields[6].parse::<f64>(),
            ) {
                (Ok(y), Ok(d), Ok(v)) => (y, d, v),
                _ => continue,
            };
            if year < 1980 {
                continue;
            }
            let month = match MONTHS.iter().position(|&m| m == fields[1]) {
                Some(index) => index as u8 + 1,
                None => continue,
            };
            if let Ok(effective) = Epoch::from_calendar(year, month, day, 0, 0, 0.0) {
                entries.push(LeapEntry {
                    effective,
                    utc_minus_gpst: (19.0 - tai_utc) as i32,
                });
            }
        }
        entries
    }
}
