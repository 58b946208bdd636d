//! GNSS time scales and week number conversions.
use crate::constants::SECONDS_PER_WEEK;
use crate::epoch::Epoch;
use log::warn;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Time scale identification related errors
#[derive(Error, Clone, Debug, PartialEq)]
pub enum ParsingError {
    #[error("unknown time scale \"{0}\"")]
    Unknown(String),
}

/// GPS time reference epoch, 1980-01-06T00:00:00 UTC.
const GPST_REFERENCE: Epoch = Epoch::from_unix_seconds(315_964_800);

/// Galileo system time reference epoch, 1999-08-22T00:00:00 UTC.
const GST_REFERENCE: Epoch = Epoch::from_unix_seconds(935_280_000);

/// BeiDou time reference epoch, 2006-01-01T00:00:00 UTC.
const BDT_REFERENCE: Epoch = Epoch::from_unix_seconds(1_136_073_600);

/// Time scales a GNSS measurement or product may be expressed in.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TimeScale {
    /// GPS time, steered to UTC(USNO) modulo leap seconds
    #[default]
    GPST,
    /// Galileo system time
    GST,
    /// BeiDou time, no leap seconds, 14 s behind GPST
    BDT,
    /// Coordinated universal time
    UTC,
}

impl TimeScale {
    /// Reference (week zero) epoch of this time scale.
    /// UTC carries no week numbering of its own and shares the GPS
    /// week origin.
    pub fn reference_epoch(&self) -> Epoch {
        match self {
            Self::GPST | Self::UTC => GPST_REFERENCE,
            Self::GST => GST_REFERENCE,
            Self::BDT => BDT_REFERENCE,
        }
    }
}

impl std::fmt::Display for TimeScale {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::GPST => write!(f, "GPST"),
            Self::GST => write!(f, "GST"),
            Self::BDT => write!(f, "BDT"),
            Self::UTC => write!(f, "UTC"),
        }
    }
}

impl std::str::FromStr for TimeScale {
    type Err = ParsingError;
    fn from_str(string: &str) -> Result<Self, Self::Err> {
        match string.trim().to_uppercase().as_str() {
            "GPST" | "GPS" => Ok(Self::GPST),
            "GST" | "GAL" => Ok(Self::GST),
            "BDT" | "BDS" => Ok(Self::BDT),
            "UTC" => Ok(Self::UTC),
            _ => Err(ParsingError::Unknown(string.to_string())),
        }
    }
}

impl Epoch {
    /// Builds an epoch from a week number and time of week in the
    /// given scale. A time of week outside ±1e9 s is defensively
    /// clamped to zero, with a warning so the clamp stays visible.
    /// ```
    /// use gnss_core::prelude::*;
    ///
    /// let t = Epoch::from_time_of_week(2191, 0.0, TimeScale::GPST);
    /// assert_eq!(t.to_calendar(), (2022, 1, 2, 0, 0, 0.0));
    /// ```
    pub fn from_time_of_week(week: i32, tow: f64, scale: TimeScale) -> Self {
        let tow = if !(-1E9..=1E9).contains(&tow) {
            warn!("time of week {:e} outside sanity bounds, clamped to 0", tow);
            0.0
        } else {
            tow
        };
        let t0 = scale.reference_epoch();
        Epoch::from_unix_seconds(t0.as_unix_seconds() + SECONDS_PER_WEEK * i64::from(week)) + tow
    }

    /// Splits the epoch into `(week, time_of_week)` in the given scale,
    /// `week = floor(seconds_since_reference / 604800)`.
    pub fn to_time_of_week(&self, scale: TimeScale) -> (i32, f64) {
        let sec = self.as_unix_seconds() - scale.reference_epoch().as_unix_seconds();
        let week = sec / SECONDS_PER_WEEK;
        (
            week as i32,
            (sec - week * SECONDS_PER_WEEK) as f64 + self.fraction(),
        )
    }
}

/// GPST to BeiDou time. BDT runs without leap seconds, offset from
/// GPST frozen at 14 s since the BDT system epoch.
pub fn gpst_to_bdt(t: Epoch) -> Epoch {
    t + (-14.0)
}

/// BeiDou time to GPST, see [`gpst_to_bdt`].
pub fn bdt_to_gpst(t: Epoch) -> Epoch {
    t + 14.0
}
