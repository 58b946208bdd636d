//! `Epoch`: normalized instant and calendar arithmetic.
use crate::constants::{JD_TO_MJD, SECONDS_PER_DAY};
use std::ops::{Add, Sub};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Calendar conversion and parsing related errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("calendar date outside the 1970-2099 supported range")]
    InvalidDate,
    #[error("invalid epoch description \"{0}\"")]
    EpochFormat(String),
    #[error("failed to parse epoch field")]
    FieldParsing(#[from] std::num::ParseFloatError),
}

/// An `Epoch` is an instant, split into whole seconds since
/// 1970-01-01T00:00:00 and a sub-second fraction kept in `[0,1)`.
/// Keeping the integer part exact means repeated sub-second arithmetic
/// never erodes the seconds count; only the fraction carries floating
/// point rounding, bounded by one renormalization per operation.
///
/// Epochs are immutable values: arithmetic produces new epochs.
/// ```
/// use gnss_core::prelude::*;
///
/// let t = Epoch::from_calendar(2022, 1, 2, 0, 0, 0.0).unwrap();
/// let later = t + 1.5;
/// assert_eq!(later - t, 1.5);
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Epoch {
    seconds: i64,
    fraction: f64,
}

/// Start of day-of-year per month, non leap year.
const DOY: [i64; 12] = [1, 32, 60, 91, 121, 152, 182, 213, 244, 274, 305, 335];

/// Days per month over one 4-year cycle starting 1970.
const MDAY: [i64; 48] = [
    31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31, //
    31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31, //
    31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31, //
    31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31,
];

impl Epoch {
    /// The zero (invalid/unset) epoch, 1970-01-01T00:00:00.
    pub const ZERO: Epoch = Epoch {
        seconds: 0,
        fraction: 0.0,
    };

    /// Builds an epoch from whole seconds and a fraction,
    /// renormalizing so the stored fraction lies in `[0,1)`.
    pub fn new(seconds: i64, fraction: f64) -> Self {
        let carry = fraction.floor();
        Self {
            seconds: seconds + carry as i64,
            fraction: fraction - carry,
        }
    }

    /// Builds an epoch from whole seconds since 1970-01-01.
    pub const fn from_unix_seconds(seconds: i64) -> Self {
        Self {
            seconds,
            fraction: 0.0,
        }
    }

    /// Whole seconds since 1970-01-01.
    pub const fn as_unix_seconds(&self) -> i64 {
        self.seconds
    }

    /// Sub-second fraction, in `[0,1)`.
    pub const fn fraction(&self) -> f64 {
        self.fraction
    }

    /// True for the zero epoch, the conventional "unset" sentinel.
    pub fn is_zero(&self) -> bool {
        self.seconds == 0 && self.fraction == 0.0
    }

    /// Current UTC time from the system clock.
    pub fn now() -> Self {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(d) => Epoch::new(d.as_secs() as i64, f64::from(d.subsec_nanos()) * 1e-9),
            Err(_) => Epoch::ZERO,
        }
    }

    /// Builds an epoch from a calendar date and time of day.
    /// Valid for years 1970 through 2099 (`year % 4 == 0` leap rule).
    /// ```
    /// use gnss_core::prelude::*;
    ///
    /// let t = Epoch::from_calendar(1980, 1, 6, 0, 0, 0.0).unwrap();
    /// assert_eq!(t.as_unix_seconds(), 315_964_800);
    /// assert!(Epoch::from_calendar(1969, 12, 31, 0, 0, 0.0).is_err());
    /// ```
    pub fn from_calendar(
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: f64,
    ) -> Result<Self, Error> {
        if !(1970..=2099).contains(&year) || !(1..=12).contains(&month) {
            return Err(Error::InvalidDate);
        }
        let (year, month, day) = (i64::from(year), usize::from(month), i64::from(day));
        let leap_day = if year % 4 == 0 && month >= 3 { 1 } else { 0 };
        let days = (year - 1970) * 365 + (year - 1969) / 4 + DOY[month - 1] + day - 2 + leap_day;
        let sec = second.floor();
        Ok(Self {
            seconds: days * SECONDS_PER_DAY
                + i64::from(hour) * 3600
                + i64::from(minute) * 60
                + sec as i64,
            fraction: second - sec,
        })
    }

    /// Splits the epoch back into `(year, month, day, hour, minute, second)`,
    /// the exact inverse of [`Epoch::from_calendar`] over its valid range.
    pub fn to_calendar(&self) -> (i32, u8, u8, u8, u8, f64) {
        let days = self.seconds.div_euclid(SECONDS_PER_DAY);
        let sec = self.seconds.rem_euclid(SECONDS_PER_DAY);
        let mut day = days.rem_euclid(1461);
        let mut mon = 0;
        while mon < 48 {
            if day >= MDAY[mon] {
                day -= MDAY[mon];
                mon += 1;
            } else {
                break;
            }
        }
        (
            (1970 + days.div_euclid(1461) * 4 + mon as i64 / 12) as i32,
            (mon % 12 + 1) as u8,
            (day + 1) as u8,
            (sec / 3600) as u8,
            (sec % 3600 / 60) as u8,
            (sec % 60) as f64 + self.fraction,
        )
    }

    /// Day of year, starting at 1.0.
    pub fn day_of_year(&self) -> f64 {
        let (year, ..) = self.to_calendar();
        // year comes from a valid epoch, conversion cannot fail
        let soy = Epoch::from_calendar(year, 1, 1, 0, 0, 0.0).unwrap_or_default();
        (*self - soy) / SECONDS_PER_DAY as f64 + 1.0
    }

    /// Modified Julian Day, closed form calendar to JD conversion
    /// with `mjd = jd - 2400000.5`.
    /// ```
    /// use gnss_core::prelude::*;
    ///
    /// let j2000 = Epoch::from_calendar(2000, 1, 1, 12, 0, 0.0).unwrap();
    /// assert_eq!(j2000.to_mjd(), 51544.5);
    /// ```
    pub fn to_mjd(&self) -> f64 {
        let (year, month, day, hour, minute, second) = self.to_calendar();
        let (mut year, mut month) = (i64::from(year), i64::from(month));
        if month <= 2 {
            year -= 1;
            month += 12;
        }
        let hours = f64::from(hour) + f64::from(minute) / 60.0 + second / 3600.0;
        let jd = (365.25 * year as f64) as i64 as f64
            + (30.6001 * (month + 1) as f64) as i64 as f64
            + f64::from(day)
            + hours / 24.0
            + 1720981.5;
        jd - JD_TO_MJD
    }

    /// Inverse of [`Epoch::to_mjd`]. Fails when the day falls outside
    /// the supported calendar range.
    pub fn from_mjd(mjd: f64) -> Result<Self, Error> {
        let a = (mjd + 1.0 + 1e-9).floor() as i64 + 2_400_000;
        let frac = mjd + 2_400_001.0 - a as f64;
        let b = a + 1537;
        let c = ((b as f64 - 122.1) / 365.25 + 1e-9).floor() as i64;
        let d = (365.25 * c as f64 + 1e-9).floor() as i64;
        let e = ((b - d) as f64 / 30.6001 + 1e-9).floor() as i64;
        let day = b - d - (30.6001 * e as f64).floor() as i64;
        let month = e - 1 - 12 * (e as f64 / 14.0 + 1e-9).floor() as i64;
        let year = c - 4715 - ((7 + month) as f64 / 10.0 + 1e-9).floor() as i64;
        let hours = frac * 24.0;
        let hour = (hours + 1e-9).floor();
        let minutes = (hours - hour) * 60.0;
        let minute = (minutes + 1e-9).floor();
        Epoch::from_calendar(
            year as i32,
            month as u8,
            day as u8,
            hour as u8,
            minute as u8,
            (minutes - minute) * 60.0,
        )
    }

    /// Seconds elapsed since the start of the day, and the day itself.
    pub(crate) fn split_day(&self) -> (f64, Epoch) {
        let sec = self.seconds.rem_euclid(SECONDS_PER_DAY);
        (
            sec as f64 + self.fraction,
            Epoch::from_unix_seconds(self.seconds - sec),
        )
    }
}

impl Add<f64> for Epoch {
    type Output = Epoch;
    /// Adds seconds, carrying fractional overflow into the whole
    /// seconds so the fraction stays in `[0,1)`.
    fn add(self, seconds: f64) -> Epoch {
        Epoch::new(self.seconds, self.fraction + seconds)
    }
}

impl Sub for Epoch {
    type Output = f64;
    /// Signed difference in seconds.
    fn sub(self, rhs: Epoch) -> f64 {
        (self.seconds - rhs.seconds) as f64 + (self.fraction - rhs.fraction)
    }
}

impl std::str::FromStr for Epoch {
    type Err = Error;
    /// Parses a free-form calendar description: six numeric fields
    /// `"yyyy mm dd hh mm ss"`, with `/` and `:` accepted as separators.
    /// Two-digit years resolve to 1980-2079 (pivot at 80).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.replace(['/', ':'], " ");
        let fields = normalized
            .split_whitespace()
            .take(6)
            .map(str::parse::<f64>)
            .collect::<Result<Vec<f64>, _>>()?;
        if fields.len() < 6 {
            return Err(Error::EpochFormat(s.to_string()));
        }
        let mut year = fields[0];
        if year < 100.0 {
            year += if year < 80.0 { 2000.0 } else { 1900.0 };
        }
        Epoch::from_calendar(
            year as i32,
            fields[1] as u8,
            fields[2] as u8,
            fields[3] as u8,
            fields[4] as u8,
            fields[5],
        )
    }
}

impl std::fmt::Display for Epoch {
    /// Prints as `"yyyy/mm/dd hh:mm:ss.sss"`.
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut t = *self;
        // round the fraction up front so 59.9996 carries into the next minute
        if 1.0 - t.fraction < 0.5e-3 {
            t.seconds += 1;
            t.fraction = 0.0;
        }
        let (year, month, day, hour, minute, second) = t.to_calendar();
        write!(
            f,
            "{:04}/{:02}/{:02} {:02}:{:02}:{:06.3}",
            year, month, day, hour, minute, second
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn calendar_roundtrip() {
        for (year, month, day, hour, minute, second) in [
            (1970, 1, 1, 0, 0, 0.0),
            (1980, 1, 6, 0, 0, 0.0),
            (1999, 8, 22, 0, 0, 0.0),
            (2000, 2, 29, 12, 30, 30.5),
            (2006, 1, 1, 0, 0, 0.0),
            (2022, 1, 2, 23, 59, 41.0),
            (2096, 2, 29, 23, 59, 59.875),
            (2099, 12, 31, 23, 59, 59.0),
        ] {
            let t = Epoch::from_calendar(year, month, day, hour, minute, second).unwrap();
            assert_eq!(
                t.to_calendar(),
                (year, month, day, hour, minute, second),
                "roundtrip failed for {}-{}-{}",
                year,
                month,
                day
            );
        }
    }

    #[test]
    fn calendar_sweep() {
        // every month boundary across one full leap cycle
        for year in 2019..=2023 {
            for month in 1..=12 {
                for day in [1, 28] {
                    let t = Epoch::from_calendar(year, month, day, 6, 7, 8.25).unwrap();
                    assert_eq!(t.to_calendar(), (year, month, day, 6, 7, 8.25));
                }
            }
        }
    }

    #[test]
    fn out_of_range_calendar() {
        assert_eq!(
            Epoch::from_calendar(1969, 12, 31, 0, 0, 0.0),
            Err(Error::InvalidDate)
        );
        assert_eq!(
            Epoch::from_calendar(2100, 1, 1, 0, 0, 0.0),
            Err(Error::InvalidDate)
        );
        assert_eq!(
            Epoch::from_calendar(2000, 13, 1, 0, 0, 0.0),
            Err(Error::InvalidDate)
        );
    }

    #[test]
    fn addition() {
        let t = Epoch::from_calendar(2020, 6, 1, 0, 0, 0.0).unwrap();
        assert_eq!((t + 1.75) - t, 1.75);
        assert_eq!((t + (-0.25)).fraction(), 0.75);
        // associativity: one large step equals many small ones
        let (s1, s2) = (0.1, 86399.95);
        let once = t + (s1 + s2);
        let twice = t + s1 + s2;
        assert!((once - twice).abs() < 1e-9);
    }

    #[test]
    fn fraction_stays_normalized() {
        let mut t = Epoch::from_calendar(2020, 6, 1, 0, 0, 0.0).unwrap();
        for _ in 0..10_000 {
            t = t + 0.3;
            assert!((0.0..1.0).contains(&t.fraction()));
        }
        let reference = Epoch::from_calendar(2020, 6, 1, 0, 50, 0.0).unwrap();
        assert!((t - reference).abs() < 1e-7);
    }

    #[test]
    fn difference_sign() {
        let a = Epoch::from_calendar(2020, 6, 1, 0, 0, 0.5).unwrap();
        let b = Epoch::from_calendar(2020, 6, 1, 0, 0, 1.25).unwrap();
        assert_eq!(b - a, 0.75);
        assert_eq!(a - b, -0.75);
        assert!(a < b);
    }

    #[test]
    fn from_str_forms() {
        let expected = Epoch::from_calendar(2021, 1, 2, 3, 4, 5.0).unwrap();
        for desc in [
            "2021 01 02 03 04 05",
            "2021/01/02 03:04:05",
            "21 1 2 3 4 5",
        ] {
            assert_eq!(
                Epoch::from_str(desc).unwrap(),
                expected,
                "failed to parse \"{}\"",
                desc
            );
        }
        // two-digit pivot: 80 resolves into the 20th century
        let t = Epoch::from_str("80 1 6 0 0 0").unwrap();
        assert_eq!(t.to_calendar().0, 1980);
        assert!(Epoch::from_str("2021 01 02").is_err());
        assert!(Epoch::from_str("not a date").is_err());
    }

    #[test]
    fn display() {
        let t = Epoch::from_calendar(2022, 1, 1, 23, 59, 41.0).unwrap();
        assert_eq!(t.to_string(), "2022/01/01 23:59:41.000");
        // sub-millisecond residue rounds up and carries
        let t = Epoch::from_calendar(2022, 1, 1, 23, 59, 59.9999).unwrap();
        assert_eq!(t.to_string(), "2022/01/02 00:00:00.000");
    }

    #[test]
    fn mjd_literals() {
        let j2000 = Epoch::from_calendar(2000, 1, 1, 12, 0, 0.0).unwrap();
        assert_eq!(j2000.to_mjd(), 51544.5);
        let gps0 = Epoch::from_calendar(1980, 1, 6, 0, 0, 0.0).unwrap();
        assert_eq!(gps0.to_mjd(), 44244.0);
    }

    #[test]
    fn mjd_roundtrip() {
        for mjd in [44244.0, 51544.5, 59580.25, 60000.75] {
            let t = Epoch::from_mjd(mjd).unwrap();
            assert!((t.to_mjd() - mjd).abs() < 1e-9, "mjd {} roundtrip", mjd);
        }
    }

    #[test]
    fn day_of_year() {
        let t = Epoch::from_calendar(2021, 1, 1, 0, 0, 0.0).unwrap();
        assert_eq!(t.day_of_year(), 1.0);
        let t = Epoch::from_calendar(2021, 2, 1, 12, 0, 0.0).unwrap();
        assert_eq!(t.day_of_year(), 32.5);
    }

    #[test]
    fn now_is_past_2020() {
        let t = Epoch::now();
        assert!(t > Epoch::from_calendar(2020, 1, 1, 0, 0, 0.0).unwrap());
    }
}
