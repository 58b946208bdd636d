//! Timing and angular constants shared across the crate.

/// Seconds in a calendar day.
pub const SECONDS_PER_DAY: i64 = 86400;

/// Seconds in a GNSS week.
pub const SECONDS_PER_WEEK: i64 = 604800;

/// Tolerance when comparing observation timestamps (s).
pub const DTTOL: f64 = 0.025;

/// Arc seconds to radians.
pub(crate) const AS2R: f64 = std::f64::consts::PI / 648_000.0;

/// Offset between Julian Day and Modified Julian Day.
pub(crate) const JD_TO_MJD: f64 = 2_400_000.5;

/// MJD of the J2000.0 reference epoch (2000-01-01 12:00).
pub(crate) const MJD_J2000: f64 = 51_544.5;

/// J2000.0 reference epoch, seconds since 1970-01-01.
pub(crate) const J2000_UNIX: i64 = 946_728_000;

/// TAI-GPST offset (s).
pub(crate) const TAI_GPST: f64 = 19.0;

/// TT-TAI offset (s).
pub(crate) const TT_TAI: f64 = 32.184;
