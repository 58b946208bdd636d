//! Inertial to Earth-fixed frame transformation: IAU 1976 precession,
//! IAU 1980 nutation, sidereal rotation and polar motion.
use crate::constants::{AS2R, J2000_UNIX, TAI_GPST, TT_TAI};
use crate::epoch::Epoch;
use crate::erp::ErpValues;
use crate::leap::LeapTable;
use log::{debug, trace};
use nalgebra::Matrix3;
use std::f64::consts::PI;

mod nutation;
use nutation::NUT_TERMS;

/// Seconds of Terrestrial Time ahead of GPS time.
const TT_GPST: f64 = TAI_GPST + TT_TAI;

/// Polynomial coefficients of the five fundamental astronomical
/// arguments l, l', F, D, Ω (degrees, then arcsec per power of t).
const FUNDAMENTAL_COEFFS: [[f64; 5]; 5] = [
    [134.96340251, 1717915923.2178, 31.8792, 0.051635, -0.00024470],
    [357.52910918, 129596581.0481, -0.5532, 0.000136, -0.00001149],
    [93.27209062, 1739527262.8478, -12.7512, -0.001037, 0.00000417],
    [297.85019547, 1602961601.2090, -6.3706, 0.006593, -0.00003169],
    [125.04455501, -6962890.2665, 7.4722, 0.007702, -0.00005939],
];

/// Coordinate rotation about the x axis.
pub(crate) fn rot_x(t: f64) -> Matrix3<f64> {
    let (sin, cos) = t.sin_cos();
    Matrix3::new(
        1.0, 0.0, 0.0, //
        0.0, cos, sin, //
        0.0, -sin, cos,
    )
}

/// Coordinate rotation about the y axis.
pub(crate) fn rot_y(t: f64) -> Matrix3<f64> {
    let (sin, cos) = t.sin_cos();
    Matrix3::new(
        cos, 0.0, -sin, //
        0.0, 1.0, 0.0, //
        sin, 0.0, cos,
    )
}

/// Coordinate rotation about the z axis.
pub(crate) fn rot_z(t: f64) -> Matrix3<f64> {
    let (sin, cos) = t.sin_cos();
    Matrix3::new(
        cos, sin, 0.0, //
        -sin, cos, 0.0, //
        0.0, 0.0, 1.0,
    )
}

/// Fundamental astronomical arguments {l, l', F, D, Ω} (rad) at `t`
/// Julian centuries of TT since J2000.0, each reduced mod 2π.
fn fundamental_arguments(t: f64) -> [f64; 5] {
    let mut tt = [t, 0.0, 0.0, 0.0];
    for i in 1..4 {
        tt[i] = tt[i - 1] * t;
    }
    let mut f = [0.0; 5];
    for i in 0..5 {
        f[i] = FUNDAMENTAL_COEFFS[i][0] * 3600.0;
        for j in 0..4 {
            f[i] += FUNDAMENTAL_COEFFS[i][j + 1] * tt[j];
        }
        f[i] = (f[i] * AS2R) % (2.0 * PI);
    }
    f
}

/// IAU 1980 nutation in longitude and obliquity (rad). Sums the full
/// 106 term series with secular rate corrected amplitudes.
fn nutation_iau1980(t: f64, f: &[f64; 5]) -> (f64, f64) {
    let mut dpsi = 0.0;
    let mut deps = 0.0;
    for term in NUT_TERMS.iter() {
        let mut angle = 0.0;
        for j in 0..5 {
            angle += term[j] * f[j];
        }
        dpsi += (term[6] + term[7] * t) * angle.sin();
        deps += (term[8] + term[9] * t) * angle.cos();
    }
    // 0.1 mas -> rad
    (dpsi * 1E-4 * AS2R, deps * 1E-4 * AS2R)
}

/// Greenwich mean sidereal time (rad) at `t` expressed in UTC, given
/// UT1-UTC (s).
pub fn gmst(t: Epoch, ut1_utc: f64) -> f64 {
    let tut = t + ut1_utc;
    let (ut, tut0) = tut.split_day();
    let t1 = (tut0 - Epoch::from_unix_seconds(J2000_UNIX)) / 86400.0 / 36525.0;
    let t2 = t1 * t1;
    let t3 = t2 * t1;
    let gmst0 = 24110.54841 + 8640184.812866 * t1 + 0.093104 * t2 - 6.2E-6 * t3;
    let gmst = gmst0 + 1.002737909350795 * ut;
    (gmst % 86400.0) * PI / 43200.0
}

struct CachedRotation {
    tutc: Epoch,
    matrix: Matrix3<f64>,
    gmst: f64,
}

/// Builds the instantaneous inertial to Earth-fixed rotation. Owns its
/// leap second snapshot and a single slot result cache, so concurrent
/// pipelines each carry their own `FrameTransform` and never race on
/// shared state.
/// ```
/// use gnss_core::prelude::*;
///
/// let mut frames = FrameTransform::default();
/// let t = Epoch::from_calendar(2022, 1, 1, 23, 59, 41.0).unwrap();
/// let (rotation, gmst) = frames.eci_to_ecef(t, &ErpValues::default());
/// let identity = rotation * rotation.transpose();
/// assert!((identity - nalgebra::Matrix3::identity()).norm() < 1e-9);
/// assert!((0.0..2.0 * std::f64::consts::PI).contains(&gmst.abs()));
/// ```
pub struct FrameTransform {
    leaps: LeapTable,
    cache: Option<CachedRotation>,
}

impl Default for FrameTransform {
    fn default() -> Self {
        Self::new(LeapTable::default())
    }
}

impl FrameTransform {
    /// Window within which a cached rotation is replayed (s).
    const CACHE_TOLERANCE: f64 = 0.01;

    /// Builds a frame transform around a leap second snapshot.
    pub fn new(leaps: LeapTable) -> Self {
        Self { leaps, cache: None }
    }

    /// The leap second snapshot in use.
    pub fn leap_table(&self) -> &LeapTable {
        &self.leaps
    }

    /// Computes the inertial to Earth-fixed rotation and Greenwich
    /// mean sidereal time (rad) at `tutc`, using interpolated earth
    /// rotation parameters. A query within 0.01 s of the previous one
    /// replays the cached result bit for bit.
    ///
    /// Rotation order, innermost first: precession, nutation, sidereal
    /// rotation, polar motion.
    pub fn eci_to_ecef(&mut self, tutc: Epoch, erp: &ErpValues) -> (Matrix3<f64>, f64) {
        if let Some(cached) = &self.cache {
            if (tutc - cached.tutc).abs() < Self::CACHE_TOLERANCE {
                return (cached.matrix, cached.gmst);
            }
        }
        debug!("eci2ecef: tutc={}", tutc);

        // terrestrial time, julian centuries since J2000.0
        let tgps = self.leaps.utc_to_gpst(tutc);
        let t = ((tgps - Epoch::from_unix_seconds(J2000_UNIX)) + TT_GPST) / 86400.0 / 36525.0;
        let t2 = t * t;
        let t3 = t2 * t;

        let f = fundamental_arguments(t);

        // iau 1976 precession
        let ze = (2306.2181 * t + 0.30188 * t2 + 0.017998 * t3) * AS2R;
        let th = (2004.3109 * t - 0.42665 * t2 - 0.041833 * t3) * AS2R;
        let z = (2306.2181 * t + 1.09468 * t2 + 0.018203 * t3) * AS2R;
        let eps = (84381.448 - 46.8150 * t - 0.00059 * t2 + 0.001813 * t3) * AS2R;
        let p = rot_z(-z) * rot_y(th) * rot_z(-ze);

        // iau 1980 nutation
        let (dpsi, deps) = nutation_iau1980(t, &f);
        let n = rot_x(-eps - deps) * rot_z(-dpsi) * rot_x(eps);

        // greenwich apparent sidereal time (rad)
        let gmst = gmst(tutc, erp.ut1_utc);
        let gast = gmst
            + dpsi * eps.cos()
            + (0.00264 * f[4].sin() + 0.000063 * (2.0 * f[4]).sin()) * AS2R;

        // polar motion and sidereal rotation close the chain
        let matrix = rot_y(-erp.xp) * rot_x(-erp.yp) * rot_z(gast) * n * p;
        trace!("gmst={:.12} gast={:.12}", gmst, gast);

        self.cache = Some(CachedRotation { tutc, matrix, gmst });
        (matrix, gmst)
    }
}
