//! Earth rotation parameter table, interpolation and IGS ERP loading.
use crate::constants::{AS2R, J2000_UNIX, MJD_J2000, SECONDS_PER_DAY};
use crate::epoch::Epoch;
use crate::hygiene::{push_grow, AllocPolicy};
use crate::leap::LeapTable;
use log::debug;
use std::fs::read_to_string;
use std::path::Path;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// ERP table loading related errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to read erp file")]
    IoError(#[from] std::io::Error),
    #[error("collection error")]
    Collection(#[from] crate::hygiene::Error),
}

/// One earth rotation parameter sample.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ErpEntry {
    /// Sample epoch as Modified Julian Day
    pub mjd: f64,
    /// Pole offset (rad)
    pub xp: f64,
    /// Pole offset (rad)
    pub yp: f64,
    /// UT1-UTC (s)
    pub ut1_utc: f64,
    /// Length of day excess (s/day)
    pub lod: f64,
    /// Pole drift rate (rad/day)
    pub xpr: f64,
    /// Pole drift rate (rad/day)
    pub ypr: f64,
}

/// Earth rotation parameter values interpolated at some instant,
/// the `erp` input of [`crate::frame::FrameTransform::eci_to_ecef`].
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ErpValues {
    /// Pole offset (rad)
    pub xp: f64,
    /// Pole offset (rad)
    pub yp: f64,
    /// UT1-UTC (s)
    pub ut1_utc: f64,
    /// Length of day excess (s/day)
    pub lod: f64,
}

/// Earth rotation parameter samples, strictly ascending by MJD.
/// Created empty or bulk loaded from an IGS ERP file, then queried
/// read-only.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ErpTable {
    entries: Vec<ErpEntry>,
}

impl ErpTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loaded samples, ascending by MJD.
    pub fn entries(&self) -> &[ErpEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Loads an IGS ERP style file: whitespace separated numeric
    /// columns, at least 5 per data line (MJD, pole offsets in 1e-6
    /// arcsec, UT1-UTC and LOD in 1e-7 s, pole rates in columns 13-14).
    /// Other lines are skipped. Ascending MJD order is enforced here.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let content = read_to_string(&path)?;
        let mut entries = Vec::new();
        for line in content.lines() {
            let v: Vec<f64> = line
                .split_whitespace()
                .map_while(|field| field.parse::<f64>().ok())
                .collect();
            if v.len() < 5 {
                continue;
            }
            push_grow(
                &mut entries,
                ErpEntry {
                    mjd: v[0],
                    xp: v[1] * 1E-6 * AS2R,
                    yp: v[2] * 1E-6 * AS2R,
                    ut1_utc: v[3] * 1E-7,
                    lod: v[4] * 1E-7,
                    xpr: v.get(12).copied().unwrap_or(0.0) * 1E-6 * AS2R,
                    ypr: v.get(13).copied().unwrap_or(0.0) * 1E-6 * AS2R,
                },
                AllocPolicy::Propagate,
            )?;
        }
        entries.sort_by(|a, b| a.mjd.total_cmp(&b.mjd));
        debug!(
            "loaded {} erp samples from {}",
            entries.len(),
            path.as_ref().display()
        );
        Ok(Self { entries })
    }

    /// Interpolates the table at `time` (expressed in GPST). Queries
    /// outside the table extrapolate linearly from the boundary sample
    /// using its rate fields (UT1-UTC drifts by `-lod`); interior
    /// queries locate the bracketing pair by binary search and weight
    /// all four fields by fractional day. None only when the table is
    /// empty.
    pub fn interpolate(&self, time: Epoch, leaps: &LeapTable) -> Option<ErpValues> {
        let first = self.entries.first()?;
        let last = self.entries.last()?;
        let utc = leaps.gpst_to_utc(time);
        let mjd = MJD_J2000 + (utc - Epoch::from_unix_seconds(J2000_UNIX)) / SECONDS_PER_DAY as f64;

        if mjd <= first.mjd {
            return Some(Self::extrapolate(first, mjd - first.mjd));
        }
        if mjd >= last.mjd {
            return Some(Self::extrapolate(last, mjd - last.mjd));
        }
        let j = self.entries.partition_point(|e| e.mjd <= mjd);
        let (lhs, rhs) = (&self.entries[j - 1], &self.entries[j]);
        let a = if rhs.mjd == lhs.mjd {
            0.5
        } else {
            (mjd - lhs.mjd) / (rhs.mjd - lhs.mjd)
        };
        Some(ErpValues {
            xp: (1.0 - a) * lhs.xp + a * rhs.xp,
            yp: (1.0 - a) * lhs.yp + a * rhs.yp,
            ut1_utc: (1.0 - a) * lhs.ut1_utc + a * rhs.ut1_utc,
            lod: (1.0 - a) * lhs.lod + a * rhs.lod,
        })
    }

    fn extrapolate(sample: &ErpEntry, day: f64) -> ErpValues {
        ErpValues {
            xp: sample.xp + sample.xpr * day,
            yp: sample.yp + sample.ypr * day,
            ut1_utc: sample.ut1_utc - sample.lod * day,
            lod: sample.lod,
        }
    }
}

impl FromIterator<ErpEntry> for ErpTable {
    /// Collects samples, enforcing the ascending MJD invariant.
    fn from_iter<I: IntoIterator<Item = ErpEntry>>(iter: I) -> Self {
        let mut entries: Vec<ErpEntry> = iter.into_iter().collect();
        entries.sort_by(|a, b| a.mjd.total_cmp(&b.mjd));
        Self { entries }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::timescale::TimeScale;
    use std::io::Write;

    fn sample_table() -> ErpTable {
        [
            ErpEntry {
                mjd: 59580.5,
                xp: 1e-7,
                yp: 2e-7,
                ut1_utc: -0.1,
                lod: 1e-3,
                xpr: 1e-9,
                ypr: 2e-9,
            },
            ErpEntry {
                mjd: 59581.5,
                xp: 3e-7,
                yp: 4e-7,
                ut1_utc: -0.2,
                lod: 2e-3,
                xpr: 1e-9,
                ypr: 2e-9,
            },
        ]
        .into_iter()
        .collect()
    }

    // GPST instant whose UTC counterpart lands on the given mjd
    fn gpst_at_mjd(mjd: f64) -> Epoch {
        let utc = Epoch::from_mjd(mjd).unwrap();
        LeapTable::default().utc_to_gpst(utc)
    }

    #[test]
    fn empty_table() {
        let table = ErpTable::new();
        assert!(table
            .interpolate(Epoch::from_unix_seconds(0), &LeapTable::default())
            .is_none());
    }

    #[test]
    fn exact_sample_epoch() {
        let table = sample_table();
        let leaps = LeapTable::default();
        let v = table.interpolate(gpst_at_mjd(59580.5), &leaps).unwrap();
        assert!((v.xp - 1e-7).abs() < 1e-15);
        assert!((v.yp - 2e-7).abs() < 1e-15);
        assert!((v.ut1_utc + 0.1).abs() < 1e-9);
        assert!((v.lod - 1e-3).abs() < 1e-12);
    }

    #[test]
    fn midpoint_interpolation() {
        let table = sample_table();
        let leaps = LeapTable::default();
        let v = table.interpolate(gpst_at_mjd(59581.0), &leaps).unwrap();
        assert!((v.xp - 2e-7).abs() < 1e-15);
        assert!((v.ut1_utc + 0.15).abs() < 1e-9);
        // monotone between bracketing samples
        let earlier = table.interpolate(gpst_at_mjd(59580.75), &leaps).unwrap();
        let later = table.interpolate(gpst_at_mjd(59581.25), &leaps).unwrap();
        assert!(earlier.xp < v.xp && v.xp < later.xp);
        assert!(earlier.ut1_utc > v.ut1_utc && v.ut1_utc > later.ut1_utc);
    }

    #[test]
    fn boundary_extrapolation() {
        let table = sample_table();
        let leaps = LeapTable::default();
        // one day before the first sample: rates pull the values back
        let v = table.interpolate(gpst_at_mjd(59579.5), &leaps).unwrap();
        assert!((v.xp - (1e-7 - 1e-9)).abs() < 1e-15);
        assert!((v.ut1_utc - (-0.1 + 1e-3)).abs() < 1e-9);
        assert_eq!(v.lod, 1e-3);
        // one day past the last sample
        let v = table.interpolate(gpst_at_mjd(59582.5), &leaps).unwrap();
        assert!((v.xp - (3e-7 + 1e-9)).abs() < 1e-15);
        assert!((v.ut1_utc - (-0.2 - 2e-3)).abs() < 1e-9);
    }

    #[test]
    fn igs_file_loading() {
        let path = std::env::temp_dir().join("gnss_core_erp.erp");
        let mut fd = std::fs::File::create(&path).unwrap();
        writeln!(fd, "version 2").unwrap();
        writeln!(fd, "  MJD      Xpole   Ypole  UT1-UTC    LOD ...").unwrap();
        writeln!(
            fd,
            "59581.50  100000  200000  -1000000  10000 0 0 0 0 0 0 0 10 20"
        )
        .unwrap();
        writeln!(fd, "59580.50   50000  100000   -500000   5000").unwrap();
        let table = ErpTable::from_file(&path).unwrap();
        assert_eq!(table.len(), 2);
        // ascending order enforced, units scaled
        let first = table.entries()[0];
        assert_eq!(first.mjd, 59580.5);
        assert!((first.xp - 0.05 * AS2R).abs() < 1e-15);
        assert!((first.ut1_utc + 0.05).abs() < 1e-12);
        assert_eq!(first.xpr, 0.0);
        let second = table.entries()[1];
        assert!((second.xpr - 10e-6 * AS2R).abs() < 1e-18);
        assert!((second.ypr - 20e-6 * AS2R).abs() < 1e-18);
    }

    #[test]
    fn interpolation_in_gpst_maps_through_utc() {
        // a query 18 s after a sample's UTC epoch (in GPST) must land
        // exactly on the sample
        let table = sample_table();
        let leaps = LeapTable::default();
        let t = gpst_at_mjd(59580.5);
        let (week, tow) = t.to_time_of_week(TimeScale::GPST);
        let same = table
            .interpolate(Epoch::from_time_of_week(week, tow, TimeScale::GPST), &leaps)
            .unwrap();
        assert_eq!(same, table.interpolate(t, &leaps).unwrap());
    }
}
