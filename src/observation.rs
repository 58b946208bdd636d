//! Observation epochs and their hygiene pass.
use crate::constants::DTTOL;
use crate::epoch::Epoch;
use crate::hygiene::{push_grow, sort_unique, AllocPolicy, Error, Hygiene};
use crate::sv::SV;
use crate::timescale::TimeScale;
use itertools::Itertools;
use log::debug;
use std::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Signals carried per record.
pub const NFREQ: usize = 3;

/// One satellite observed at one receiver and epoch.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObsRecord {
    /// Receiver time of observation
    pub time: Epoch,
    pub sv: SV,
    /// Receiver number (rover 1, base 2, ...)
    pub rcv: u8,
    /// Carrier phase (cycles), per signal
    pub carrier: [f64; NFREQ],
    /// Pseudorange (m)
    pub pseudorange: [f64; NFREQ],
    /// Doppler (Hz)
    pub doppler: [f64; NFREQ],
    /// Signal strength (dBHz)
    pub snr: [f64; NFREQ],
    /// Loss of lock indicators
    pub lli: [u8; NFREQ],
    /// Signal code identifiers
    pub code: [u8; NFREQ],
}

impl Hygiene for ObsRecord {
    /// Key tuple (time, receiver, satellite); timestamps within
    /// [`DTTOL`] compare equal to absorb sub-tolerance clock jitter.
    fn order(&self, other: &Self) -> Ordering {
        let dt = self.time - other.time;
        if dt.abs() > DTTOL {
            if dt < 0.0 {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        } else {
            self.rcv
                .cmp(&other.rcv)
                .then(self.sv.cmp(&other.sv))
        }
    }
    fn redundant_with(&self, other: &Self) -> bool {
        self.sv == other.sv
            && self.rcv == other.rcv
            && (self.time - other.time).abs() <= DTTOL
    }
}

/// Observation data ingested from receiver logs or observation file
/// readers. Owned by one caller; the hygiene pass mutates in place.
#[derive(Debug, Default)]
pub struct Observations {
    data: Vec<ObsRecord>,
    policy: AllocPolicy,
}

impl Observations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects what happens when the collection cannot grow.
    pub fn with_policy(policy: AllocPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn records(&self) -> &[ObsRecord] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn push(&mut self, record: ObsRecord) -> Result<(), Error> {
        push_grow(&mut self.data, record, self.policy)
    }

    /// Sorts by (time, receiver, satellite), drops records repeating
    /// an already kept key (first occurrence wins, times compare with
    /// the [`DTTOL`] tolerance), trims capacity, and returns the
    /// number of distinct observation epochs. Idempotent.
    pub fn sort_unique(&mut self) -> usize {
        debug!("sortobs: nobs={}", self.data.len());
        sort_unique(&mut self.data);
        self.data
            .iter()
            .map(|record| record.time)
            .dedup_by(|a, b| (*a - *b).abs() <= DTTOL)
            .count()
    }

    /// Releases every stored record.
    pub fn clear(&mut self) {
        self.data = Vec::new();
    }
}

/// Screening by time span and interval: true when `time` falls on the
/// sampling grid (GPS time of week modulo `interval`, zero meaning no
/// interval screening) and inside the optional `[start, end]` window.
pub fn screen_time(time: Epoch, start: Option<Epoch>, end: Option<Epoch>, interval: f64) -> bool {
    let (_, tow) = time.to_time_of_week(TimeScale::GPST);
    (interval <= 0.0 || (tow + DTTOL) % interval <= DTTOL * 2.0)
        && start.map_or(true, |ts| time - ts >= -DTTOL)
        && end.map_or(true, |te| time - te < DTTOL)
}
