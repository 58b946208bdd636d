//! Broadcast ephemeris collections and their hygiene pass.
use crate::epoch::Epoch;
use crate::hygiene::{push_grow, sort_unique, AllocPolicy, Error, Hygiene};
use crate::sv::SV;
use log::debug;
use std::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

fn cmp_epoch(a: Epoch, b: Epoch) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// GPS/Galileo/BeiDou/QZSS/IRNSS broadcast (Kepler) ephemeris frame.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ephemeris {
    pub sv: SV,
    /// Issue of data, ephemeris / clock
    pub iode: i32,
    pub iodc: i32,
    /// SV accuracy index and health flag
    pub sva: i32,
    pub svh: i32,
    pub week: i32,
    pub code: i32,
    /// Reference epochs: ephemeris, clock, transmission
    pub toe: Epoch,
    pub toc: Epoch,
    pub ttr: Epoch,
    /// Orbit: semi major axis (m), eccentricity, inclination,
    /// node/perigee/mean anomalies (rad)
    pub a: f64,
    pub e: f64,
    pub i0: f64,
    pub omg0: f64,
    pub omg: f64,
    pub m0: f64,
    /// Mean motion and rate corrections (rad/s)
    pub deln: f64,
    pub omgd: f64,
    pub idot: f64,
    /// Harmonic perturbation coefficients
    pub crc: f64,
    pub crs: f64,
    pub cuc: f64,
    pub cus: f64,
    pub cic: f64,
    pub cis: f64,
    /// Toe as seconds of week, fit interval (h)
    pub toes: f64,
    pub fit: f64,
    /// SV clock polynomial (s, s/s, s/s²)
    pub f0: f64,
    pub f1: f64,
    pub f2: f64,
    /// Group delays (s)
    pub tgd: [f64; 2],
}

impl Hygiene for Ephemeris {
    fn order(&self, other: &Self) -> Ordering {
        cmp_epoch(self.ttr, other.ttr)
            .then(cmp_epoch(self.toe, other.toe))
            .then(self.sv.cmp(&other.sv))
    }
    fn redundant_with(&self, other: &Self) -> bool {
        self.sv == other.sv && self.iode == other.iode
    }
}

/// GLONASS (Cartesian state) ephemeris frame.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GloEphemeris {
    pub sv: SV,
    pub iode: i32,
    /// Frequency channel number (-7..6)
    pub frq: i32,
    pub svh: i32,
    pub sva: i32,
    pub age: i32,
    /// Reference and frame epochs
    pub toe: Epoch,
    pub tof: Epoch,
    /// State in PZ-90 (m, m/s, m/s²)
    pub pos: [f64; 3],
    pub vel: [f64; 3],
    pub acc: [f64; 3],
    /// Clock bias (s), relative frequency bias, inter-frequency delay (s)
    pub taun: f64,
    pub gamn: f64,
    pub dtaun: f64,
}

impl Hygiene for GloEphemeris {
    fn order(&self, other: &Self) -> Ordering {
        cmp_epoch(self.tof, other.tof)
            .then(cmp_epoch(self.toe, other.toe))
            .then(self.sv.cmp(&other.sv))
    }
    fn redundant_with(&self, other: &Self) -> bool {
        self.sv == other.sv && self.toe == other.toe && self.svh == other.svh
    }
}

/// SBAS broadcast ephemeris frame.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SbasEphemeris {
    pub sv: SV,
    /// Reference and frame epochs
    pub t0: Epoch,
    pub tof: Epoch,
    pub sva: i32,
    pub svh: i32,
    /// State in ECEF (m, m/s, m/s²)
    pub pos: [f64; 3],
    pub vel: [f64; 3],
    pub acc: [f64; 3],
    /// Clock bias (s) and drift (s/s)
    pub af0: f64,
    pub af1: f64,
}

impl Hygiene for SbasEphemeris {
    fn order(&self, other: &Self) -> Ordering {
        cmp_epoch(self.tof, other.tof)
            .then(cmp_epoch(self.t0, other.t0))
            .then(self.sv.cmp(&other.sv))
    }
    fn redundant_with(&self, other: &Self) -> bool {
        self.sv == other.sv && self.t0 == other.t0
    }
}

/// Navigation data ingested from broadcast ephemeris readers. Owned by
/// one caller; the hygiene pass mutates in place.
#[derive(Debug, Default)]
pub struct Navigation {
    eph: Vec<Ephemeris>,
    geph: Vec<GloEphemeris>,
    seph: Vec<SbasEphemeris>,
    policy: AllocPolicy,
}

impl Navigation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects what happens when a collection cannot grow.
    pub fn with_policy(policy: AllocPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn ephemerides(&self) -> &[Ephemeris] {
        &self.eph
    }

    pub fn glo_ephemerides(&self) -> &[GloEphemeris] {
        &self.geph
    }

    pub fn sbas_ephemerides(&self) -> &[SbasEphemeris] {
        &self.seph
    }

    pub fn is_empty(&self) -> bool {
        self.eph.is_empty() && self.geph.is_empty() && self.seph.is_empty()
    }

    pub fn push_ephemeris(&mut self, eph: Ephemeris) -> Result<(), Error> {
        push_grow(&mut self.eph, eph, self.policy)
    }

    pub fn push_glo_ephemeris(&mut self, geph: GloEphemeris) -> Result<(), Error> {
        push_grow(&mut self.geph, geph, self.policy)
    }

    pub fn push_sbas_ephemeris(&mut self, seph: SbasEphemeris) -> Result<(), Error> {
        push_grow(&mut self.seph, seph, self.policy)
    }

    /// Sorts every ephemeris kind by its key tuple, drops redundant
    /// frames (first occurrence wins) and trims capacity to the
    /// surviving counts. Idempotent; run after every bulk ingest.
    pub fn sort_unique(&mut self) {
        sort_unique(&mut self.eph);
        sort_unique(&mut self.geph);
        sort_unique(&mut self.seph);
        debug!(
            "uniqnav: neph={} ngeph={} nseph={}",
            self.eph.len(),
            self.geph.len(),
            self.seph.len()
        );
    }

    /// Releases every stored frame.
    pub fn clear(&mut self) {
        self.eph = Vec::new();
        self.geph = Vec::new();
        self.seph = Vec::new();
    }
}
