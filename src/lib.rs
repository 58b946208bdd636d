#![doc = include_str!("../README.md")]
#![cfg_attr(docrs, feature(doc_cfg))]

#[macro_use]
extern crate lazy_static;

pub mod constellation;
pub mod epoch;
pub mod erp;
pub mod frame;
pub mod hygiene;
pub mod leap;
pub mod navigation;
pub mod observation;
pub mod sv;
pub mod timescale;

mod constants;

pub use constants::{DTTOL, SECONDS_PER_DAY, SECONDS_PER_WEEK};

pub mod prelude {
    pub use crate::constellation::Constellation;
    pub use crate::epoch::Epoch;
    pub use crate::erp::{ErpEntry, ErpTable, ErpValues};
    pub use crate::frame::FrameTransform;
    pub use crate::hygiene::AllocPolicy;
    pub use crate::leap::{LeapEntry, LeapTable};
    pub use crate::navigation::{Ephemeris, GloEphemeris, Navigation, SbasEphemeris};
    pub use crate::observation::{ObsRecord, Observations};
    pub use crate::sv::SV;
    pub use crate::timescale::{bdt_to_gpst, gpst_to_bdt, TimeScale};
}
