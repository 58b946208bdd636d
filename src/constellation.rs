//! GNSS constellations
use crate::timescale::TimeScale;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Constellation parsing & identification related errors
#[derive(Error, Clone, Debug, PartialEq)]
pub enum ParsingError {
    #[error("unknown constellation \"{0}\"")]
    Unknown(String),
}

/// Constellations a satellite may belong to. The declaration order is
/// the dense satellite index block order, see [`crate::sv::SV`].
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Constellation {
    /// `GPS` american constellation
    #[default]
    GPS,
    /// `Glonass` russian constellation
    Glonass,
    /// `Galileo` european constellation
    Galileo,
    /// `QZSS` japanese constellation
    QZSS,
    /// `BeiDou` chinese constellation
    BeiDou,
    /// `IRNSS` constellation, renamed "NavIC"
    IRNSS,
    /// Low earth orbit augmentation block, reserved
    LEO,
    /// Space based augmentation vehicles, without further distinction
    SBAS,
}

impl Constellation {
    /// Inclusive PRN (or slot) bounds of this constellation.
    pub const fn prn_bounds(&self) -> (u8, u8) {
        match self {
            Self::GPS => (1, 32),
            Self::Glonass => (1, 27),
            Self::Galileo => (1, 36),
            Self::QZSS => (193, 202),
            Self::BeiDou => (1, 63),
            Self::IRNSS => (1, 14),
            Self::LEO => (1, 10),
            Self::SBAS => (120, 158),
        }
    }

    /// Number of satellite index slots this constellation occupies.
    pub(crate) const fn slots(&self) -> usize {
        let (min, max) = self.prn_bounds();
        max as usize - min as usize + 1
    }

    /// Returns the time scale this constellation broadcasts in.
    /// Returns None if the related time scale is not supported.
    pub fn timescale(&self) -> Option<TimeScale> {
        match self {
            Self::GPS | Self::QZSS | Self::SBAS => Some(TimeScale::GPST),
            Self::Galileo => Some(TimeScale::GST),
            Self::BeiDou => Some(TimeScale::BDT),
            Self::Glonass => Some(TimeScale::UTC),
            Self::IRNSS | Self::LEO => None,
        }
    }
}

impl std::str::FromStr for Constellation {
    type Err = ParsingError;
    fn from_str(string: &str) -> Result<Self, Self::Err> {
        match string.trim().to_lowercase().as_str() {
            "g" | "gps" => Ok(Self::GPS),
            "r" | "glo" | "glonass" => Ok(Self::Glonass),
            "e" | "gal" | "galileo" => Ok(Self::Galileo),
            "j" | "qzss" => Ok(Self::QZSS),
            "c" | "bds" | "beidou" => Ok(Self::BeiDou),
            "i" | "irnss" | "navic" => Ok(Self::IRNSS),
            "l" | "leo" => Ok(Self::LEO),
            "s" | "sbas" => Ok(Self::SBAS),
            _ => Err(ParsingError::Unknown(string.to_string())),
        }
    }
}

impl std::fmt::LowerHex for Constellation {
    /*
     * {:x}: formats Self as single letter standard code
     */
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::GPS => write!(f, "G"),
            Self::Glonass => write!(f, "R"),
            Self::Galileo => write!(f, "E"),
            Self::QZSS => write!(f, "J"),
            Self::BeiDou => write!(f, "C"),
            Self::IRNSS => write!(f, "I"),
            Self::LEO => write!(f, "L"),
            Self::SBAS => write!(f, "S"),
        }
    }
}

impl std::fmt::Display for Constellation {
    /*
     * Formats Self as standard 3-4 letter code
     */
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::GPS => write!(f, "GPS"),
            Self::Glonass => write!(f, "GLO"),
            Self::Galileo => write!(f, "GAL"),
            Self::QZSS => write!(f, "QZSS"),
            Self::BeiDou => write!(f, "BDS"),
            Self::IRNSS => write!(f, "IRNSS"),
            Self::LEO => write!(f, "LEO"),
            Self::SBAS => write!(f, "SBAS"),
        }
    }
}
