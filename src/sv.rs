//! Space vehicles and the dense satellite index
use crate::constellation::Constellation;
use crate::timescale::TimeScale;
use std::str::FromStr;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Index block partition: constellations in index order. Each block is
/// one contiguous PRN/slot sub-range, see [`Constellation::prn_bounds`].
const BLOCKS: [Constellation; 8] = [
    Constellation::GPS,
    Constellation::Glonass,
    Constellation::Galileo,
    Constellation::QZSS,
    Constellation::BeiDou,
    Constellation::IRNSS,
    Constellation::LEO,
    Constellation::SBAS,
];

/// Highest satellite index. Valid indices partition `[1, MAX_SV]`;
/// 0 is reserved as the "none/invalid" sentinel and is never produced.
pub const MAX_SV: usize = {
    let mut total = 0;
    let mut i = 0;
    while i < BLOCKS.len() {
        total += BLOCKS[i].slots();
        i += 1;
    }
    total
};

/// Parsing & identification related errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParsingError {
    #[error("constellation parsing error")]
    ConstellationParsing(#[from] crate::constellation::ParsingError),
    #[error("sv prn# parsing error")]
    PRNParsing(#[from] std::num::ParseIntError),
    #[error("prn {1} outside the {0} range")]
    PRNRange(Constellation, u16),
}

/// `SV` describes a Satellite Vehicle
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SV {
    /// `GNSS` Constellation to which this vehicle is tied to
    pub constellation: Constellation,
    /// PRN (or slot) identification # for this vehicle
    pub prn: u8,
}

impl SV {
    /// Builds a new SV
    /// ```
    /// use gnss_core::prelude::*;
    ///
    /// let sv = SV::new(Constellation::GPS, 5);
    /// assert_eq!(sv.index(), Some(5));
    /// assert_eq!(sv.to_string(), "G05");
    /// ```
    pub fn new(constellation: Constellation, prn: u8) -> Self {
        Self { constellation, prn }
    }

    /// Returns the Timescale of which this SV is a part of.
    pub fn timescale(&self) -> Option<TimeScale> {
        self.constellation.timescale()
    }

    /// Dense satellite index in `[1, MAX_SV]`, the key into
    /// per-satellite arrays. None when the PRN lies outside the
    /// constellation bounds.
    pub fn index(&self) -> Option<usize> {
        let (min, max) = self.constellation.prn_bounds();
        if self.prn < min || self.prn > max {
            return None;
        }
        let mut base = 0;
        for block in BLOCKS.iter() {
            if *block == self.constellation {
                return Some(base + usize::from(self.prn - min) + 1);
            }
            base += block.slots();
        }
        None
    }

    /// Inverse of [`SV::index`]: None when the index falls outside
    /// `[1, MAX_SV]`.
    /// ```
    /// use gnss_core::prelude::*;
    ///
    /// assert_eq!(SV::from_index(1), Some(SV::new(Constellation::GPS, 1)));
    /// assert_eq!(SV::from_index(0), None);
    /// ```
    pub fn from_index(index: usize) -> Option<Self> {
        if index == 0 {
            return None;
        }
        let mut remainder = index - 1;
        for block in BLOCKS.iter() {
            if remainder < block.slots() {
                let (min, _) = block.prn_bounds();
                return Some(SV::new(*block, min + remainder as u8));
            }
            remainder -= block.slots();
        }
        None
    }
}

impl std::str::FromStr for SV {
    type Err = ParsingError;
    /*
     * Parses the "XYY" standardized label, or a bare 2-3 digit PRN
     * resolved by numeric range into GPS, SBAS or QZSS.
     */
    fn from_str(string: &str) -> Result<Self, Self::Err> {
        let string = string.trim();
        let sv = if let Ok(prn) = string.parse::<u16>() {
            let constellation = match prn {
                1..=32 => Constellation::GPS,
                120..=158 => Constellation::SBAS,
                193..=202 => Constellation::QZSS,
                _ => return Err(ParsingError::PRNRange(Constellation::GPS, prn)),
            };
            SV::new(constellation, prn as u8)
        } else {
            let constellation = Constellation::from_str(string.get(0..1).unwrap_or(""))?;
            let prn = string[1..].trim().parse::<u8>()?;
            // single letter labels count from 1 inside each block
            let prn = match constellation {
                Constellation::QZSS => prn.saturating_add(192),
                Constellation::SBAS => prn.saturating_add(100),
                _ => prn,
            };
            SV::new(constellation, prn)
        };
        match sv.index() {
            Some(_) => Ok(sv),
            None => Err(ParsingError::PRNRange(
                sv.constellation,
                u16::from(sv.prn),
            )),
        }
    }
}

impl std::fmt::Display for SV {
    /*
     * Prints self as XYY standard label; SBAS vehicles print their
     * bare 3-digit PRN, the exact inverse of parsing
     */
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.constellation {
            Constellation::SBAS => write!(f, "{:03}", self.prn),
            Constellation::QZSS => write!(f, "J{:02}", self.prn.saturating_sub(192)),
            _ => write!(f, "{:x}{:02}", self.constellation, self.prn),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn index_partition() {
        assert_eq!(MAX_SV, 231);
        assert_eq!(SV::new(Constellation::GPS, 1).index(), Some(1));
        assert_eq!(SV::new(Constellation::GPS, 32).index(), Some(32));
        // out of range PRN maps to nothing
        assert_eq!(SV::new(Constellation::GPS, 33).index(), None);
        assert_eq!(SV::new(Constellation::GPS, 0).index(), None);
        assert_eq!(SV::new(Constellation::Glonass, 1).index(), Some(33));
        assert_eq!(SV::new(Constellation::Galileo, 1).index(), Some(60));
        assert_eq!(SV::new(Constellation::QZSS, 193).index(), Some(96));
        assert_eq!(SV::new(Constellation::BeiDou, 1).index(), Some(106));
        assert_eq!(SV::new(Constellation::IRNSS, 1).index(), Some(169));
        assert_eq!(SV::new(Constellation::LEO, 1).index(), Some(183));
        assert_eq!(SV::new(Constellation::SBAS, 120).index(), Some(193));
        assert_eq!(SV::new(Constellation::SBAS, 158).index(), Some(MAX_SV));
    }

    #[test]
    fn index_roundtrip() {
        for index in 1..=MAX_SV {
            let sv = SV::from_index(index).unwrap();
            assert_eq!(sv.index(), Some(index), "index {} roundtrip", index);
        }
        assert_eq!(SV::from_index(0), None);
        assert_eq!(SV::from_index(MAX_SV + 1), None);
        assert_eq!(SV::from_index(1), Some(SV::new(Constellation::GPS, 1)));
    }

    #[test]
    fn from_str() {
        for (descriptor, expected) in [
            ("G01", SV::new(Constellation::GPS, 1)),
            ("G 5", SV::new(Constellation::GPS, 5)),
            ("R12", SV::new(Constellation::Glonass, 12)),
            ("E36", SV::new(Constellation::Galileo, 36)),
            ("J01", SV::new(Constellation::QZSS, 193)),
            ("C63", SV::new(Constellation::BeiDou, 63)),
            ("I07", SV::new(Constellation::IRNSS, 7)),
            ("L03", SV::new(Constellation::LEO, 3)),
            ("S33", SV::new(Constellation::SBAS, 133)),
        ] {
            let sv = SV::from_str(descriptor);
            assert_eq!(
                sv,
                Ok(expected),
                "badly identified sv from \"{}\"",
                descriptor
            );
        }
    }

    #[test]
    fn bare_numeric_labels() {
        // bare PRN disambiguated by range
        assert_eq!(
            SV::from_str("5"),
            Ok(SV::new(Constellation::GPS, 5)),
        );
        assert_eq!(SV::from_str("5").unwrap().index(), SV::from_str("G05").unwrap().index());
        assert_eq!(SV::from_str("133"), Ok(SV::new(Constellation::SBAS, 133)));
        assert_eq!(SV::from_str("193"), Ok(SV::new(Constellation::QZSS, 193)));
        assert!(SV::from_str("33").is_err());
        assert!(SV::from_str("300").is_err());
    }

    #[test]
    fn rejected_labels() {
        for label in ["G00", "G33", "R28", "E37", "J11", "X05", ""] {
            assert!(SV::from_str(label).is_err(), "accepted \"{}\"", label);
        }
    }

    #[test]
    fn label_roundtrip() {
        for label in ["G05", "R12", "E33", "J02", "C45", "I09", "L05", "133"] {
            let sv = SV::from_str(label).unwrap();
            assert_eq!(sv.to_string(), label, "label roundtrip for \"{}\"", label);
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_form() {
        let sv = SV::new(Constellation::Galileo, 13);
        let json = serde_json::to_string(&sv).unwrap();
        assert_eq!(json, "{\"constellation\":\"Galileo\",\"prn\":13}");
        assert_eq!(serde_json::from_str::<SV>(&json).unwrap(), sv);
    }
}
