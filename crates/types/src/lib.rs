//! Validated primitive types shared across the chairside crates.
//!
//! Dental charting works with a handful of small value domains that are easy
//! to get wrong when passed around as bare integers or strings: tooth numbers
//! (whose valid range depends on the charting notation), 0–3 clinical grades
//! (mobility, plaque index, gingival index), and probing depths in
//! millimetres. Each gets a wrapper type here that is impossible to construct
//! in an invalid state, plus serde support so the wire format stays the plain
//! scalar the backend expects.

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing validated chart primitives.
#[derive(Debug, thiserror::Error)]
pub enum ChartTypeError {
    /// The tooth number is outside the valid range for the numbering system.
    #[error("tooth number {number} is not valid in the {system} numbering system")]
    InvalidToothNumber {
        number: u8,
        system: NumberingSystem,
    },
    /// A clinical grade was outside the 0–3 ordinal scale.
    #[error("grade {0} is out of range (expected 0-3)")]
    GradeOutOfRange(u8),
    /// A probing depth was implausibly large.
    #[error("probing depth {0}mm is out of range (expected 0-{max}mm)", max = ProbingDepthMm::MAX_MM)]
    ProbingDepthOutOfRange(u8),
}

/// Tooth numbering notation used by an odontogram.
///
/// Universal notation numbers adult teeth 1–32. FDI (ISO 3950) notation uses
/// two digits, quadrant then position, covering 11–48 for permanent teeth and
/// 51–85 for primary teeth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberingSystem {
    Universal,
    Fdi,
}

impl std::fmt::Display for NumberingSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NumberingSystem::Universal => write!(f, "universal"),
            NumberingSystem::Fdi => write!(f, "FDI"),
        }
    }
}

/// A tooth number known to be valid for some numbering system.
///
/// The number is stored as supplied; validity is checked against the
/// numbering system at construction. Two `ToothNumber`s are equal when their
/// raw numbers are equal, which is what keys edit sessions and conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ToothNumber(u8);

impl ToothNumber {
    /// Validates `number` against `system` and wraps it.
    ///
    /// Universal accepts 1–32. FDI accepts two-digit codes, quadrant digit
    /// then position digit: permanent quadrants 1–4 have positions 1–8
    /// (11–48), primary quadrants 5–8 have positions 1–5 only (51–85).
    pub fn new(number: u8, system: NumberingSystem) -> Result<Self, ChartTypeError> {
        let valid = match system {
            NumberingSystem::Universal => (1..=32).contains(&number),
            NumberingSystem::Fdi => {
                let quadrant = number / 10;
                let position = number % 10;
                match quadrant {
                    1..=4 => (1..=8).contains(&position),
                    5..=8 => (1..=5).contains(&position),
                    _ => false,
                }
            }
        };

        if valid {
            Ok(Self(number))
        } else {
            Err(ChartTypeError::InvalidToothNumber { number, system })
        }
    }

    /// Returns the raw tooth number.
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for ToothNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for ToothNumber {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(self.0)
    }
}

impl<'de> Deserialize<'de> for ToothNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // The wire carries bare numbers without the notation, so accept any
        // number valid in at least one system and let the aggregate's
        // numbering system police the rest.
        let raw = u8::deserialize(deserializer)?;
        ToothNumber::new(raw, NumberingSystem::Universal)
            .or_else(|_| ToothNumber::new(raw, NumberingSystem::Fdi))
            .map_err(serde::de::Error::custom)
    }
}

/// An ordinal clinical grade on the 0–3 scale.
///
/// Used for tooth mobility, plaque index, and gingival index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Grade(u8);

impl Grade {
    pub const ZERO: Grade = Grade(0);

    pub fn new(value: u8) -> Result<Self, ChartTypeError> {
        if value <= 3 {
            Ok(Self(value))
        } else {
            Err(ChartTypeError::GradeOutOfRange(value))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Grade {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(self.0)
    }
}

impl<'de> Deserialize<'de> for Grade {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = u8::deserialize(deserializer)?;
        Grade::new(raw).map_err(serde::de::Error::custom)
    }
}

/// A periodontal probing depth in whole millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct ProbingDepthMm(u8);

impl ProbingDepthMm {
    /// Upper bound for a plausible pocket depth reading.
    pub const MAX_MM: u8 = 20;

    pub fn new(mm: u8) -> Result<Self, ChartTypeError> {
        if mm <= Self::MAX_MM {
            Ok(Self(mm))
        } else {
            Err(ChartTypeError::ProbingDepthOutOfRange(mm))
        }
    }

    pub fn millimetres(&self) -> u8 {
        self.0
    }
}

impl Serialize for ProbingDepthMm {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(self.0)
    }
}

impl<'de> Deserialize<'de> for ProbingDepthMm {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = u8::deserialize(deserializer)?;
        ProbingDepthMm::new(raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn universal_tooth_numbers_accept_1_through_32() {
        for n in 1..=32 {
            assert!(
                ToothNumber::new(n, NumberingSystem::Universal).is_ok(),
                "tooth {n} should be valid in universal notation"
            );
        }
        assert!(ToothNumber::new(0, NumberingSystem::Universal).is_err());
        assert!(ToothNumber::new(33, NumberingSystem::Universal).is_err());
    }

    #[test]
    fn fdi_tooth_numbers_require_valid_quadrant_and_position() {
        assert!(ToothNumber::new(11, NumberingSystem::Fdi).is_ok());
        assert!(ToothNumber::new(48, NumberingSystem::Fdi).is_ok());
        assert!(ToothNumber::new(51, NumberingSystem::Fdi).is_ok());
        assert!(ToothNumber::new(85, NumberingSystem::Fdi).is_ok());

        // Position digit 9 and 0 never exist.
        assert!(ToothNumber::new(19, NumberingSystem::Fdi).is_err());
        assert!(ToothNumber::new(40, NumberingSystem::Fdi).is_err());
        // Quadrant digit 0 and 9 never exist.
        assert!(ToothNumber::new(5, NumberingSystem::Fdi).is_err());
        assert!(ToothNumber::new(91, NumberingSystem::Fdi).is_err());
    }

    #[test]
    fn fdi_primary_quadrants_stop_at_position_five() {
        // Primary dentition has five teeth per quadrant, so 56-58, 66-68,
        // 76-78, and 86-88 are not real teeth.
        for quadrant in 5..=8 {
            for position in 6..=8 {
                let number = quadrant * 10 + position;
                assert!(
                    ToothNumber::new(number, NumberingSystem::Fdi).is_err(),
                    "FDI {number} must be rejected"
                );
            }
            assert!(ToothNumber::new(quadrant * 10 + 5, NumberingSystem::Fdi).is_ok());
        }
    }

    #[test]
    fn tooth_number_deserializes_from_bare_integer() {
        let tooth: ToothNumber =
            serde_json::from_str("14").expect("14 should deserialize");
        assert_eq!(tooth.value(), 14);

        let err = serde_json::from_str::<ToothNumber>("99");
        assert!(err.is_err(), "99 is valid in no notation");
        let err = serde_json::from_str::<ToothNumber>("88");
        assert!(err.is_err(), "88 is past the last primary tooth (85)");
    }

    #[test]
    fn grade_rejects_values_above_three() {
        assert_eq!(Grade::new(3).expect("3 is a valid grade").value(), 3);
        assert!(matches!(Grade::new(4), Err(ChartTypeError::GradeOutOfRange(4))));
    }

    #[test]
    fn probing_depth_has_plausibility_ceiling() {
        assert!(ProbingDepthMm::new(12).is_ok());
        assert!(ProbingDepthMm::new(21).is_err());
    }
}
