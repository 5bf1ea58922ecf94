use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Deserializer, Serialize};

/// Number of segments on the wheel
pub const SEGMENT_COUNT: usize = 10;

/// Angular width of one segment, in degrees
pub const SEGMENT_ANGLE: f64 = 360.0 / SEGMENT_COUNT as f64;

/// The values printed on the wheel, in segment order
pub const RESULT_SET: [u8; SEGMENT_COUNT] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9];

/// A level the user picks before spinning. Determines which image pool the
/// envelope draws from.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    ValueEnum,
    strum_macros::Display,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Segundo,
    Tercero,
    Cuarto,
    Quinto,
    Sexto,
    Septimo,
    Docentes,
    Adultos,
}

impl Category {
    /// Menu order
    pub const ALL: [Category; 8] = [
        Category::Segundo,
        Category::Tercero,
        Category::Cuarto,
        Category::Quinto,
        Category::Sexto,
        Category::Septimo,
        Category::Docentes,
        Category::Adultos,
    ];

    pub fn position(self) -> usize {
        Self::ALL.iter().position(|c| *c == self).unwrap_or(0)
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown level: {s}"))
    }
}

// Hand-edited config files spell levels in any case.
impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Segment sitting under the pointer when the wheel is turned by `rotation`
/// degrees. Segment `i` spans `[i*36, (i+1)*36)` clockwise from the pointer
/// at rest; negative rotation turns the wheel counterclockwise.
pub fn segment_at(rotation: f64) -> usize {
    let local = (-rotation).rem_euclid(360.0);
    ((local / SEGMENT_ANGLE).floor() as usize) % SEGMENT_COUNT
}

/// Offset of the pointer inside the segment it sits on, in degrees from the
/// segment's leading edge.
pub fn offset_in_segment(rotation: f64) -> f64 {
    (-rotation).rem_euclid(360.0).rem_euclid(SEGMENT_ANGLE)
}
