//! # Compass Points
//!
//! Wind direction is carried as one of the sixteen standard compass points.
//! Upstream providers report bearings in degrees; [`CompassPoint::from_degrees`]
//! snaps a bearing to the nearest point so every lookup table downstream can
//! match exhaustively.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One of the sixteen points of the compass, clockwise from north.
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompassPoint {
    N,
    NNE,
    NE,
    ENE,
    E,
    ESE,
    SE,
    SSE,
    S,
    SSW,
    SW,
    WSW,
    W,
    WNW,
    NW,
    NNW,
}

/// Returned when a string does not name one of the sixteen points.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown compass point: {0:?}")]
pub struct UnknownCompassPoint(pub String);

impl CompassPoint {
    /// All sixteen points in clockwise order starting at north.
    pub const ALL: [CompassPoint; 16] = [
        CompassPoint::N,
        CompassPoint::NNE,
        CompassPoint::NE,
        CompassPoint::ENE,
        CompassPoint::E,
        CompassPoint::ESE,
        CompassPoint::SE,
        CompassPoint::SSE,
        CompassPoint::S,
        CompassPoint::SSW,
        CompassPoint::SW,
        CompassPoint::WSW,
        CompassPoint::W,
        CompassPoint::WNW,
        CompassPoint::NW,
        CompassPoint::NNW,
    ];

    /// The eight principal and intercardinal points.
    pub const PRINCIPAL: [CompassPoint; 8] = [
        CompassPoint::N,
        CompassPoint::NE,
        CompassPoint::E,
        CompassPoint::SE,
        CompassPoint::S,
        CompassPoint::SW,
        CompassPoint::W,
        CompassPoint::NW,
    ];

    /// Snap a bearing in degrees to the nearest compass point.
    ///
    /// Bearings outside 0–360 wrap around, so `-22.5` is `NNW` and `382.5`
    /// is `NNE`.
    ///
    /// # Example
    /// ```
    /// use paddle_forecast_lib::compass::CompassPoint;
    ///
    /// assert_eq!(CompassPoint::from_degrees(44.0), CompassPoint::NE);
    /// assert_eq!(CompassPoint::from_degrees(355.0), CompassPoint::N);
    /// ```
    pub fn from_degrees(degrees: f64) -> Self {
        if !degrees.is_finite() {
            return CompassPoint::N;
        }
        let index = (degrees / 22.5).round() as i64;
        Self::ALL[index.rem_euclid(16) as usize]
    }

    /// Bearing of this point in degrees (N = 0, E = 90).
    pub fn degrees(self) -> f64 {
        self.index() as f64 * 22.5
    }

    /// Position in [`CompassPoint::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// The point directly opposite this one.
    pub fn opposite(self) -> Self {
        Self::ALL[(self.index() + 8) % 16]
    }

    /// Standard abbreviation, e.g. `"WSW"`.
    pub fn abbreviation(self) -> &'static str {
        match self {
            CompassPoint::N => "N",
            CompassPoint::NNE => "NNE",
            CompassPoint::NE => "NE",
            CompassPoint::ENE => "ENE",
            CompassPoint::E => "E",
            CompassPoint::ESE => "ESE",
            CompassPoint::SE => "SE",
            CompassPoint::SSE => "SSE",
            CompassPoint::S => "S",
            CompassPoint::SSW => "SSW",
            CompassPoint::SW => "SW",
            CompassPoint::WSW => "WSW",
            CompassPoint::W => "W",
            CompassPoint::WNW => "WNW",
            CompassPoint::NW => "NW",
            CompassPoint::NNW => "NNW",
        }
    }
}

impl fmt::Display for CompassPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.abbreviation())
    }
}

impl FromStr for CompassPoint {
    type Err = UnknownCompassPoint;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|point| point.abbreviation().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownCompassPoint(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_degrees_snaps_to_nearest_point() {
        assert_eq!(CompassPoint::from_degrees(0.0), CompassPoint::N);
        assert_eq!(CompassPoint::from_degrees(11.0), CompassPoint::N);
        assert_eq!(CompassPoint::from_degrees(12.0), CompassPoint::NNE);
        assert_eq!(CompassPoint::from_degrees(90.0), CompassPoint::E);
        assert_eq!(CompassPoint::from_degrees(225.0), CompassPoint::SW);
        assert_eq!(CompassPoint::from_degrees(349.0), CompassPoint::NNW);
        assert_eq!(CompassPoint::from_degrees(360.0), CompassPoint::N);
    }

    #[test]
    fn test_from_degrees_wraps_out_of_range_bearings() {
        assert_eq!(CompassPoint::from_degrees(-22.5), CompassPoint::NNW);
        assert_eq!(CompassPoint::from_degrees(382.5), CompassPoint::NNE);
        assert_eq!(CompassPoint::from_degrees(f64::NAN), CompassPoint::N);
    }

    #[test]
    fn test_degrees_round_trips_every_point() {
        for point in CompassPoint::ALL {
            assert_eq!(CompassPoint::from_degrees(point.degrees()), point);
        }
        assert_eq!(CompassPoint::WSW.degrees(), 247.5);
    }

    #[test]
    fn test_opposite() {
        assert_eq!(CompassPoint::NE.opposite(), CompassPoint::SW);
        assert_eq!(CompassPoint::ENE.opposite(), CompassPoint::WSW);
        assert_eq!(CompassPoint::NNW.opposite(), CompassPoint::SSE);
    }

    #[test]
    fn test_parse_is_case_insensitive_and_strict() {
        assert_eq!("wsw".parse::<CompassPoint>(), Ok(CompassPoint::WSW));
        assert_eq!(" NE ".parse::<CompassPoint>(), Ok(CompassPoint::NE));
        assert!("NORTH".parse::<CompassPoint>().is_err());
        assert!("".parse::<CompassPoint>().is_err());
    }

    #[test]
    fn test_display_honours_width() {
        assert_eq!(format!("[{:<3}]", CompassPoint::E), "[E  ]");
        assert_eq!(format!("{}", CompassPoint::WNW), "WNW");
    }

    #[test]
    fn test_serde_uses_abbreviations() {
        let json = serde_json::to_string(&CompassPoint::SSW).unwrap();
        assert_eq!(json, "\"SSW\"");
        let parsed: CompassPoint = serde_json::from_str("\"ENE\"").unwrap();
        assert_eq!(parsed, CompassPoint::ENE);
    }
}
