//! # Paddle Forecast Core Library
//!
//! This library estimates how favorable conditions are for a short open-water
//! paddle between two fixed shore points, one leg out and one leg back. It turns
//! raw weather samples and sparse tide extrema into a 0–10 score per leg, picks
//! a recommended leg, and rolls hourly results up into a day summary.
//!
//! ## Data Flow
//! 1. **Sources**: live providers (OpenWeatherMap, NIWA) or the deterministic
//!    synthetic generators produce [`WeatherSample`]s and [`TideExtremum`]s
//! 2. **Tide**: [`tide::interpolate`] derives a [`TideState`] for any instant
//! 3. **Difficulty**: [`difficulty::assess`] scores one leg
//! 4. **Directions**: [`directions::assess_paddle_directions`] arbitrates both legs
//! 5. **Forecast**: [`forecast::build_daily_forecast`] drives the above across
//!    hours 6–22 of a day
//!
//! Everything after step 1 is a pure, synchronous function of its inputs. Only
//! the sources suspend on I/O, and their failures are absorbed by falling back
//! to synthetic data, so a caller always gets an assessment.
//!
//! ## Core Types
//! - [`WeatherSample`]: wind, gust and temperature at one instant
//! - [`TideExtremum`]: one recorded high or low water event
//! - [`TideState`]: interpolated tide at one instant
//! - [`Leg`]: which way the paddler is travelling
//! - [`PaddlingConditions`]: the weather and tide a leg is scored against

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod compass;
pub mod config;
pub mod difficulty;
pub mod directions;
pub mod error;
pub mod fallback;
pub mod forecast;
pub mod renderer;
pub mod sources;
pub mod tide;
pub mod tide_data;
pub mod weather_data;

pub use compass::CompassPoint;

/// Wall-clock instant at the paddling site.
///
/// Stored with the site's UTC offset so that hour-of-day lookups (time factor,
/// forecast grid) read local time without consulting the host's timezone.
pub type SiteTime = DateTime<FixedOffset>;

/// Local wall-clock time `hour:00` on `date` at the given offset.
///
/// Hours past 23 roll into the following days.
pub fn site_time(date: NaiveDate, hour: u32, offset: FixedOffset) -> SiteTime {
    let local = date.and_time(NaiveTime::MIN) + Duration::hours(hour as i64);
    offset.from_utc_datetime(&(local - Duration::seconds(offset.local_minus_utc() as i64)))
}

/// A single weather observation or forecast point.
///
/// Speeds are km/h. Gusts are expected to be at least the sustained wind speed
/// but nothing enforces it; the scorer only looks at the difference.
///
/// # Example
/// ```
/// use chrono::{FixedOffset, TimeZone};
/// use paddle_forecast_lib::{CompassPoint, WeatherSample};
///
/// let nzst = FixedOffset::east_opt(12 * 3600).unwrap();
/// let sample = WeatherSample {
///     wind_speed: 8.0,
///     wind_direction: CompassPoint::NE,
///     gust_speed: 10.0,
///     temperature: 23.0,
///     timestamp: nzst.with_ymd_and_hms(2024, 8, 17, 17, 0, 0).unwrap(),
/// };
/// assert_eq!(sample.gust_spread(), 2.0);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeatherSample {
    /// Sustained wind speed in km/h
    pub wind_speed: f64,
    /// Direction the wind blows from
    pub wind_direction: CompassPoint,
    /// Gust speed in km/h
    pub gust_speed: f64,
    /// Air temperature in °C
    pub temperature: f64,
    pub timestamp: SiteTime,
}

impl WeatherSample {
    /// How far gusts exceed the sustained wind.
    pub fn gust_spread(&self) -> f64 {
        self.gust_speed - self.wind_speed
    }
}

/// High or low water.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TideKind {
    High,
    Low,
}

impl fmt::Display for TideKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TideKind::High => f.write_str("high"),
            TideKind::Low => f.write_str("low"),
        }
    }
}

/// Whether the water is rising, falling or holding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TideDirection {
    Incoming,
    Outgoing,
    Slack,
}

impl fmt::Display for TideDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TideDirection::Incoming => f.write_str("incoming"),
            TideDirection::Outgoing => f.write_str("outgoing"),
            TideDirection::Slack => f.write_str("slack"),
        }
    }
}

/// A recorded high or low water event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TideExtremum {
    pub time: SiteTime,
    /// Height in metres relative to mean sea level (may be negative)
    pub height: f64,
    pub kind: TideKind,
}

/// Tide conditions at one instant, derived from the surrounding extrema.
///
/// `kind` is a relative classification (above or below the day's mean), not a
/// claim that the instant is itself an extremum. Recomputed on every query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TideState {
    /// Height in metres, rounded to 0.1
    pub height: f64,
    pub kind: TideKind,
    pub direction: TideDirection,
    /// Time of the next bracketing extremum, or a six hour guess
    pub next_change: SiteTime,
    pub timestamp: SiteTime,
}

impl TideState {
    /// Placeholder used when no tide data exists at all.
    ///
    /// This is not a measurement: 1.0 m, high, slack, next change in six hours.
    pub fn neutral(at: SiteTime) -> Self {
        TideState {
            height: 1.0,
            kind: TideKind::High,
            direction: TideDirection::Slack,
            next_change: at + Duration::hours(6),
            timestamp: at,
        }
    }
}

/// One of the two legs of the route.
///
/// Outgoing runs from the launch point to the far shore, incoming comes back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Leg {
    Outgoing,
    Incoming,
}

impl Leg {
    pub const BOTH: [Leg; 2] = [Leg::Outgoing, Leg::Incoming];

    pub fn opposite(self) -> Leg {
        match self {
            Leg::Outgoing => Leg::Incoming,
            Leg::Incoming => Leg::Outgoing,
        }
    }

    /// The tide direction that carries a paddler along this leg.
    pub fn assisting_tide(self) -> TideDirection {
        match self {
            Leg::Outgoing => TideDirection::Outgoing,
            Leg::Incoming => TideDirection::Incoming,
        }
    }
}

impl fmt::Display for Leg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Leg::Outgoing => f.write_str("outgoing"),
            Leg::Incoming => f.write_str("incoming"),
        }
    }
}

/// The inputs one assessment is made from.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaddlingConditions {
    pub weather: WeatherSample,
    pub tide: TideState,
    pub time_of_day: SiteTime,
    /// Launch site name
    pub location: String,
    /// True if any input came from a synthetic source
    pub offline: bool,
}
