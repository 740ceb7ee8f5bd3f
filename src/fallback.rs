//! # Fallback Weather and Tide Models
//!
//! This module provides deterministic synthetic data for when the live
//! providers are unavailable, unconfigured, or deliberately bypassed with
//! `--offline`. Both generators are pure functions of the local date and hour,
//! so the same day always produces the same forecast and tests never see true
//! randomness.
//!
//! ## Weather Model
//! A seed is derived from hour, day of month and month. Wind, gusts, direction
//! and temperature are sums of sinusoids of that seed plus a diurnal cycle:
//! - **Wind**: 8 km/h base ± 15, ± 4 over the day, never below 3 km/h
//! - **Gusts**: 3–9 km/h above the sustained wind
//! - **Direction**: one of the eight principal points
//! - **Temperature**: 18 °C ± 6 over the day, peaking mid-afternoon
//!
//! ## Tide Model
//! Four extrema at nominal 02:00, 08:00, 14:00 and 20:00, alternating high
//! (about 1.5 m) and low (about 0.2 m). Each time is jittered by up to an hour
//! and each height by up to 0.2 m, drawn from a `StdRng` seeded by the date.
//!
//! ### Accuracy Trade-offs
//! - ✅ **Plausible ranges**: heights and winds stay inside what the site sees
//! - ✅ **Reproducible**: same date, same numbers
//! - ❌ **No real phase**: tide times do not track the moon
//! - ❌ **No weather systems**: hours are independent of each other
//!
//! Every assessment built from these sources is flagged `offline`.

use crate::error::SourceError;
use crate::sources::{TideSource, WeatherSource};
use crate::tide::round_tenth;
use crate::{site_time, CompassPoint, SiteTime, TideExtremum, TideKind, WeatherSample};
use async_trait::async_trait;
use chrono::{Datelike, Duration, DurationRound, FixedOffset, NaiveDate, Timelike};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

const SOURCE_NAME: &str = "synthetic";

/// Nominal hours of the four daily extrema.
const TIDE_BASE_HOURS: [f64; 4] = [2.0, 8.0, 14.0, 20.0];
const HIGH_WATER_M: f64 = 1.5;
const LOW_WATER_M: f64 = 0.2;
/// Maximum jitter either side of the nominal time (hours) and height (m).
const TIME_JITTER_HOURS: f64 = 1.0;
const HEIGHT_JITTER_M: f64 = 0.2;

/// Seed shared by the weather sinusoids for one hour of one day.
fn weather_seed(date: NaiveDate, hour: u32) -> f64 {
    (hour + date.day() * 24 + date.month0() * 744) as f64
}

/// Synthetic weather for the whole hour containing `at`.
///
/// The sample is stamped with `at` itself.
pub fn synthetic_weather(at: SiteTime) -> WeatherSample {
    let date = at.date_naive();
    let hour = at.hour();
    let seed = weather_seed(date, hour);
    let h = hour as f64;

    let base_wind = 8.0 + (seed * 0.1).sin() * 15.0;
    let diurnal_wind = ((h - 12.0) * PI / 12.0).sin() * 4.0;
    let noise = ((seed * 0.3).sin() + (seed * 0.7).cos()) * 3.0;
    let wind_speed = (base_wind + diurnal_wind + noise).round().max(3.0);

    let index = ((seed * 0.2).sin().abs() * CompassPoint::PRINCIPAL.len() as f64) as usize;
    let wind_direction = CompassPoint::PRINCIPAL[index.min(CompassPoint::PRINCIPAL.len() - 1)];

    let base_temp = 18.0 + ((h - 6.0) * PI / 12.0).sin() * 6.0;
    let temp_noise = ((seed * 0.15).sin() + (seed * 0.45).cos()) * 3.0;
    let temperature = (base_temp + temp_noise).round();

    let gust_speed = (wind_speed + 3.0 + (seed * 0.5).sin().abs() * 6.0).round();

    WeatherSample {
        wind_speed,
        wind_direction,
        gust_speed,
        temperature,
        timestamp: at,
    }
}

/// One synthetic sample per whole hour in `from..=to`.
pub fn synthetic_weather_range(from: SiteTime, to: SiteTime) -> Vec<WeatherSample> {
    let mut current = from
        .duration_trunc(Duration::hours(1))
        .unwrap_or(from);
    if current < from {
        current += Duration::hours(1);
    }

    let mut samples = Vec::new();
    while current <= to {
        samples.push(synthetic_weather(current));
        current += Duration::hours(1);
    }
    samples
}

/// Four synthetic high and low water events for `date`, sorted by time.
pub fn synthetic_tide_extrema(date: NaiveDate, offset: FixedOffset) -> Vec<TideExtremum> {
    let mut rng = StdRng::seed_from_u64(date.num_days_from_ce() as u64);
    let midnight = site_time(date, 0, offset);

    let mut extrema: Vec<TideExtremum> = TIDE_BASE_HOURS
        .iter()
        .enumerate()
        .map(|(i, base_hour)| {
            let jitter = rng.gen_range(-TIME_JITTER_HOURS..TIME_JITTER_HOURS);
            let minutes = ((base_hour + jitter) * 60.0).round() as i64;

            let kind = if i % 2 == 0 {
                TideKind::High
            } else {
                TideKind::Low
            };
            let base_height = match kind {
                TideKind::High => HIGH_WATER_M,
                TideKind::Low => LOW_WATER_M,
            };
            let height = round_tenth(base_height + rng.gen_range(-HEIGHT_JITTER_M..HEIGHT_JITTER_M));

            TideExtremum {
                time: midnight + Duration::minutes(minutes),
                height,
                kind,
            }
        })
        .collect();

    extrema.sort_by_key(|extremum| extremum.time);
    extrema
}

/// Weather source backed by [`synthetic_weather`]. Never fails.
pub struct SyntheticWeather {
    offset: FixedOffset,
}

impl SyntheticWeather {
    pub fn new(offset: FixedOffset) -> Self {
        SyntheticWeather { offset }
    }
}

#[async_trait]
impl WeatherSource for SyntheticWeather {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    fn is_synthetic(&self) -> bool {
        true
    }

    async fn fetch_weather(&self, at: SiteTime) -> Result<WeatherSample, SourceError> {
        Ok(synthetic_weather(at.with_timezone(&self.offset)))
    }

    async fn fetch_weather_range(
        &self,
        from: SiteTime,
        to: SiteTime,
    ) -> Result<Vec<WeatherSample>, SourceError> {
        Ok(synthetic_weather_range(
            from.with_timezone(&self.offset),
            to.with_timezone(&self.offset),
        ))
    }
}

/// Tide source backed by [`synthetic_tide_extrema`]. Never fails.
pub struct SyntheticTides {
    offset: FixedOffset,
}

impl SyntheticTides {
    pub fn new(offset: FixedOffset) -> Self {
        SyntheticTides { offset }
    }
}

#[async_trait]
impl TideSource for SyntheticTides {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    fn is_synthetic(&self) -> bool {
        true
    }

    async fn fetch_tide_extrema(&self, date: NaiveDate) -> Result<Vec<TideExtremum>, SourceError> {
        Ok(synthetic_tide_extrema(date, self.offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn nzst() -> FixedOffset {
        FixedOffset::east_opt(12 * 3600).unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 8, 17).unwrap()
    }

    #[test]
    fn test_weather_is_deterministic_per_hour() {
        let at = site_time(date(), 15, nzst());
        assert_eq!(synthetic_weather(at), synthetic_weather(at));

        let later = nzst().with_ymd_and_hms(2024, 8, 17, 15, 45, 0).unwrap();
        let same_hour = synthetic_weather(later);
        assert_eq!(same_hour.wind_speed, synthetic_weather(at).wind_speed);
        assert_eq!(same_hour.temperature, synthetic_weather(at).temperature);
        assert_eq!(same_hour.timestamp, later);
    }

    #[test]
    fn test_weather_matches_known_values() {
        // seed 5622: raw wind 5.85, direction index 2, temperature 19.1
        let morning = synthetic_weather(site_time(date(), 6, nzst()));
        assert_eq!(morning.wind_speed, 6.0);
        assert_eq!(morning.wind_direction, CompassPoint::E);
        assert_eq!(morning.temperature, 19.0);
        assert_eq!(morning.gust_speed, 13.0);

        // seed 5631: raw wind is negative, so the 3 km/h floor applies
        let afternoon = synthetic_weather(site_time(date(), 15, nzst()));
        assert_eq!(afternoon.wind_speed, 3.0);
        assert_eq!(afternoon.wind_direction, CompassPoint::NW);
        assert_eq!(afternoon.temperature, 23.0);
        assert_eq!(afternoon.gust_speed, 10.0);
    }

    #[test]
    fn test_weather_stays_in_plausible_ranges() {
        for day in 1..=28 {
            let d = NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
            for hour in 0..24 {
                let w = synthetic_weather(site_time(d, hour, nzst()));
                assert!(w.wind_speed >= 3.0 && w.wind_speed <= 40.0, "{w:?}");
                assert!(w.gust_speed >= w.wind_speed + 3.0, "{w:?}");
                assert!(w.gust_speed <= w.wind_speed + 9.0, "{w:?}");
                assert!((3.0..=33.0).contains(&w.temperature), "{w:?}");
                assert!(CompassPoint::PRINCIPAL.contains(&w.wind_direction));
                assert_eq!(w.wind_speed.fract(), 0.0);
            }
        }
    }

    #[test]
    fn test_weather_range_is_hourly_and_inclusive() {
        let from = nzst().with_ymd_and_hms(2024, 8, 17, 5, 30, 0).unwrap();
        let to = nzst().with_ymd_and_hms(2024, 8, 17, 22, 0, 0).unwrap();
        let samples = synthetic_weather_range(from, to);
        assert_eq!(samples.len(), 17);
        assert_eq!(samples[0].timestamp, site_time(date(), 6, nzst()));
        assert_eq!(samples[16].timestamp, to);
        for pair in samples.windows(2) {
            assert_eq!(pair[1].timestamp - pair[0].timestamp, Duration::hours(1));
        }
    }

    #[test]
    fn test_tide_extrema_shape() {
        let extrema = synthetic_tide_extrema(date(), nzst());
        assert_eq!(extrema.len(), 4);

        for pair in extrema.windows(2) {
            assert!(pair[0].time < pair[1].time);
            assert_ne!(pair[0].kind, pair[1].kind);
        }

        for (extremum, base) in extrema.iter().zip(TIDE_BASE_HOURS) {
            assert_eq!(extremum.time.date_naive(), date());
            let hours = extremum.time.hour() as f64 + extremum.time.minute() as f64 / 60.0;
            assert!((hours - base).abs() <= 1.0, "{extremum:?}");
            match extremum.kind {
                TideKind::High => assert!((1.3..=1.7).contains(&extremum.height)),
                TideKind::Low => assert!((0.0..=0.4).contains(&extremum.height)),
            }
        }
    }

    #[test]
    fn test_tide_extrema_are_reproducible_per_date() {
        let first = synthetic_tide_extrema(date(), nzst());
        let second = synthetic_tide_extrema(date(), nzst());
        assert_eq!(first, second);
        let next_day = synthetic_tide_extrema(date().succ_opt().unwrap(), nzst());
        assert_ne!(first, next_day);
    }

    #[tokio::test]
    async fn test_sources_never_fail() {
        let weather = SyntheticWeather::new(nzst());
        let tides = SyntheticTides::new(nzst());
        let at = site_time(date(), 9, nzst());
        assert!(weather.fetch_weather(at).await.is_ok());
        assert!(!weather
            .fetch_weather_range(at, at + Duration::hours(3))
            .await
            .unwrap()
            .is_empty());
        assert_eq!(tides.fetch_tide_extrema(date()).await.unwrap().len(), 4);
        assert!(weather.is_synthetic() && tides.is_synthetic());
    }
}
