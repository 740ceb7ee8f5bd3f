//! # OpenWeatherMap Weather Source
//!
//! Fetches current observations and the 3-hourly forecast for the site from
//! the OpenWeatherMap 2.5 API.
//!
//! ## Endpoints
//! - `GET {base}/weather?lat=..&lon=..&appid=..&units=metric` for now
//! - `GET {base}/forecast?lat=..&lon=..&appid=..&units=metric` for ranges
//!
//! ## Unit Conversion
//! The API reports metres per second; everything downstream works in km/h:
//! - **Wind**: `round(speed × 3.6)`
//! - **Gusts**: `round(gust × 3.6)`, or `round(speed × 3.6 × 1.3)` when the
//!   payload omits gusts
//! - **Temperature**: rounded to whole °C
//! - **Direction**: meteorological degrees snapped to the 16-point compass
//! - **Time**: `dt` unix seconds, shown in the site's UTC offset
//!
//! ## Failure Modes
//! | Condition | Error |
//! |-----------|-------|
//! | No API key configured | `ConfigurationMissing` |
//! | Transport error, timeout, non-2xx status | `Http` |
//! | Body is not the expected JSON | `Decode` |
//! | Observation timestamp out of range | `SourceUnavailable` |
//! | Forecast list has nothing in range | `EmptyData` |

use crate::config::{ProviderConfig, SiteConfig, OPENWEATHER_KEY_VAR};
use crate::error::SourceError;
use crate::sources::WeatherSource;
use crate::{CompassPoint, SiteTime, WeatherSample};
use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset};
use serde::Deserialize;
use tracing::debug;

const SOURCE_NAME: &str = "openweathermap";

/// Ratio applied to sustained wind when the payload has no gust figure.
const GUST_ESTIMATE_RATIO: f64 = 1.3;
const MS_TO_KMH: f64 = 3.6;
/// Forecast resolution; range queries keep one step of margin on each side.
const FORECAST_STEP_HOURS: i64 = 3;

#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct WindBlock {
    speed: f64,
    #[serde(default)]
    deg: f64,
    gust: Option<f64>,
}

/// One observation, either the whole `/weather` body or an item of `/forecast`.
#[derive(Debug, Deserialize)]
struct Observation {
    main: MainBlock,
    wind: WindBlock,
    dt: i64,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    list: Vec<Observation>,
}

/// Live weather from OpenWeatherMap.
pub struct OpenWeatherMap {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    latitude: f64,
    longitude: f64,
    offset: FixedOffset,
}

impl OpenWeatherMap {
    pub fn new(client: reqwest::Client, provider: &ProviderConfig, site: &SiteConfig) -> Self {
        OpenWeatherMap {
            client,
            base_url: provider.base_url.trim_end_matches('/').to_string(),
            api_key: provider.api_key.clone(),
            latitude: site.latitude,
            longitude: site.longitude,
            offset: site.offset(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn query(&self, api_key: &str) -> Vec<(&'static str, String)> {
        vec![
            ("lat", self.latitude.to_string()),
            ("lon", self.longitude.to_string()),
            ("appid", api_key.to_string()),
            ("units", "metric".to_string()),
        ]
    }

    fn api_key(&self) -> Result<&str, SourceError> {
        self.api_key
            .as_deref()
            .ok_or(SourceError::ConfigurationMissing {
                source_name: SOURCE_NAME,
                key: OPENWEATHER_KEY_VAR,
            })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, SourceError> {
        let api_key = self.api_key()?;
        let url = self.endpoint(path);
        debug!(%url, "requesting weather");

        let body = self
            .client
            .get(&url)
            .query(&self.query(api_key))
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(SourceError::http(SOURCE_NAME))?
            .bytes()
            .await
            .map_err(SourceError::http(SOURCE_NAME))?;

        SourceError::decode_json(SOURCE_NAME, &body)
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherMap {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    /// The latest observation. OpenWeatherMap has no point-in-time lookup on
    /// this tier, so `at` only selects the offset the result is shown in.
    async fn fetch_weather(&self, at: SiteTime) -> Result<WeatherSample, SourceError> {
        let observation: Observation = self.get_json("weather").await?;
        to_sample(&observation, *at.offset()).ok_or_else(|| {
            SourceError::unavailable(SOURCE_NAME, format!("invalid timestamp {}", observation.dt))
        })
    }

    async fn fetch_weather_range(
        &self,
        from: SiteTime,
        to: SiteTime,
    ) -> Result<Vec<WeatherSample>, SourceError> {
        let forecast: ForecastResponse = self.get_json("forecast").await?;
        let samples = samples_in_range(&forecast, from, to, self.offset);
        if samples.is_empty() {
            return Err(SourceError::EmptyData {
                source_name: SOURCE_NAME,
            });
        }
        Ok(samples)
    }
}

fn to_sample(observation: &Observation, offset: FixedOffset) -> Option<WeatherSample> {
    let timestamp = DateTime::from_timestamp(observation.dt, 0)?.with_timezone(&offset);
    let wind = &observation.wind;
    let gust_speed = match wind.gust {
        Some(gust) => (gust * MS_TO_KMH).round(),
        None => (wind.speed * MS_TO_KMH * GUST_ESTIMATE_RATIO).round(),
    };

    Some(WeatherSample {
        wind_speed: (wind.speed * MS_TO_KMH).round(),
        wind_direction: CompassPoint::from_degrees(wind.deg),
        gust_speed,
        temperature: observation.main.temp.round(),
        timestamp,
    })
}

/// Forecast items from one step before `from` to one step after `to`, so the
/// caller can interpolate at both ends.
fn samples_in_range(
    forecast: &ForecastResponse,
    from: SiteTime,
    to: SiteTime,
    offset: FixedOffset,
) -> Vec<WeatherSample> {
    let margin = Duration::hours(FORECAST_STEP_HOURS);
    let mut samples: Vec<WeatherSample> = forecast
        .list
        .iter()
        .filter_map(|item| to_sample(item, offset))
        .filter(|sample| sample.timestamp >= from - margin && sample.timestamp <= to + margin)
        .collect();
    samples.sort_by_key(|sample| sample.timestamp);
    samples
}
