//! # Sample Sources
//!
//! Weather and tide data come from interchangeable sources behind the
//! [`WeatherSource`] and [`TideSource`] traits. A [`WeatherChain`] or
//! [`TideChain`] holds an ordered list of sources and asks each in turn; the
//! first success wins and every failure is logged and skipped. The synthetic
//! generators in [`crate::fallback`] never fail, so a chain built by
//! `from_config` always ends with data.
//!
//! ```text
//! live provider ──fail──▶ synthetic generator
//!      │ ok                      │ ok
//!      ▼                         ▼
//!   Fetched { data, source: "niwa" | "synthetic", synthetic }
//! ```

use crate::config::Config;
use crate::error::SourceError;
use crate::fallback::{SyntheticTides, SyntheticWeather};
use crate::tide_data::NiwaTides;
use crate::weather_data::OpenWeatherMap;
use crate::{SiteTime, TideExtremum, WeatherSample};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::time::Duration;
use tracing::{info, warn};

/// Something that can report weather for the site.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Short identifier used in logs and provenance
    fn name(&self) -> &'static str;

    /// True for generated rather than observed data
    fn is_synthetic(&self) -> bool {
        false
    }

    /// Weather at (or nearest to) one instant.
    async fn fetch_weather(&self, at: SiteTime) -> Result<WeatherSample, SourceError>;

    /// Weather samples covering `from..=to`, at whatever resolution the
    /// source has, ordered by time.
    async fn fetch_weather_range(
        &self,
        from: SiteTime,
        to: SiteTime,
    ) -> Result<Vec<WeatherSample>, SourceError>;
}

/// Something that can report the day's high and low water events.
#[async_trait]
pub trait TideSource: Send + Sync {
    fn name(&self) -> &'static str;

    fn is_synthetic(&self) -> bool {
        false
    }

    /// High and low water events for one local calendar date.
    async fn fetch_tide_extrema(&self, date: NaiveDate) -> Result<Vec<TideExtremum>, SourceError>;
}

/// Data plus the source that produced it.
#[derive(Debug, Clone)]
pub struct Fetched<T> {
    pub data: T,
    pub source: &'static str,
    pub synthetic: bool,
}

/// Ordered weather sources; the first success wins.
pub struct WeatherChain {
    sources: Vec<Box<dyn WeatherSource>>,
}

impl WeatherChain {
    pub fn new(sources: Vec<Box<dyn WeatherSource>>) -> Self {
        WeatherChain { sources }
    }

    /// Live OpenWeatherMap (unless offline) followed by the synthetic generator.
    pub fn from_config(config: &Config) -> Self {
        let mut sources: Vec<Box<dyn WeatherSource>> = Vec::with_capacity(2);
        if !config.sources.offline {
            if let Some(client) = http_client(config) {
                sources.push(Box::new(OpenWeatherMap::new(
                    client,
                    &config.sources.openweathermap,
                    &config.site,
                )));
            }
        }
        sources.push(Box::new(SyntheticWeather::new(config.site.offset())));
        WeatherChain::new(sources)
    }

    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    pub async fn fetch_weather(&self, at: SiteTime) -> Result<Fetched<WeatherSample>, SourceError> {
        let mut last_error = None;
        for source in &self.sources {
            match source.fetch_weather(at).await {
                Ok(data) => {
                    info!(source = source.name(), "current weather fetched");
                    return Ok(Fetched {
                        data,
                        source: source.name(),
                        synthetic: source.is_synthetic(),
                    });
                }
                Err(err) => {
                    warn!(source = source.name(), error = %err, "weather source failed, trying next");
                    last_error = Some(err);
                }
            }
        }
        Err(last_error.unwrap_or(SourceError::EmptyData {
            source_name: "weather chain",
        }))
    }

    pub async fn fetch_weather_range(
        &self,
        from: SiteTime,
        to: SiteTime,
    ) -> Result<Fetched<Vec<WeatherSample>>, SourceError> {
        let mut last_error = None;
        for source in &self.sources {
            let result = match source.fetch_weather_range(from, to).await {
                Ok(samples) if samples.is_empty() => Err(SourceError::EmptyData {
                    source_name: source.name(),
                }),
                other => other,
            };
            match result {
                Ok(data) => {
                    info!(source = source.name(), samples = data.len(), "weather range fetched");
                    return Ok(Fetched {
                        data,
                        source: source.name(),
                        synthetic: source.is_synthetic(),
                    });
                }
                Err(err) => {
                    warn!(source = source.name(), error = %err, "weather source failed, trying next");
                    last_error = Some(err);
                }
            }
        }
        Err(last_error.unwrap_or(SourceError::EmptyData {
            source_name: "weather chain",
        }))
    }
}

/// Ordered tide sources; the first success wins.
pub struct TideChain {
    sources: Vec<Box<dyn TideSource>>,
}

impl TideChain {
    pub fn new(sources: Vec<Box<dyn TideSource>>) -> Self {
        TideChain { sources }
    }

    /// Live NIWA (unless offline) followed by the synthetic generator.
    pub fn from_config(config: &Config) -> Self {
        let mut sources: Vec<Box<dyn TideSource>> = Vec::with_capacity(2);
        if !config.sources.offline {
            if let Some(client) = http_client(config) {
                sources.push(Box::new(NiwaTides::new(
                    client,
                    &config.sources.niwa,
                    &config.site,
                )));
            }
        }
        sources.push(Box::new(SyntheticTides::new(config.site.offset())));
        TideChain::new(sources)
    }

    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    pub async fn fetch_tide_extrema(
        &self,
        date: NaiveDate,
    ) -> Result<Fetched<Vec<TideExtremum>>, SourceError> {
        let mut last_error = None;
        for source in &self.sources {
            let result = match source.fetch_tide_extrema(date).await {
                Ok(extrema) if extrema.is_empty() => Err(SourceError::EmptyData {
                    source_name: source.name(),
                }),
                other => other,
            };
            match result {
                Ok(data) => {
                    info!(source = source.name(), %date, extrema = data.len(), "tide extrema fetched");
                    return Ok(Fetched {
                        data,
                        source: source.name(),
                        synthetic: source.is_synthetic(),
                    });
                }
                Err(err) => {
                    warn!(source = source.name(), %date, error = %err, "tide source failed, trying next");
                    last_error = Some(err);
                }
            }
        }
        Err(last_error.unwrap_or(SourceError::EmptyData {
            source_name: "tide chain",
        }))
    }
}

fn http_client(config: &Config) -> Option<reqwest::Client> {
    match reqwest::Client::builder()
        .timeout(Duration::from_secs(config.sources.timeout_secs))
        .build()
    {
        Ok(client) => Some(client),
        Err(err) => {
            warn!(error = %err, "could not build HTTP client, live sources disabled");
            None
        }
    }
}
