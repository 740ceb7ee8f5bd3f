//! # Forecast Aggregation
//!
//! Drives the tide interpolator, the difficulty scorer and the direction
//! arbiter across a fixed hourly grid (06:00 to 22:00 local, inclusive) and
//! rolls the results up into a day summary.
//!
//! [`build_daily_forecast`] is pure: give it the samples and it returns the
//! same forecast every time. [`ConditionsService`] is the async shell around
//! it that pulls samples from the source chains, fetching weather and tides
//! concurrently, and falls back to synthetic data if a chain comes up empty.

use crate::config::{Config, RouteProfile};
use crate::difficulty::{DifficultyAssessment, DifficultyLevel};
use crate::directions::{self, PaddleDirectionAssessment};
use crate::fallback::synthetic_weather;
use crate::sources::{TideChain, WeatherChain};
use crate::{site_time, tide, PaddlingConditions, SiteTime, TideExtremum, TideState, WeatherSample};
use chrono::{Duration, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// First hour of the forecast grid (local).
pub const FIRST_HOUR: u32 = 6;
/// Last hour of the forecast grid (local, inclusive).
pub const LAST_HOUR: u32 = 22;

/// Assessment for one hour of the grid.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HourlyForecast {
    pub time: SiteTime,
    pub weather: WeatherSample,
    pub tide: TideState,
    /// Better of the two legs
    pub difficulty: DifficultyAssessment,
    pub directions: PaddleDirectionAssessment,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DailySummary {
    pub best_time: SiteTime,
    pub worst_time: SiteTime,
    /// Mean hourly score, one decimal place
    pub average_difficulty: f64,
    pub conditions: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub hourly: Vec<HourlyForecast>,
    pub summary: DailySummary,
    /// True if weather or tides came from a synthetic source
    pub offline: bool,
    /// The extrema the tide states were interpolated from
    pub tides: Vec<TideExtremum>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExtendedForecast {
    pub today: DailyForecast,
    pub tomorrow: DailyForecast,
}

/// Current conditions with both legs scored.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CurrentAssessment {
    pub conditions: PaddlingConditions,
    pub difficulty: DifficultyAssessment,
    pub directions: PaddleDirectionAssessment,
}

/// Weather for the instant `at`, derived from samples of any resolution.
///
/// Speeds and temperature are interpolated between the bracketing samples and
/// rounded to whole numbers; direction comes from the nearer sample. Outside
/// the covered range the nearest end sample is held. With no samples at all
/// the synthetic generator fills in.
pub fn weather_at(samples: &[WeatherSample], at: SiteTime) -> WeatherSample {
    let mut sorted = samples.to_vec();
    sorted.sort_by_key(|sample| sample.timestamp);

    let after_index = sorted.partition_point(|sample| sample.timestamp <= at);
    let held = |sample: &WeatherSample| WeatherSample {
        timestamp: at,
        ..sample.clone()
    };

    match (after_index.checked_sub(1).map(|i| &sorted[i]), sorted.get(after_index)) {
        (None, None) => synthetic_weather(at),
        (Some(before), None) => held(before),
        (None, Some(after)) => held(after),
        (Some(before), Some(after)) => {
            let span = (after.timestamp - before.timestamp).num_seconds() as f64;
            let ratio = ((at - before.timestamp).num_seconds() as f64 / span).clamp(0.0, 1.0);
            let lerp = |a: f64, b: f64| (a + (b - a) * ratio).round();

            WeatherSample {
                wind_speed: lerp(before.wind_speed, after.wind_speed),
                wind_direction: if ratio <= 0.5 {
                    before.wind_direction
                } else {
                    after.wind_direction
                },
                gust_speed: lerp(before.gust_speed, after.gust_speed),
                temperature: lerp(before.temperature, after.temperature),
                timestamp: at,
            }
        }
    }
}

/// Assess every hour of the grid on `date` and summarize the day.
pub fn build_daily_forecast(
    date: NaiveDate,
    offset: FixedOffset,
    weather: &[WeatherSample],
    extrema: &[TideExtremum],
    route: &RouteProfile,
    location: &str,
    offline: bool,
) -> DailyForecast {
    let hourly: Vec<HourlyForecast> = (FIRST_HOUR..=LAST_HOUR)
        .map(|hour| {
            let time = site_time(date, hour, offset);
            let conditions = PaddlingConditions {
                weather: weather_at(weather, time),
                tide: tide::interpolate(time, extrema),
                time_of_day: time,
                location: location.to_string(),
                offline,
            };
            let directions = directions::assess_paddle_directions(&conditions, route);
            let difficulty = directions.best().clone();

            HourlyForecast {
                time,
                weather: conditions.weather,
                tide: conditions.tide,
                difficulty,
                directions,
            }
        })
        .collect();

    let summary = summarize(site_time(date, FIRST_HOUR, offset), &hourly);
    DailyForecast {
        date,
        hourly,
        summary,
        offline,
        tides: extrema.to_vec(),
    }
}

/// Best and worst hour (first encountered wins ties), mean score and a
/// one-line verdict from the count of easy versus moderate hours.
pub fn summarize(start: SiteTime, hourly: &[HourlyForecast]) -> DailySummary {
    let mut best: Option<&HourlyForecast> = None;
    let mut worst: Option<&HourlyForecast> = None;
    for hour in hourly {
        if best.map_or(true, |b| hour.difficulty.score > b.difficulty.score) {
            best = Some(hour);
        }
        if worst.map_or(true, |w| hour.difficulty.score < w.difficulty.score) {
            worst = Some(hour);
        }
    }

    let average = if hourly.is_empty() {
        0.0
    } else {
        let total: f64 = hourly.iter().map(|h| h.difficulty.score as f64).sum();
        (total / hourly.len() as f64 * 10.0).round() / 10.0
    };

    let count = |level: DifficultyLevel| {
        hourly
            .iter()
            .filter(|h| h.difficulty.level == level)
            .count()
    };
    let easy = count(DifficultyLevel::Easy);
    let moderate = count(DifficultyLevel::Moderate);
    let conditions = if easy > moderate {
        "Generally good conditions throughout the day"
    } else if moderate > easy {
        "Mixed conditions - timing will be important"
    } else {
        "Challenging conditions expected"
    };

    DailySummary {
        best_time: best.map_or(start, |h| h.time),
        worst_time: worst.map_or(start, |h| h.time),
        average_difficulty: average,
        conditions: conditions.to_string(),
    }
}

/// Fetches samples through the source chains and assembles assessments.
pub struct ConditionsService {
    config: Config,
    weather: WeatherChain,
    tides: TideChain,
}

impl ConditionsService {
    pub fn new(config: Config, weather: WeatherChain, tides: TideChain) -> Self {
        ConditionsService {
            config,
            weather,
            tides,
        }
    }

    /// Chains built from the configured sources.
    pub fn from_config(config: Config) -> Self {
        let weather = WeatherChain::from_config(&config);
        let tides = TideChain::from_config(&config);
        info!(
            weather = ?weather.source_names(),
            tides = ?tides.source_names(),
            "conditions service ready"
        );
        ConditionsService::new(config, weather, tides)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current wall-clock time at the site.
    pub fn now(&self) -> SiteTime {
        Utc::now().with_timezone(&self.config.site.offset())
    }

    pub async fn current_conditions(&self) -> PaddlingConditions {
        self.current_conditions_at(self.now()).await
    }

    /// Weather and tides for `now`, fetched concurrently.
    pub async fn current_conditions_at(&self, now: SiteTime) -> PaddlingConditions {
        let (weather, tides) = tokio::join!(
            self.weather.fetch_weather(now),
            self.tides.fetch_tide_extrema(now.date_naive())
        );

        let mut offline = false;
        let weather = match weather {
            Ok(fetched) => {
                offline |= fetched.synthetic;
                fetched.data
            }
            Err(err) => {
                warn!(error = %err, "no weather source succeeded, using synthetic weather");
                offline = true;
                synthetic_weather(now)
            }
        };
        let extrema = match tides {
            Ok(fetched) => {
                offline |= fetched.synthetic;
                fetched.data
            }
            Err(err) => {
                warn!(error = %err, "no tide source succeeded, using neutral tide");
                offline = true;
                Vec::new()
            }
        };

        PaddlingConditions {
            weather,
            tide: tide::interpolate(now, &extrema),
            time_of_day: now,
            location: self.config.site.name.clone(),
            offline,
        }
    }

    pub async fn current_assessment(&self) -> CurrentAssessment {
        let conditions = self.current_conditions().await;
        self.assess(conditions)
    }

    pub async fn current_assessment_at(&self, now: SiteTime) -> CurrentAssessment {
        let conditions = self.current_conditions_at(now).await;
        self.assess(conditions)
    }

    /// Score both legs of the configured route for `conditions`.
    pub fn assess(&self, conditions: PaddlingConditions) -> CurrentAssessment {
        let route = &self.config.route;
        CurrentAssessment {
            difficulty: directions::assess_paddling_difficulty(&conditions, route),
            directions: directions::assess_paddle_directions(&conditions, route),
            conditions,
        }
    }

    /// Hourly forecast for one local date.
    pub async fn daily_forecast(&self, date: NaiveDate) -> DailyForecast {
        let offset = self.config.site.offset();
        // one hour either side so the end hours interpolate rather than hold
        let from = site_time(date, FIRST_HOUR, offset) - Duration::hours(1);
        let to = site_time(date, LAST_HOUR, offset) + Duration::hours(1);

        let (weather, tides) = tokio::join!(
            self.weather.fetch_weather_range(from, to),
            self.tides.fetch_tide_extrema(date)
        );

        let mut offline = false;
        let samples = match weather {
            Ok(fetched) => {
                offline |= fetched.synthetic;
                fetched.data
            }
            Err(err) => {
                warn!(%date, error = %err, "no weather source succeeded, using synthetic weather");
                offline = true;
                Vec::new()
            }
        };
        let extrema = match tides {
            Ok(fetched) => {
                offline |= fetched.synthetic;
                fetched.data
            }
            Err(err) => {
                warn!(%date, error = %err, "no tide source succeeded, using neutral tide");
                offline = true;
                Vec::new()
            }
        };

        let forecast = build_daily_forecast(
            date,
            offset,
            &samples,
            &extrema,
            &self.config.route,
            &self.config.site.name,
            offline,
        );
        info!(
            %date,
            average = forecast.summary.average_difficulty,
            offline,
            "daily forecast built"
        );
        forecast
    }

    /// Today and tomorrow at the site.
    pub async fn extended_forecast(&self) -> ExtendedForecast {
        self.extended_forecast_from(self.now().date_naive()).await
    }

    pub async fn extended_forecast_from(&self, today: NaiveDate) -> ExtendedForecast {
        let tomorrow = today.succ_opt().unwrap_or(today);
        let (today, tomorrow) =
            tokio::join!(self.daily_forecast(today), self.daily_forecast(tomorrow));
        ExtendedForecast { today, tomorrow }
    }
}
