//! # Difficulty Scoring
//!
//! Scores one leg of the route against one set of conditions. Four independent
//! factors, each clamped to 1–5, are summed (4–20) and normalized to a 0–10
//! score:
//!
//! | Factor | Inputs |
//! |---|---|
//! | wind | sustained speed, gust spread, direction relative to the leg |
//! | tide | height band, high/low, flow relative to the leg |
//! | time | local hour, favoring late afternoon |
//! | temperature | air temperature, favoring 20–26 °C |
//!
//! Higher is easier: 7 and up is `easy`, 4–6 `moderate`, below 4 `difficult`.
//! The recommendation text is a deterministic function of the same inputs.

use crate::config::{RouteProfile, WindRelation};
use crate::{Leg, SiteTime, TideKind, TideState, WeatherSample};
use chrono::Timelike;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const FACTOR_MIN: f64 = 1.0;
pub const FACTOR_MAX: f64 = 5.0;
/// Sum of four factors at their maximum.
const FACTOR_SUM_MAX: f64 = 4.0 * FACTOR_MAX;

/// Qualitative band of a 0–10 score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    Easy,
    Moderate,
    Difficult,
}

impl DifficultyLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            7.. => DifficultyLevel::Easy,
            4..=6 => DifficultyLevel::Moderate,
            _ => DifficultyLevel::Difficult,
        }
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DifficultyLevel::Easy => f.write_str("easy"),
            DifficultyLevel::Moderate => f.write_str("moderate"),
            DifficultyLevel::Difficult => f.write_str("difficult"),
        }
    }
}

/// The four sub-scores, each in 1–5.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Factors {
    pub wind: f64,
    pub tide: f64,
    pub time: f64,
    pub temperature: f64,
}

impl Factors {
    pub fn sum(&self) -> f64 {
        self.wind + self.tide + self.time + self.temperature
    }

    /// Normalize the factor sum onto 0–10.
    pub fn score(&self) -> u8 {
        let normalized = (self.sum() / FACTOR_SUM_MAX * 10.0).round();
        if normalized.is_nan() {
            return 0;
        }
        normalized.clamp(0.0, 10.0) as u8
    }
}

/// Result of scoring one leg.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DifficultyAssessment {
    /// 0 (avoid) to 10 (ideal)
    pub score: u8,
    pub level: DifficultyLevel,
    pub factors: Factors,
    pub recommendation: String,
}

fn clamp_factor(value: f64) -> f64 {
    if value.is_nan() {
        FACTOR_MIN
    } else {
        value.clamp(FACTOR_MIN, FACTOR_MAX)
    }
}

/// Wind factor for one leg.
///
/// Base 3/2/1 for sustained wind up to 10, up to 20, or above 20 km/h; +2 for
/// gusts within 5 km/h of the sustained wind, +1 within 15; +2 tailwind, −1
/// headwind, +1 crosswind.
pub fn wind_factor(weather: &WeatherSample, leg: Leg, route: &RouteProfile) -> f64 {
    let mut score: f64 = if weather.wind_speed <= 10.0 {
        3.0
    } else if weather.wind_speed <= 20.0 {
        2.0
    } else {
        1.0
    };

    let spread = weather.gust_spread();
    if spread <= 5.0 {
        score += 2.0;
    } else if spread <= 15.0 {
        score += 1.0;
    }

    score += match route.leg(leg).wind_relation(weather.wind_direction) {
        WindRelation::Tailwind => 2.0,
        WindRelation::Headwind => -1.0,
        WindRelation::Crosswind => 1.0,
        WindRelation::Neutral => 0.0,
    };

    clamp_factor(score)
}

/// Tide factor for one leg.
///
/// Deeper water and high tide help launching and landing; flow along the leg
/// helps most, slack a little, flow against it not at all.
pub fn tide_factor(tide: &TideState, leg: Leg) -> f64 {
    let mut score = if tide.height >= 1.5 {
        2.0
    } else if tide.height >= 1.0 {
        1.5
    } else if tide.height >= 0.5 {
        1.0
    } else {
        0.5
    };

    if tide.kind == TideKind::High {
        score += 0.5;
    }

    score += if tide.direction == leg.assisting_tide() {
        2.0
    } else if tide.direction == crate::TideDirection::Slack {
        1.0
    } else {
        0.0
    };

    clamp_factor(score)
}

/// Time-of-day factor from the local hour.
pub fn time_factor(at: SiteTime) -> f64 {
    match at.hour() {
        16..=19 => 5.0,
        15 | 20 => 4.0,
        14 | 21 => 3.0,
        10..=13 | 22 => 2.0,
        _ => 1.0,
    }
}

/// Temperature factor in °C.
pub fn temperature_factor(celsius: f64) -> f64 {
    let within = |low: f64, high: f64| (low..=high).contains(&celsius);
    if within(20.0, 26.0) {
        5.0
    } else if within(18.0, 28.0) {
        4.0
    } else if within(15.0, 30.0) {
        3.0
    } else if within(12.0, 32.0) {
        2.0
    } else {
        1.0
    }
}

/// Score one leg.
pub fn assess(
    weather: &WeatherSample,
    tide: &TideState,
    at: SiteTime,
    leg: Leg,
    route: &RouteProfile,
) -> DifficultyAssessment {
    let factors = Factors {
        wind: wind_factor(weather, leg, route),
        tide: tide_factor(tide, leg),
        time: time_factor(at),
        temperature: clamp_factor(temperature_factor(weather.temperature)),
    };
    let score = factors.score();
    let level = DifficultyLevel::from_score(score);
    let recommendation = recommendation(weather, tide, leg, route, level, &factors);

    DifficultyAssessment {
        score,
        level,
        factors,
        recommendation,
    }
}

/// "towards Bucklands Beach" or "back to Ian Shaw Park".
pub fn leg_phrase(leg: Leg, route: &RouteProfile) -> String {
    let destination = &route.leg(leg).destination;
    match leg {
        Leg::Outgoing => format!("towards {destination}"),
        Leg::Incoming => format!("back to {destination}"),
    }
}

fn recommendation(
    weather: &WeatherSample,
    tide: &TideState,
    leg: Leg,
    route: &RouteProfile,
    level: DifficultyLevel,
    factors: &Factors,
) -> String {
    let heading = leg_phrase(leg, route);
    let relation = route.leg(leg).wind_relation(weather.wind_direction);
    let wind = weather.wind_direction;
    let mut sentences = Vec::with_capacity(3);

    match level {
        DifficultyLevel::Easy => {
            sentences.push(format!("Perfect conditions for paddling {heading}!"));
            if factors.wind >= 4.0 {
                let help = if relation == WindRelation::Tailwind {
                    "tailwind"
                } else {
                    "favorable wind"
                };
                sentences.push(format!("{wind} winds provide a {help}."));
            }
            if factors.tide >= 4.0 {
                if tide.direction == leg.assisting_tide() {
                    sentences.push(format!(
                        "{} tide assists your paddle {heading}.",
                        tide.direction
                    ));
                } else {
                    sentences.push(format!("Good tide conditions with {}m depth.", tide.height));
                }
            }
        }
        DifficultyLevel::Moderate => {
            sentences.push(format!("Moderate conditions for paddling {heading}."));
            if factors.wind < 3.0 {
                let challenge = if relation == WindRelation::Headwind {
                    "headwind"
                } else {
                    "challenging wind"
                };
                sentences.push(format!("{wind} winds create a {challenge}."));
            }
            if factors.tide < 3.0 && tide.direction == leg.opposite().assisting_tide() {
                sentences.push(format!(
                    "{} tide works against your paddle {heading}.",
                    tide.direction
                ));
            }
        }
        DifficultyLevel::Difficult => {
            sentences.push(format!(
                "Challenging conditions for paddling {heading} - consider avoiding."
            ));
            if factors.wind < 2.0 {
                sentences.push(format!(
                    "Strong {wind} winds ({}km/h) with gusts to {}km/h make paddling difficult.",
                    weather.wind_speed, weather.gust_speed
                ));
            }
            if factors.tide < 2.0 {
                sentences.push(format!("Tide conditions are poor for paddling {heading}."));
            }
        }
    }

    sentences.join(" ")
}
