//! # Terminal Rendering
//!
//! Formats assessments and forecasts as plain text for the terminal. Every
//! `render_*` function returns a `String` so output can be tested; the
//! `draw_*` wrappers print it.
//!
//! Data served by a synthetic source is flagged with a leading `⚠ OFFLINE`
//! line so nobody plans a paddle around made-up numbers by accident.

use crate::config::DisplayConfig;
use crate::directions::Recommended;
use crate::forecast::{CurrentAssessment, DailyForecast, ExtendedForecast, HourlyForecast};
use crate::{SiteTime, TideDirection, TideExtremum, TideKind};
use chrono::Timelike;

const OFFLINE_MARKER: &str = "⚠ OFFLINE";

/// How close an hour must be to a high or low water event to be marked.
const TIDE_MARKER_WINDOW_MINUTES: i64 = 30;

/// "02:14 PM"
fn clock_12h(time: SiteTime) -> String {
    time.format("%I:%M %p").to_string()
}

/// "14:00"
fn clock_24h(time: SiteTime) -> String {
    time.format("%H:%M").to_string()
}

fn kind_word(kind: TideKind) -> &'static str {
    match kind {
        TideKind::High => "High",
        TideKind::Low => "Low",
    }
}

/// Arrow and word for the tide trend, e.g. "⬇ Falling".
fn tide_trend(direction: TideDirection) -> &'static str {
    match direction {
        TideDirection::Incoming => "⬆ Rising",
        TideDirection::Outgoing => "⬇ Falling",
        TideDirection::Slack => "➡ Slack",
    }
}

fn tide_arrow(direction: TideDirection) -> &'static str {
    match direction {
        TideDirection::Incoming => "⬆",
        TideDirection::Outgoing => "⬇",
        TideDirection::Slack => "➡",
    }
}

fn direction_label(recommended: Recommended) -> &'static str {
    match recommended {
        Recommended::Both => "Both ✓",
        Recommended::Outgoing => "Outgoing ✓",
        Recommended::Incoming => "Incoming ✓",
        Recommended::Neither => "Avoid ✗",
    }
}

/// The extremum within half an hour of `time`, if any.
fn tide_marker(time: SiteTime, tides: &[TideExtremum]) -> Option<TideKind> {
    tides
        .iter()
        .find(|extremum| {
            (extremum.time - time).num_minutes().abs() <= TIDE_MARKER_WINDOW_MINUTES
        })
        .map(|extremum| extremum.kind)
}

/// "High 02:14 PM (1.6m) • Low 08:30 PM (0.2m)" for the extrema on the
/// forecast's own date.
fn tide_times_summary(forecast: &DailyForecast) -> Option<String> {
    let entries: Vec<String> = forecast
        .tides
        .iter()
        .filter(|extremum| extremum.time.date_naive() == forecast.date)
        .map(|extremum| {
            format!(
                "{} {} ({}m)",
                kind_word(extremum.kind),
                clock_12h(extremum.time),
                extremum.height
            )
        })
        .collect();

    if entries.is_empty() {
        None
    } else {
        Some(entries.join(" • "))
    }
}

fn hourly_row(hour: &HourlyForecast, tides: &[TideExtremum]) -> String {
    let marker = match tide_marker(hour.time, tides) {
        Some(TideKind::High) => "HIGH",
        Some(TideKind::Low) => "LOW",
        None => "",
    };
    format!(
        "{:<5} {:<4}  {:<11} {:>3}km/h {:<3}  {:>4}m {}  {:>3}°C",
        clock_24h(hour.time),
        marker,
        direction_label(hour.directions.recommended),
        hour.weather.wind_speed,
        hour.weather.wind_direction,
        hour.tide.height,
        tide_arrow(hour.tide.direction),
        hour.weather.temperature
    )
}

/// Current conditions block.
pub fn render_current(current: &CurrentAssessment) -> String {
    let conditions = &current.conditions;
    let difficulty = &current.difficulty;
    let mut lines = Vec::new();

    if conditions.offline {
        lines.push(OFFLINE_MARKER.to_string());
        lines.push(String::new());
    }

    lines.push(format!("📍 {}", conditions.location));
    lines.push(format!(
        "Difficulty:  {} ({}/10)",
        difficulty.level.to_string().to_uppercase(),
        difficulty.score
    ));
    lines.push(format!(
        "Tide:        {} ({}m) {}",
        kind_word(conditions.tide.kind),
        conditions.tide.height,
        tide_trend(conditions.tide.direction)
    ));
    lines.push(format!(
        "Wind:        {} km/h {} ({}°)",
        conditions.weather.wind_speed,
        conditions.weather.wind_direction,
        conditions.weather.wind_direction.degrees()
    ));
    lines.push(format!("Gusts:       {} km/h", conditions.weather.gust_speed));
    lines.push(format!("Temperature: {}°C", conditions.weather.temperature));
    lines.push(format!("Time:        {}", clock_12h(conditions.time_of_day)));
    lines.push(String::new());
    lines.push(difficulty.recommendation.clone());
    lines.push(String::new());
    lines.push(format!(
        "Direction:   {}",
        direction_label(current.directions.recommended)
    ));
    lines.push(current.directions.reasoning.clone());

    lines.join("\n")
}

/// One day: summary, tide times and the hourly table for the display hours.
pub fn render_daily(forecast: &DailyForecast, title: &str, display: &DisplayConfig) -> String {
    let summary = &forecast.summary;
    let mut lines = Vec::new();

    if forecast.offline {
        lines.push(OFFLINE_MARKER.to_string());
    }

    lines.push(format!("== {} ({}) ==", title, forecast.date.format("%a %d %b")));
    lines.push(format!("Best Time:      {}", clock_12h(summary.best_time)));
    lines.push(format!("Worst Time:     {}", clock_12h(summary.worst_time)));
    lines.push(format!("Avg Difficulty: {}/10", summary.average_difficulty));

    if let Some(tides) = tide_times_summary(forecast) {
        lines.push(format!("🌊 Tide Times:  {tides}"));
    }
    lines.push(summary.conditions.clone());
    lines.push(String::new());
    lines.push(format!(
        "{:<5} {:<4}  {:<11} {:<13}  {:<8}  {:>5}",
        "Time", "", "Paddle", "Wind", "Tide", "Temp"
    ));

    lines.extend(
        forecast
            .hourly
            .iter()
            .filter(|hour| (display.first_hour..=display.last_hour).contains(&hour.time.hour()))
            .map(|hour| hourly_row(hour, &forecast.tides)),
    );

    lines.join("\n")
}

pub fn render_extended(forecast: &ExtendedForecast, display: &DisplayConfig) -> String {
    format!(
        "{}\n\n{}",
        render_daily(&forecast.today, "Today", display),
        render_daily(&forecast.tomorrow, "Tomorrow", display)
    )
}

/// Print current conditions to stdout.
pub fn draw_current(current: &CurrentAssessment) {
    println!("{}", render_current(current));
}

/// Print one day to stdout.
pub fn draw_daily(forecast: &DailyForecast, title: &str, display: &DisplayConfig) {
    println!("{}", render_daily(forecast, title, display));
}

/// Print today and tomorrow to stdout.
pub fn draw_extended(forecast: &ExtendedForecast, display: &DisplayConfig) {
    println!("{}", render_extended(forecast, display));
}
