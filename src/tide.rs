//! # Tide Interpolation
//!
//! Tide providers report only the day's high and low water events. This module
//! turns that sparse set into a continuous [`TideState`] for any instant by
//! bracketing the instant between its neighbouring extrema and interpolating
//! linearly:
//!
//! ```text
//! height = h_before + (h_after - h_before) * (t - t_before) / (t_after - t_before)
//! ```
//!
//! ## Edge Policy
//! - **No extrema**: [`TideState::neutral`], which callers must not treat as a
//!   measurement
//! - **Only one side**: hold that extremum's height, slack, next change in 6 h
//! - **Duplicate timestamp at a bracket end**: logged as a [`DataQualityDefect`]
//!   and replaced by a 12-hour sinusoid around 1.0 m

use crate::error::DataQualityDefect;
use crate::{SiteTime, TideDirection, TideExtremum, TideKind, TideState};
use chrono::{Duration, Timelike};
use tracing::{debug, warn};

/// Height change across a bracket below which the water counts as slack (m).
pub const SLACK_THRESHOLD_M: f64 = 0.1;

/// Horizon assumed for the next change when no later extremum is known.
const DEFAULT_NEXT_CHANGE_HOURS: i64 = 6;

/// Mean level and amplitude of the synthetic sinusoid (m).
const SYNTHETIC_MEAN_M: f64 = 1.0;
const SYNTHETIC_AMPLITUDE_M: f64 = 0.8;
/// Synthetic heights above this are classed as high water.
const SYNTHETIC_HIGH_THRESHOLD_M: f64 = 1.2;

/// Derive the tide state at `target` from a day's extrema.
///
/// The extrema may arrive in any order. Never fails: missing or degenerate
/// data produces one of the fallback states described in the module docs.
///
/// # Example
/// ```
/// use chrono::{FixedOffset, TimeZone};
/// use paddle_forecast_lib::{tide, TideDirection, TideExtremum, TideKind};
///
/// let nzst = FixedOffset::east_opt(12 * 3600).unwrap();
/// let at = |h| nzst.with_ymd_and_hms(2024, 8, 17, h, 0, 0).unwrap();
/// let extrema = vec![
///     TideExtremum { time: at(6), height: 0.2, kind: TideKind::Low },
///     TideExtremum { time: at(12), height: 1.8, kind: TideKind::High },
/// ];
///
/// let state = tide::interpolate(at(9), &extrema);
/// assert_eq!(state.height, 1.0);
/// assert_eq!(state.direction, TideDirection::Incoming);
/// ```
pub fn interpolate(target: SiteTime, extrema: &[TideExtremum]) -> TideState {
    if extrema.is_empty() {
        warn!(%target, "no tide extrema available, using neutral tide state");
        return TideState::neutral(target);
    }

    let mut sorted = extrema.to_vec();
    sorted.sort_by_key(|extremum| extremum.time);

    let before = sorted.iter().rev().find(|e| e.time <= target);
    let after = sorted.iter().find(|e| e.time > target);

    match (before, after) {
        (Some(before), Some(after)) => {
            if let Some(at) = shared_timestamp(&sorted, before, after) {
                let defect = DataQualityDefect::DuplicateTideTimestamp { at, target };
                warn!(%defect, "synthesizing tide state");
                return diurnal_state(target);
            }
            let mean = mean_height(&sorted);
            interpolate_between(target, before, after, mean)
        }
        (Some(only), None) | (None, Some(only)) => {
            debug!(%target, extremum = %only.time, "tide bracket is one-sided, holding height");
            TideState {
                height: round_tenth(only.height),
                kind: only.kind,
                direction: TideDirection::Slack,
                next_change: target + Duration::hours(DEFAULT_NEXT_CHANGE_HOURS),
                timestamp: target,
            }
        }
        (None, None) => TideState::neutral(target),
    }
}

/// A bracket end whose timestamp another extremum also claims.
fn shared_timestamp(
    sorted: &[TideExtremum],
    before: &TideExtremum,
    after: &TideExtremum,
) -> Option<SiteTime> {
    [before.time, after.time]
        .into_iter()
        .find(|&time| sorted.iter().filter(|e| e.time == time).count() > 1)
}

/// Interpolate within one bracket; `before.time < after.time`.
///
/// `mean` is the mean height of the whole extrema set and decides whether the
/// result is classed high or low.
fn interpolate_between(
    target: SiteTime,
    before: &TideExtremum,
    after: &TideExtremum,
    mean: f64,
) -> TideState {
    let span_ms = (after.time - before.time).num_milliseconds().max(1);
    let elapsed_ms = (target - before.time).num_milliseconds();
    let ratio = (elapsed_ms as f64 / span_ms as f64).clamp(0.0, 1.0);
    let rise = after.height - before.height;
    let height = before.height + rise * ratio;

    let direction = if rise.abs() < SLACK_THRESHOLD_M {
        TideDirection::Slack
    } else if rise > 0.0 {
        TideDirection::Incoming
    } else {
        TideDirection::Outgoing
    };

    let kind = if height > mean {
        TideKind::High
    } else {
        TideKind::Low
    };

    debug!(
        %target,
        height,
        %direction,
        before = before.height,
        after = after.height,
        ratio,
        "interpolated tide"
    );

    TideState {
        height: round_tenth(height),
        kind,
        direction,
        next_change: after.time,
        timestamp: target,
    }
}

/// Sinusoidal stand-in used when the bracket is degenerate.
///
/// Period 12 h, shifted by 3 h, 0.8 m either side of 1.0 m.
pub(crate) fn diurnal_state(target: SiteTime) -> TideState {
    let hour = target.hour() as f64;
    let pattern = ((hour + 3.0) * std::f64::consts::PI / 6.0).sin();
    let height = SYNTHETIC_MEAN_M + pattern * SYNTHETIC_AMPLITUDE_M;

    TideState {
        height: round_tenth(height),
        kind: if height > SYNTHETIC_HIGH_THRESHOLD_M {
            TideKind::High
        } else {
            TideKind::Low
        },
        direction: if pattern > 0.0 {
            TideDirection::Incoming
        } else {
            TideDirection::Outgoing
        },
        next_change: target + Duration::hours(DEFAULT_NEXT_CHANGE_HOURS),
        timestamp: target,
    }
}

fn mean_height(extrema: &[TideExtremum]) -> f64 {
    extrema.iter().map(|e| e.height).sum::<f64>() / extrema.len() as f64
}

/// Round to the nearest 0.1.
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    fn at(hour: u32, minute: u32) -> SiteTime {
        FixedOffset::east_opt(12 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 8, 17, hour, minute, 0)
            .unwrap()
    }

    fn extremum(hour: u32, height: f64, kind: TideKind) -> TideExtremum {
        TideExtremum {
            time: at(hour, 0),
            height,
            kind,
        }
    }

    fn low_then_high() -> Vec<TideExtremum> {
        vec![
            extremum(6, 0.2, TideKind::Low),
            extremum(12, 1.8, TideKind::High),
        ]
    }

    #[test]
    fn test_midpoint_of_rising_tide() {
        let state = interpolate(at(9, 0), &low_then_high());
        assert_eq!(state.height, 1.0);
        assert_eq!(state.direction, TideDirection::Incoming);
        // 1.0 is not above the 1.0 mean
        assert_eq!(state.kind, TideKind::Low);
        assert_eq!(state.next_change, at(12, 0));
        assert_eq!(state.timestamp, at(9, 0));
    }

    #[test]
    fn test_boundaries_are_exact() {
        let extrema = low_then_high();
        assert_eq!(interpolate(at(6, 0), &extrema).height, 0.2);
        assert_eq!(interpolate(at(12, 0), &extrema).height, 1.8);
    }

    #[test]
    fn test_falling_tide_is_outgoing_and_high_above_mean() {
        let extrema = vec![
            extremum(8, 1.6, TideKind::High),
            extremum(14, 0.3, TideKind::Low),
        ];
        let state = interpolate(at(9, 0), &extrema);
        assert_eq!(state.direction, TideDirection::Outgoing);
        assert_eq!(state.kind, TideKind::High);
        assert!(state.height < 1.6 && state.height > 0.3);
    }

    #[test]
    fn test_small_change_is_slack() {
        let extrema = vec![
            extremum(8, 1.00, TideKind::High),
            extremum(14, 1.05, TideKind::Low),
        ];
        assert_eq!(
            interpolate(at(10, 0), &extrema).direction,
            TideDirection::Slack
        );
    }

    #[test]
    fn test_unsorted_input_is_sorted_first() {
        let mut extrema = low_then_high();
        extrema.push(extremum(2, 1.5, TideKind::High));
        extrema.reverse();
        let state = interpolate(at(9, 0), &extrema);
        assert_eq!(state.direction, TideDirection::Incoming);
        assert_eq!(state.next_change, at(12, 0));
        assert_eq!(state.height, 1.0);
    }

    #[test]
    fn test_empty_set_gives_neutral_state() {
        let state = interpolate(at(9, 0), &[]);
        assert_eq!(state, TideState::neutral(at(9, 0)));
    }

    #[test]
    fn test_one_sided_bracket_holds_height() {
        let extrema = low_then_high();

        let early = interpolate(at(3, 0), &extrema);
        assert_eq!(early.height, 0.2);
        assert_eq!(early.kind, TideKind::Low);
        assert_eq!(early.direction, TideDirection::Slack);
        assert_eq!(early.next_change, at(9, 0));

        let late = interpolate(at(20, 0), &extrema);
        assert_eq!(late.height, 1.8);
        assert_eq!(late.direction, TideDirection::Slack);
        assert_eq!(late.next_change, at(20, 0) + Duration::hours(6));
    }

    #[test]
    fn test_monotonic_between_extrema() {
        let extrema = low_then_high();
        let mut previous = f64::NEG_INFINITY;
        for minute in (0..=360).step_by(5) {
            let target = at(6, 0) + Duration::minutes(minute);
            let height = interpolate(target, &extrema).height;
            assert!(height >= previous, "height fell at +{minute}min");
            assert!((0.2..=1.8).contains(&height), "overshoot at +{minute}min");
            previous = height;
        }
    }

    #[test]
    fn test_duplicate_bracket_end_is_synthesized() {
        let extrema = vec![
            extremum(6, 0.2, TideKind::Low),
            extremum(6, 1.8, TideKind::High),
            extremum(12, 0.4, TideKind::Low),
        ];

        let at_six = interpolate(at(6, 0), &extrema);
        assert_eq!(at_six, diurnal_state(at(6, 0)));
        assert_eq!(at_six.height, 0.2);
        assert_eq!(at_six.kind, TideKind::Low);
        assert_eq!(at_six.direction, TideDirection::Outgoing);
        assert_eq!(at_six.next_change, at(12, 0));

        let at_nine = interpolate(at(9, 0), &extrema);
        assert_eq!(at_nine, diurnal_state(at(9, 0)));
        assert_eq!(at_nine.height, 1.0);
        assert_eq!(at_nine.kind, TideKind::Low);

        // either end of the bracket counts; a duplicate elsewhere does not
        let mut later = low_then_high();
        later.push(extremum(12, 1.7, TideKind::High));
        later.push(extremum(18, 0.3, TideKind::Low));
        let before_noon = interpolate(at(9, 0), &later);
        assert_eq!(before_noon, diurnal_state(at(9, 0)));
        let afternoon = interpolate(at(15, 0), &later);
        assert_eq!(afternoon, diurnal_state(at(15, 0)));

        let clean = vec![
            extremum(6, 0.2, TideKind::Low),
            extremum(12, 1.8, TideKind::High),
            extremum(18, 0.3, TideKind::Low),
            extremum(18, 0.3, TideKind::Low),
        ];
        assert_eq!(interpolate(at(9, 0), &clean).height, 1.0);
        assert_eq!(interpolate(at(9, 0), &clean).direction, TideDirection::Incoming);
    }

    #[test]
    fn test_duplicate_timestamps_stay_finite() {
        let extrema = vec![
            extremum(9, 0.4, TideKind::Low),
            extremum(9, 1.6, TideKind::High),
            extremum(9, 0.9, TideKind::Low),
        ];
        for hour in 6..=22 {
            let state = interpolate(at(hour, 0), &extrema);
            assert!(state.height.is_finite());
            assert!((-1.0..=3.0).contains(&state.height));
        }
    }

    #[test]
    fn test_diurnal_state_shape() {
        // sin((3 + 3) * pi / 6) = sin(pi) ~ 0 -> mean level
        let state = diurnal_state(at(3, 0));
        assert_eq!(state.height, 1.0);
        // sin((0 + 3) * pi / 6) = 1 -> crest
        let crest = diurnal_state(at(0, 0));
        assert_eq!(crest.height, 1.8);
        assert_eq!(crest.kind, TideKind::High);
        assert_eq!(crest.direction, TideDirection::Incoming);
        // sin((6 + 3) * pi / 6) = -1 -> trough
        let trough = diurnal_state(at(6, 0));
        assert_eq!(trough.height, 0.2);
        assert_eq!(trough.direction, TideDirection::Outgoing);
    }

    #[test]
    fn test_round_tenth() {
        assert_eq!(round_tenth(1.04), 1.0);
        assert_eq!(round_tenth(1.06), 1.1);
        assert_eq!(round_tenth(-0.26), -0.3);
    }
}
