//! # Direction Arbitration
//!
//! Scores both legs for the same conditions and decides which way to paddle:
//! `both` when both legs are easy, `neither` when both are difficult, otherwise
//! the leg with the strictly higher score, with ties going to the incoming leg.

use crate::config::{RouteProfile, WindRelation};
use crate::difficulty::{self, DifficultyAssessment, DifficultyLevel};
use crate::{Leg, PaddlingConditions, TideDirection};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which leg, if any, the conditions favor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recommended {
    Outgoing,
    Incoming,
    Both,
    Neither,
}

impl fmt::Display for Recommended {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recommended::Outgoing => f.write_str("outgoing"),
            Recommended::Incoming => f.write_str("incoming"),
            Recommended::Both => f.write_str("both"),
            Recommended::Neither => f.write_str("neither"),
        }
    }
}

/// Both legs scored against the same conditions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaddleDirectionAssessment {
    pub outgoing: DifficultyAssessment,
    pub incoming: DifficultyAssessment,
    pub recommended: Recommended,
    pub reasoning: String,
}

impl PaddleDirectionAssessment {
    pub fn leg(&self, leg: Leg) -> &DifficultyAssessment {
        match leg {
            Leg::Outgoing => &self.outgoing,
            Leg::Incoming => &self.incoming,
        }
    }

    /// The leg with the higher score; outgoing wins a tie.
    pub fn best_leg(&self) -> Leg {
        if self.outgoing.score >= self.incoming.score {
            Leg::Outgoing
        } else {
            Leg::Incoming
        }
    }

    /// Assessment of [`Self::best_leg`].
    pub fn best(&self) -> &DifficultyAssessment {
        self.leg(self.best_leg())
    }
}

/// Apply the decision rule to two leg assessments.
pub fn arbitrate(outgoing: &DifficultyAssessment, incoming: &DifficultyAssessment) -> Recommended {
    use DifficultyLevel::*;
    match (outgoing.level, incoming.level) {
        (Easy, Easy) => Recommended::Both,
        (Difficult, Difficult) => Recommended::Neither,
        _ if outgoing.score > incoming.score => Recommended::Outgoing,
        _ => Recommended::Incoming,
    }
}

/// Score both legs and pick a recommendation.
pub fn assess_paddle_directions(
    conditions: &PaddlingConditions,
    route: &RouteProfile,
) -> PaddleDirectionAssessment {
    let [outgoing, incoming] = Leg::BOTH.map(|leg| {
        difficulty::assess(
            &conditions.weather,
            &conditions.tide,
            conditions.time_of_day,
            leg,
            route,
        )
    });
    let recommended = arbitrate(&outgoing, &incoming);
    let reasoning = reasoning(conditions, route, &outgoing, &incoming, recommended);

    PaddleDirectionAssessment {
        outgoing,
        incoming,
        recommended,
        reasoning,
    }
}

/// The better of the two legs; outgoing wins a tie.
pub fn assess_paddling_difficulty(
    conditions: &PaddlingConditions,
    route: &RouteProfile,
) -> DifficultyAssessment {
    assess_paddle_directions(conditions, route).best().clone()
}

fn reasoning(
    conditions: &PaddlingConditions,
    route: &RouteProfile,
    outgoing: &DifficultyAssessment,
    incoming: &DifficultyAssessment,
    recommended: Recommended,
) -> String {
    let weather = &conditions.weather;
    let tide = &conditions.tide;
    let wind = format!("{} winds ({}km/h)", weather.wind_direction, weather.wind_speed);
    let out_dest = &route.outgoing.destination;
    let in_dest = &route.incoming.destination;

    let wind_reason = if route.outgoing.wind_relation(weather.wind_direction) == WindRelation::Tailwind
    {
        format!("{wind} favor outgoing paddle to {out_dest}")
    } else if route.incoming.wind_relation(weather.wind_direction) == WindRelation::Tailwind {
        format!("{wind} favor incoming paddle to {in_dest}")
    } else {
        format!("{wind} create crosswind conditions")
    };

    let tide_reason = match tide.direction {
        TideDirection::Outgoing => format!(
            "Outgoing tide ({}m) assists paddle toward {out_dest}",
            tide.height
        ),
        TideDirection::Incoming => format!(
            "Incoming tide ({}m) assists return to {in_dest}",
            tide.height
        ),
        TideDirection::Slack => format!("Slack tide ({}m) provides neutral conditions", tide.height),
    };

    let (out, inc) = (outgoing.score, incoming.score);
    let conclusion = match recommended {
        Recommended::Both => format!(
            "Both directions score well (Out: {out}/10, In: {inc}/10) - excellent conditions for round trip"
        ),
        Recommended::Outgoing => {
            format!("Outgoing performs better ({out}/10 vs {inc}/10) - ideal for paddling out")
        }
        Recommended::Incoming => {
            format!("Incoming performs better ({inc}/10 vs {out}/10) - better for returning")
        }
        Recommended::Neither => format!(
            "Both directions challenging (Out: {out}/10, In: {inc}/10) - consider postponing"
        ),
    };

    format!("{wind_reason}. {tide_reason}. {conclusion}.")
}
