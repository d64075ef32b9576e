//! Candidate selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::score::Scorer;
use crate::types::{GeocodeCandidate, ScoreBreakdown};

/// How the best candidate is chosen from the geocoder's list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionPolicy {
    /// Trust the geocoder's ranking.
    #[default]
    TopRank,
    /// Score every candidate and keep the best; ties keep geocoder order.
    Rescore,
}

impl FromStr for SelectionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top-rank" | "top_rank" | "toprank" => Ok(Self::TopRank),
            "rescore" => Ok(Self::Rescore),
            other => Err(format!("expected `top-rank` or `rescore`, got `{other}`")),
        }
    }
}

impl fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::TopRank => "top-rank",
            Self::Rescore => "rescore",
        })
    }
}

/// First candidate with a non-blank formatted address, in geocoder order.
#[must_use]
pub fn select_best(candidates: &[GeocodeCandidate]) -> Option<&GeocodeCandidate> {
    candidates
        .iter()
        .find(|c| !c.formatted_address.trim().is_empty())
}

/// Selects a candidate under `policy` and scores it against `raw`.
///
/// Returns `None` when no candidate has a usable address.
#[must_use]
pub fn select_and_score<'a>(
    policy: SelectionPolicy,
    raw: &str,
    candidates: &'a [GeocodeCandidate],
    scorer: &Scorer,
) -> Option<(&'a GeocodeCandidate, ScoreBreakdown)> {
    match policy {
        SelectionPolicy::TopRank => {
            let best = select_best(candidates)?;
            Some((best, scorer.score_candidate(raw, best)))
        }
        SelectionPolicy::Rescore => {
            let mut best: Option<(&GeocodeCandidate, ScoreBreakdown)> = None;
            for candidate in candidates
                .iter()
                .filter(|c| !c.formatted_address.trim().is_empty())
            {
                let breakdown = scorer.score_candidate(raw, candidate);
                // Strictly greater: an equal score never displaces an earlier candidate.
                if best.as_ref().is_none_or(|(_, b)| breakdown.score > b.score) {
                    best = Some((candidate, breakdown));
                }
            }
            best
        }
    }
}
