//! Similarity scoring of a raw address against a geocoder candidate.
//!
//! The score starts from textual similarity of the residual words and is
//! then nudged by structural agreement. Structural evidence is asymmetric:
//! a missing field is neutral, a disagreeing field costs more than an
//! agreeing one earns.

use crate::extract::{parse, ParsedAddress};
use crate::normalize::{normalize, tokens};
use crate::similarity::{soft_jaccard, SimilarityParams};
use crate::types::{Agreement, GeocodeCandidate, ScoreBreakdown, StructuralTokens};
use crate::weights::ScoringWeights;

#[derive(Debug, Clone, Default)]
pub struct Scorer {
    weights: ScoringWeights,
}

impl Scorer {
    #[must_use]
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    #[must_use]
    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Confidence in `[0.0, 1.0]` that `raw` and `candidate` name the same place.
    #[must_use]
    pub fn score(
        &self,
        raw: &str,
        candidate: &str,
        raw_tokens: &StructuralTokens,
        candidate_tokens: &StructuralTokens,
    ) -> f64 {
        self.breakdown(raw, candidate, raw_tokens, candidate_tokens, None)
            .score
    }

    /// Scores a pair and explains how the score came about.
    #[must_use]
    pub fn breakdown(
        &self,
        raw: &str,
        candidate: &str,
        raw_tokens: &StructuralTokens,
        candidate_tokens: &StructuralTokens,
        relevance: Option<f64>,
    ) -> ScoreBreakdown {
        let raw_norm = normalize(raw);
        let candidate_norm = normalize(candidate);
        let textual = self.textual(
            &raw_norm,
            &parse(&raw_norm),
            &candidate_norm,
            &parse(&candidate_norm),
        );
        self.combine(textual, raw_tokens, candidate_tokens, relevance)
    }

    /// Scores a geocoder candidate against the raw input.
    ///
    /// Structural tokens are extracted from both texts; fields the provider
    /// supplied on the candidate take precedence over extraction.
    #[must_use]
    pub fn score_candidate(&self, raw: &str, candidate: &GeocodeCandidate) -> ScoreBreakdown {
        let raw_norm = normalize(raw);
        let raw_parsed = parse(&raw_norm);
        let candidate_norm = normalize(&candidate.formatted_address);
        let candidate_parsed = parse(&candidate_norm);

        let textual = self.textual(&raw_norm, &raw_parsed, &candidate_norm, &candidate_parsed);
        let candidate_tokens = candidate.tokens.clone().or(candidate_parsed.tokens);

        self.combine(
            textual,
            &raw_parsed.tokens,
            &candidate_tokens,
            candidate.relevance,
        )
    }

    fn textual(
        &self,
        raw_norm: &str,
        raw: &ParsedAddress,
        candidate_norm: &str,
        candidate: &ParsedAddress,
    ) -> f64 {
        let params = SimilarityParams {
            match_threshold: self.weights.token_match_threshold,
            common_token_weight: self.weights.common_token_weight,
        };
        if raw.residual.is_empty() || candidate.residual.is_empty() {
            soft_jaccard(&tokens(raw_norm), &tokens(candidate_norm), params)
        } else {
            soft_jaccard(&raw.residual, &candidate.residual, params)
        }
    }

    fn combine(
        &self,
        textual: f64,
        raw_tokens: &StructuralTokens,
        candidate_tokens: &StructuralTokens,
        relevance: Option<f64>,
    ) -> ScoreBreakdown {
        let w = &self.weights;
        let relevance = relevance.filter(|r| r.is_finite());

        let country = agreement(
            raw_tokens.country_code.as_deref(),
            candidate_tokens.country_code.as_deref(),
            |a, b| a.eq_ignore_ascii_case(b),
        );
        let postal_code = agreement(
            raw_tokens.postal_code.as_deref(),
            candidate_tokens.postal_code.as_deref(),
            postal_codes_agree,
        );
        let house_number = agreement(
            raw_tokens.house_number.as_deref(),
            candidate_tokens.house_number.as_deref(),
            |a, b| compact(a) == compact(b),
        );

        let mut adjusted = textual;
        if country == Agreement::Match {
            adjusted += w.country_match_bonus;
        }
        match postal_code {
            Agreement::Match => adjusted += w.postal_match_bonus,
            Agreement::Mismatch => adjusted -= w.postal_mismatch_penalty,
            Agreement::Unknown => {}
        }
        match house_number {
            Agreement::Match => adjusted += w.house_match_bonus,
            Agreement::Mismatch => {
                let floor = textual * w.house_mismatch_floor;
                adjusted = (adjusted - w.house_mismatch_penalty)
                    .max(floor)
                    .min(adjusted);
            }
            Agreement::Unknown => {}
        }

        let mut score = adjusted.clamp(0.0, 1.0);
        if country == Agreement::Mismatch {
            score = score.min(w.country_mismatch_cap);
        }
        if let Some(r) = relevance {
            score *= 1.0 - w.relevance_weight * (1.0 - r.clamp(0.0, 1.0));
        }
        let score = score.clamp(0.0, 1.0);

        tracing::debug!(
            textual,
            ?country,
            ?postal_code,
            ?house_number,
            ?relevance,
            score,
            "scored candidate"
        );

        ScoreBreakdown {
            textual,
            structural: adjusted - textual,
            country,
            postal_code,
            house_number,
            relevance,
            raw_tokens: raw_tokens.clone(),
            candidate_tokens: candidate_tokens.clone(),
            score,
        }
    }
}

fn agreement(a: Option<&str>, b: Option<&str>, same: impl Fn(&str, &str) -> bool) -> Agreement {
    match (a, b) {
        (Some(a), Some(b)) if same(a, b) => Agreement::Match,
        (Some(_), Some(_)) => Agreement::Mismatch,
        _ => Agreement::Unknown,
    }
}

/// Exact after compaction, or a shared five-digit prefix (`20500` vs `20500-0003`).
fn postal_codes_agree(a: &str, b: &str) -> bool {
    let a = compact(a);
    let b = compact(b);
    if a == b {
        return true;
    }
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !all_digits(&a) || !all_digits(&b) {
        return false;
    }
    let (short, long) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };
    short.len() >= 5 && long.starts_with(short.as_str())
}

fn compact(s: &str) -> String {
    s.chars()
        .filter(char::is_ascii_alphanumeric)
        .flat_map(char::to_lowercase)
        .collect()
}
