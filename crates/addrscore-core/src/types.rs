use serde::{Deserialize, Serialize};

/// Weakly extracted structural fields of one address.
///
/// Every field is optional; absence means the extractor (or provider) had
/// nothing confident to say, which is never treated as disagreement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralTokens {
    /// ISO 3166-1 alpha-2, upper case.
    pub country_code: Option<String>,
    /// Lower case, inner spaces removed (`sw1a2aa`, `1012lg`).
    pub postal_code: Option<String>,
    /// Lower case (`12`, `12b`).
    pub house_number: Option<String>,
}

impl StructuralTokens {
    /// Fills each absent field from `fallback`, keeping fields already present.
    #[must_use]
    pub fn or(self, fallback: StructuralTokens) -> Self {
        Self {
            country_code: self.country_code.or(fallback.country_code),
            postal_code: self.postal_code.or(fallback.postal_code),
            house_number: self.house_number.or(fallback.house_number),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.country_code.is_none() && self.postal_code.is_none() && self.house_number.is_none()
    }
}

/// One geocoder result for a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeCandidate {
    /// Canonical formatted address as the provider returns it.
    pub formatted_address: String,
    /// Provider confidence in `[0.0, 1.0]`, when it exposes one.
    pub relevance: Option<f64>,
    /// Zero-based position in the provider's ranking.
    pub rank: usize,
    /// Structural fields the provider returned directly. Fields left `None`
    /// are later extracted from `formatted_address`.
    #[serde(default)]
    pub tokens: StructuralTokens,
}

impl GeocodeCandidate {
    /// Candidate with only an address and rank, as a plain-text provider returns.
    #[must_use]
    pub fn new(formatted_address: impl Into<String>, rank: usize) -> Self {
        Self {
            formatted_address: formatted_address.into(),
            relevance: None,
            rank,
            tokens: StructuralTokens::default(),
        }
    }

    /// Sets the provider confidence, clamped to `[0.0, 1.0]`. A non-finite
    /// value leaves the candidate without one.
    #[must_use]
    pub fn with_relevance(mut self, relevance: f64) -> Self {
        self.relevance = relevance.is_finite().then(|| relevance.clamp(0.0, 1.0));
        self
    }

    #[must_use]
    pub fn with_tokens(mut self, tokens: StructuralTokens) -> Self {
        self.tokens = tokens;
        self
    }
}

/// What the caller stores for a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub matched_address: String,
    /// Confidence in `[0.0, 1.0]` that input and match name the same place.
    pub match_score: f64,
}

impl MatchResult {
    /// The definitional floor for "the geocoder found nothing".
    #[must_use]
    pub fn no_candidate() -> Self {
        Self {
            matched_address: String::new(),
            match_score: 0.0,
        }
    }
}

/// Pairwise comparison of one structural field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Agreement {
    Match,
    Mismatch,
    /// At least one side had nothing to compare.
    Unknown,
}

/// Reviewer-facing decomposition of one score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub textual: f64,
    /// Net additive structural adjustment applied to `textual`.
    pub structural: f64,
    pub country: Agreement,
    pub postal_code: Agreement,
    pub house_number: Agreement,
    pub relevance: Option<f64>,
    pub raw_tokens: StructuralTokens,
    pub candidate_tokens: StructuralTokens,
    pub score: f64,
}

/// Terminal state of one successful pipeline invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MatchOutcome {
    Matched {
        result: MatchResult,
        /// Provider rank of the selected candidate.
        rank: usize,
        breakdown: ScoreBreakdown,
    },
    NoCandidate,
}

impl MatchOutcome {
    /// Collapses the outcome into the `(matched_address, match_score)` pair.
    #[must_use]
    pub fn into_result(self) -> MatchResult {
        match self {
            MatchOutcome::Matched { result, .. } => result,
            MatchOutcome::NoCandidate => MatchResult::no_candidate(),
        }
    }

    #[must_use]
    pub fn is_matched(&self) -> bool {
        matches!(self, MatchOutcome::Matched { .. })
    }
}
