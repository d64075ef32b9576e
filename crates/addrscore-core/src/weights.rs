//! Tunable scoring parameters.
//!
//! Defaults are compiled in; a YAML file can override any subset of fields
//! so the balance between textual and structural evidence can be tuned
//! against a labelled set (see [`crate::eval`]) without a rebuild.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringWeights {
    /// Added when both sides name the same country.
    pub country_match_bonus: f64,
    /// Upper bound on the final score when the countries disagree.
    pub country_mismatch_cap: f64,
    /// Added when both postal codes agree.
    pub postal_match_bonus: f64,
    /// Subtracted when both postal codes are present and differ.
    pub postal_mismatch_penalty: f64,
    /// Added when both house numbers agree.
    pub house_match_bonus: f64,
    /// Subtracted when both house numbers are present and differ.
    pub house_mismatch_penalty: f64,
    /// A house number mismatch never pulls the score below
    /// `textual * house_mismatch_floor`.
    pub house_mismatch_floor: f64,
    /// How strongly a low provider relevance damps the final score.
    pub relevance_weight: f64,
    /// Token pairs less similar than this count as unmatched.
    pub token_match_threshold: f64,
    /// Weight multiplier for common address vocabulary (`street`, `rue`, `de`).
    pub common_token_weight: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            country_match_bonus: 0.10,
            country_mismatch_cap: 0.25,
            postal_match_bonus: 0.15,
            postal_mismatch_penalty: 0.15,
            house_match_bonus: 0.05,
            house_mismatch_penalty: 0.25,
            house_mismatch_floor: 0.60,
            relevance_weight: 0.10,
            token_match_threshold: 0.85,
            common_token_weight: 0.15,
        }
    }
}

impl ScoringWeights {
    /// Checks that every parameter lies in `[0.0, 1.0]`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidWeights`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("country_match_bonus", self.country_match_bonus),
            ("country_mismatch_cap", self.country_mismatch_cap),
            ("postal_match_bonus", self.postal_match_bonus),
            ("postal_mismatch_penalty", self.postal_mismatch_penalty),
            ("house_match_bonus", self.house_match_bonus),
            ("house_mismatch_penalty", self.house_mismatch_penalty),
            ("house_mismatch_floor", self.house_mismatch_floor),
            ("relevance_weight", self.relevance_weight),
            ("token_match_threshold", self.token_match_threshold),
            ("common_token_weight", self.common_token_weight),
        ];
        for (name, value) in fields {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidWeights(format!(
                    "{name} must be within [0.0, 1.0], got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Loads and validates scoring weights from a YAML file.
///
/// Fields missing from the file keep their defaults.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file cannot be read, parsed, or fails
/// validation.
pub fn load_weights(path: &Path) -> Result<ScoringWeights, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::WeightsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let weights: ScoringWeights = serde_yaml::from_str(&content)?;
    weights.validate()?;

    tracing::debug!(path = %path.display(), ?weights, "loaded scoring weights");
    Ok(weights)
}
