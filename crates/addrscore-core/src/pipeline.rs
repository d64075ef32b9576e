//! Match pipeline orchestration.

use std::time::Duration;

use crate::error::{GeocoderError, MatchError};
use crate::geocoder::Geocoder;
use crate::score::Scorer;
use crate::select::{select_and_score, SelectionPolicy};
use crate::types::{MatchOutcome, MatchResult};

/// Default bound on the one geocoder call.
pub const DEFAULT_GEOCODER_TIMEOUT: Duration = Duration::from_secs(5);

/// Raw address in, best canonical match and confidence out.
///
/// Holds no mutable state; one pipeline can serve any number of concurrent
/// calls as long as its geocoder can.
#[derive(Debug)]
pub struct MatchPipeline<G> {
    geocoder: G,
    scorer: Scorer,
    policy: SelectionPolicy,
    timeout: Duration,
}

impl<G: Geocoder> MatchPipeline<G> {
    #[must_use]
    pub fn new(geocoder: G) -> Self {
        Self {
            geocoder,
            scorer: Scorer::default(),
            policy: SelectionPolicy::default(),
            timeout: DEFAULT_GEOCODER_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_scorer(mut self, scorer: Scorer) -> Self {
        self.scorer = scorer;
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: SelectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn geocoder(&self) -> &G {
        &self.geocoder
    }

    #[must_use]
    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    /// Runs the pipeline and keeps the explanation of the result.
    ///
    /// 1. Reject blank input before touching the network.
    /// 2. Send the trimmed raw text to the geocoder, bounded by the timeout.
    /// 3. Select a candidate under the configured policy.
    /// 4. Score it against the raw input.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::InvalidInput`] for blank input and
    /// [`MatchError::Geocoder`] when the geocoder fails or times out. An
    /// empty candidate list is [`MatchOutcome::NoCandidate`], not an error.
    pub async fn evaluate(&self, raw: &str) -> Result<MatchOutcome, MatchError> {
        let query = raw.trim();
        if query.is_empty() {
            return Err(MatchError::InvalidInput(
                "address must not be blank".to_owned(),
            ));
        }

        let candidates = match tokio::time::timeout(self.timeout, self.geocoder.forward(query)).await
        {
            Ok(Ok(candidates)) => candidates,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, retryable = e.is_retryable(), "geocoder call failed");
                return Err(e.into());
            }
            Err(_) => {
                let timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
                tracing::warn!(timeout_ms, "geocoder call timed out");
                return Err(GeocoderError::Timeout { timeout_ms }.into());
            }
        };

        let Some((selected, breakdown)) =
            select_and_score(self.policy, query, &candidates, &self.scorer)
        else {
            tracing::debug!(
                candidates = candidates.len(),
                "no usable candidate returned"
            );
            return Ok(MatchOutcome::NoCandidate);
        };

        tracing::debug!(
            policy = %self.policy,
            rank = selected.rank,
            candidates = candidates.len(),
            score = breakdown.score,
            "selected candidate"
        );

        Ok(MatchOutcome::Matched {
            result: MatchResult {
                matched_address: selected.formatted_address.clone(),
                match_score: breakdown.score,
            },
            rank: selected.rank,
            breakdown,
        })
    }

    /// Resolves `raw` to `(matched_address, match_score)`.
    ///
    /// No candidate yields an empty address with score `0.0`.
    ///
    /// # Errors
    ///
    /// Same as [`MatchPipeline::evaluate`].
    pub async fn match_address(&self, raw: &str) -> Result<MatchResult, MatchError> {
        Ok(self.evaluate(raw).await?.into_result())
    }
}
