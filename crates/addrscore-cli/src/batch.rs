//! Batch matching: one pipeline run per input line.
//!
//! Lines run with bounded concurrency and come back in input order. A
//! failing line never aborts the batch; its error is reported in the
//! line's own record.

use addrscore_core::{Geocoder, MatchError, MatchOutcome, MatchPipeline};
use futures::stream::{self, StreamExt};
use serde::Serialize;

use crate::retry::retry_with_backoff;

#[derive(Debug, Clone, Copy)]
pub(crate) struct BatchOptions {
    pub(crate) concurrency: usize,
    pub(crate) max_retries: u32,
    pub(crate) backoff_base_ms: u64,
}

/// One output line.
#[derive(Debug, Serialize)]
pub(crate) struct BatchRecord {
    /// 1-based line number in the input file.
    pub(crate) line: usize,
    pub(crate) input: String,
    #[serde(flatten)]
    pub(crate) status: BatchStatus,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub(crate) enum BatchStatus {
    Matched {
        matched_address: String,
        match_score: f64,
        rank: usize,
    },
    NoCandidate {
        matched_address: String,
        match_score: f64,
    },
    GeocoderError {
        error: String,
        retryable: bool,
    },
    InvalidInput {
        error: String,
    },
}

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct BatchSummary {
    pub(crate) matched: usize,
    pub(crate) no_candidate: usize,
    pub(crate) geocoder_error: usize,
    pub(crate) invalid_input: usize,
}

impl BatchSummary {
    pub(crate) fn from_records(records: &[BatchRecord]) -> Self {
        let mut summary = Self::default();
        for record in records {
            match record.status {
                BatchStatus::Matched { .. } => summary.matched += 1,
                BatchStatus::NoCandidate { .. } => summary.no_candidate += 1,
                BatchStatus::GeocoderError { .. } => summary.geocoder_error += 1,
                BatchStatus::InvalidInput { .. } => summary.invalid_input += 1,
            }
        }
        summary
    }
}

/// Runs the pipeline over `lines`, retrying transient geocoder failures.
pub(crate) async fn run_batch<G: Geocoder>(
    pipeline: &MatchPipeline<G>,
    lines: &[String],
    options: BatchOptions,
) -> Vec<BatchRecord> {
    stream::iter(lines.iter().enumerate().map(|(idx, input)| async move {
        let result = retry_with_backoff(options.max_retries, options.backoff_base_ms, || {
            pipeline.evaluate(input)
        })
        .await;
        BatchRecord {
            line: idx + 1,
            input: input.clone(),
            status: to_status(result),
        }
    }))
    .buffered(options.concurrency.max(1))
    .collect::<Vec<_>>()
    .await
}

fn to_status(result: Result<MatchOutcome, MatchError>) -> BatchStatus {
    match result {
        Ok(MatchOutcome::Matched { result, rank, .. }) => BatchStatus::Matched {
            matched_address: result.matched_address,
            match_score: result.match_score,
            rank,
        },
        Ok(MatchOutcome::NoCandidate) => {
            let empty = MatchOutcome::NoCandidate.into_result();
            BatchStatus::NoCandidate {
                matched_address: empty.matched_address,
                match_score: empty.match_score,
            }
        }
        Err(MatchError::InvalidInput(reason)) => BatchStatus::InvalidInput { error: reason },
        Err(MatchError::Geocoder(e)) => BatchStatus::GeocoderError {
            retryable: e.is_retryable(),
            error: e.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use addrscore_core::{GeocodeCandidate, GeocoderError};

    use super::*;

    /// Fails the first `failures` calls with a timeout, then answers from
    /// a fixed table keyed by query.
    struct FlakyGeocoder {
        failures: usize,
        calls: AtomicUsize,
    }

    impl Geocoder for FlakyGeocoder {
        async fn forward(&self, query: &str) -> Result<Vec<GeocodeCandidate>, GeocoderError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err(GeocoderError::Timeout { timeout_ms: 1 });
            }
            if query.starts_with("Unauthorized") {
                return Err(GeocoderError::Unauthorized { status: 401 });
            }
            Ok(match query {
                "Parijs, Frankrijk" => vec![GeocodeCandidate::new("Paris, France", 0)],
                _ => Vec::new(),
            })
        }
    }

    fn options() -> BatchOptions {
        BatchOptions {
            concurrency: 2,
            max_retries: 2,
            backoff_base_ms: 0,
        }
    }

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    #[tokio::test]
    async fn each_line_gets_a_status_in_input_order() {
        let pipeline = MatchPipeline::new(FlakyGeocoder {
            failures: 0,
            calls: AtomicUsize::new(0),
        });
        let input = lines(&["Parijs, Frankrijk", "", "Atlantis", "Unauthorized street"]);
        let records = run_batch(&pipeline, &input, options()).await;

        assert_eq!(
            records.iter().map(|r| r.line).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
        assert!(matches!(records[0].status, BatchStatus::Matched { rank: 0, .. }));
        assert!(matches!(records[1].status, BatchStatus::InvalidInput { .. }));
        assert!(matches!(records[2].status, BatchStatus::NoCandidate { .. }));
        assert!(matches!(
            records[3].status,
            BatchStatus::GeocoderError {
                retryable: false,
                ..
            }
        ));

        let summary = BatchSummary::from_records(&records);
        assert_eq!(
            summary,
            BatchSummary {
                matched: 1,
                no_candidate: 1,
                geocoder_error: 1,
                invalid_input: 1,
            }
        );
    }

    #[tokio::test]
    async fn transient_failures_are_retried() {
        let pipeline = MatchPipeline::new(FlakyGeocoder {
            failures: 2,
            calls: AtomicUsize::new(0),
        });
        let records = run_batch(
            &pipeline,
            &lines(&["Parijs, Frankrijk"]),
            BatchOptions {
                concurrency: 1,
                ..options()
            },
        )
        .await;
        assert!(matches!(records[0].status, BatchStatus::Matched { .. }));
        assert_eq!(pipeline.geocoder().calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn records_serialize_flat_with_status_tag() {
        let record = BatchRecord {
            line: 3,
            input: "Atlantis".to_owned(),
            status: BatchStatus::NoCandidate {
                matched_address: String::new(),
                match_score: 0.0,
            },
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["status"], "no_candidate");
        assert_eq!(json["line"], 3);
        assert_eq!(json["match_score"], 0.0);
    }
}
