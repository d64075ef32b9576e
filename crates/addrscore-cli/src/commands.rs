//! Subcommand handlers.

use std::path::Path;

use addrscore_core::eval::{evaluate, parse_labeled_jsonl};
use addrscore_core::{
    load_weights, normalize, parse, tokens, AppConfig, GeocodeCandidate, MatchError,
    MatchPipeline, Scorer, ScoringWeights,
};
use addrscore_mapbox::MapboxClient;
use anyhow::Context;
use serde::Serialize;

use crate::batch::{run_batch, BatchOptions, BatchSummary};

const BATCH_BACKOFF_BASE_MS: u64 = 500;

fn build_pipeline(config: &AppConfig) -> anyhow::Result<MatchPipeline<MapboxClient>> {
    let client = MapboxClient::from_config(config).context("failed to build Mapbox client")?;
    let weights = config.scoring_weights()?;
    Ok(MatchPipeline::new(client)
        .with_scorer(Scorer::new(weights))
        .with_policy(config.selection_policy)
        .with_timeout(config.geocoder_timeout()))
}

fn scorer_from(weights_path: Option<&Path>) -> anyhow::Result<Scorer> {
    let weights = match weights_path {
        Some(path) => load_weights(path)?,
        None => ScoringWeights::default(),
    };
    Ok(Scorer::new(weights))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) async fn run_match(config: &AppConfig, address: &str, explain: bool) -> anyhow::Result<()> {
    let pipeline = build_pipeline(config)?;
    let outcome = match pipeline.evaluate(address).await {
        Ok(outcome) => outcome,
        Err(e @ MatchError::Geocoder(_)) => {
            return Err(anyhow::Error::new(e).context("could not evaluate this address right now"));
        }
        Err(e) => return Err(e.into()),
    };

    if explain {
        print_json(&outcome)
    } else {
        print_json(&outcome.into_result())
    }
}

pub(crate) async fn run_batch_file(
    config: &AppConfig,
    input: &Path,
    concurrency: usize,
    max_retries: u32,
) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let lines: Vec<String> = text.lines().map(str::to_owned).collect();

    let pipeline = build_pipeline(config)?;
    tracing::info!(
        lines = lines.len(),
        concurrency,
        max_retries,
        policy = %config.selection_policy,
        "starting batch"
    );

    let options = BatchOptions {
        concurrency,
        max_retries,
        backoff_base_ms: BATCH_BACKOFF_BASE_MS,
    };
    let records = run_batch(&pipeline, &lines, options).await;
    for record in &records {
        println!("{}", serde_json::to_string(record)?);
    }

    let summary = BatchSummary::from_records(&records);
    tracing::info!(
        matched = summary.matched,
        no_candidate = summary.no_candidate,
        geocoder_error = summary.geocoder_error,
        invalid_input = summary.invalid_input,
        "batch complete"
    );
    Ok(())
}

pub(crate) fn run_score(raw: &str, candidate: &str, weights_path: Option<&Path>) -> anyhow::Result<()> {
    let scorer = scorer_from(weights_path)?;
    let breakdown = scorer.score_candidate(raw, &GeocodeCandidate::new(candidate, 0));
    print_json(&breakdown)
}

#[derive(Serialize)]
struct NormalizeOutput<'a> {
    normalized: &'a str,
    tokens: Vec<&'a str>,
    structural: addrscore_core::StructuralTokens,
    residual: Vec<String>,
}

pub(crate) fn run_normalize(text: &str) -> anyhow::Result<()> {
    let normalized = normalize(text);
    let parsed = parse(&normalized);
    print_json(&NormalizeOutput {
        normalized: &normalized,
        tokens: tokens(&normalized),
        structural: parsed.tokens,
        residual: parsed.residual,
    })
}

pub(crate) fn run_eval(
    labels: &Path,
    threshold: f64,
    weights_path: Option<&Path>,
) -> anyhow::Result<()> {
    anyhow::ensure!(
        (0.0..=1.0).contains(&threshold),
        "threshold must be within [0.0, 1.0], got {threshold}"
    );
    let text = std::fs::read_to_string(labels)
        .with_context(|| format!("failed to read {}", labels.display()))?;
    let pairs = parse_labeled_jsonl(&text)
        .with_context(|| format!("invalid labelled set {}", labels.display()))?;
    let scorer = scorer_from(weights_path)?;
    let report = evaluate(&pairs, &scorer, threshold)?;
    print_json(&report)
}
