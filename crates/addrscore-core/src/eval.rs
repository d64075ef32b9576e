//! Offline evaluation of scoring weights against hand-labelled pairs.
//!
//! Input is JSON lines of `{"raw": ..., "candidate": ..., "label": 0.0..=1.0}`.
//! The report answers two questions: does the score order pairs the way the
//! labels do (Spearman), and does a fixed threshold separate them (accuracy).

use serde::{Deserialize, Serialize};

use crate::error::EvalError;
use crate::score::Scorer;
use crate::types::GeocodeCandidate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledPair {
    pub raw: String,
    pub candidate: String,
    /// Human judgement that both name the same place, in `[0.0, 1.0]`.
    pub label: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvalReport {
    pub count: usize,
    /// `None` when either side has no variance.
    pub spearman: Option<f64>,
    pub mean_absolute_error: f64,
    pub threshold: f64,
    /// Share of pairs where `score >= threshold` agrees with `label >= threshold`.
    pub accuracy: f64,
}

/// Parses labelled pairs from JSON lines, skipping blank lines.
///
/// # Errors
///
/// Returns [`EvalError`] naming the 1-based line of the first bad record.
pub fn parse_labeled_jsonl(text: &str) -> Result<Vec<LabeledPair>, EvalError> {
    let mut pairs = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }
        let pair: LabeledPair =
            serde_json::from_str(line).map_err(|source| EvalError::Parse {
                line: line_no,
                source,
            })?;
        if !(0.0..=1.0).contains(&pair.label) {
            return Err(EvalError::InvalidLabel {
                line: line_no,
                label: pair.label,
            });
        }
        pairs.push(pair);
    }
    Ok(pairs)
}

/// Scores every pair and compares the scores with the labels.
///
/// # Errors
///
/// Returns [`EvalError::Empty`] for an empty set.
pub fn evaluate(
    pairs: &[LabeledPair],
    scorer: &Scorer,
    threshold: f64,
) -> Result<EvalReport, EvalError> {
    if pairs.is_empty() {
        return Err(EvalError::Empty);
    }

    let scores: Vec<f64> = pairs
        .iter()
        .map(|p| {
            scorer
                .score_candidate(&p.raw, &GeocodeCandidate::new(p.candidate.as_str(), 0))
                .score
        })
        .collect();
    let labels: Vec<f64> = pairs.iter().map(|p| p.label).collect();

    #[allow(clippy::cast_precision_loss)]
    let n = pairs.len() as f64;
    let mean_absolute_error = scores
        .iter()
        .zip(&labels)
        .map(|(s, l)| (s - l).abs())
        .sum::<f64>()
        / n;
    #[allow(clippy::cast_precision_loss)]
    let agreeing = scores
        .iter()
        .zip(&labels)
        .filter(|(s, l)| (**s >= threshold) == (**l >= threshold))
        .count() as f64;

    let report = EvalReport {
        count: pairs.len(),
        spearman: spearman(&scores, &labels),
        mean_absolute_error,
        threshold,
        accuracy: agreeing / n,
    };
    tracing::info!(
        count = report.count,
        spearman = ?report.spearman,
        mae = report.mean_absolute_error,
        accuracy = report.accuracy,
        "evaluation complete"
    );
    Ok(report)
}

/// Spearman rank correlation, with tied values sharing their mean rank.
#[must_use]
pub fn spearman(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() != b.len() || a.len() < 2 {
        return None;
    }
    pearson(&ranks(a), &ranks(b))
}

#[allow(clippy::cast_precision_loss)]
fn ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&i, &j| values[i].total_cmp(&values[j]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]].total_cmp(&values[order[start]]).is_eq() {
            end += 1;
        }
        // Positions start..end are tied; ranks are 1-based.
        let mean_rank = (start + end + 1) as f64 / 2.0;
        for &i in &order[start..end] {
            ranks[i] = mean_rank;
        }
        start = end;
    }
    ranks
}

#[allow(clippy::cast_precision_loss)]
fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}
