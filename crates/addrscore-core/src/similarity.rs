//! Tolerant textual similarity over residual word tokens.
//!
//! A weighted soft Jaccard: tokens on each side are paired one-to-one by
//! string similarity, each pair contributes its similarity times the mean of
//! the two token weights, and the total is divided by the weighted union.
//! Common address vocabulary weighs little, so `rue de la` agreeing cannot
//! paper over a different city.

/// Street types, directions, and function words across the languages the
/// country table covers.
const COMMON_TOKENS: &[&str] = &[
    // en
    "street", "st", "road", "rd", "avenue", "ave", "av", "lane", "ln", "drive", "dr",
    "boulevard", "blvd", "place", "pl", "square", "sq", "court", "ct", "way", "terrace",
    "crescent", "close", "highway", "hwy", "north", "south", "east", "west", "n", "s", "e",
    "w", "nw", "ne", "sw", "se", "the", "of", "and", "apt", "suite", "unit", "floor",
    // fr
    "rue", "chemin", "allee", "impasse", "route", "quai", "cours", "de", "du", "des", "la",
    "le", "les", "l", "d", "et",
    // de
    "strasse", "str", "weg", "platz", "gasse", "ring", "damm", "am", "an", "der", "die",
    "das", "im", "in", "und",
    // nl
    "straat", "laan", "plein", "gracht", "kade", "steeg", "singel", "dijk", "het", "van",
    "den",
    // es / pt / it
    "calle", "c", "avenida", "avda", "plaza", "paseo", "camino", "del", "los", "las", "el",
    "y", "rua", "travessa", "praca", "do", "da", "dos", "das", "via", "viale", "piazza",
    "corso", "largo", "vicolo", "di", "della", "dei", "delle", "il", "lo",
];

/// Longer tokens carry more identity, up to this many characters.
const MAX_LENGTH_WEIGHT: usize = 8;

/// Parameters for [`soft_jaccard`].
#[derive(Debug, Clone, Copy)]
pub struct SimilarityParams {
    /// Pairs below this similarity do not match at all.
    pub match_threshold: f64,
    /// Weight multiplier for [`COMMON_TOKENS`].
    pub common_token_weight: f64,
}

/// Weighted soft Jaccard of two token lists, in `[0.0, 1.0]`.
///
/// Empty on either side yields `0.0`. Identical lists yield `1.0`.
#[must_use]
pub fn soft_jaccard<S: AsRef<str>>(a: &[S], b: &[S], params: SimilarityParams) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let weights_a: Vec<f64> = a.iter().map(|t| token_weight(t.as_ref(), params)).collect();
    let weights_b: Vec<f64> = b.iter().map(|t| token_weight(t.as_ref(), params)).collect();

    let mut pairs = Vec::new();
    for (i, x) in a.iter().enumerate() {
        for (j, y) in b.iter().enumerate() {
            let sim = token_similarity(x.as_ref(), y.as_ref());
            if sim >= params.match_threshold {
                pairs.push((sim, i, j));
            }
        }
    }
    // Greedy assignment, best pairs first; index order breaks ties.
    pairs.sort_by(|p, q| {
        q.0.total_cmp(&p.0)
            .then(p.1.cmp(&q.1))
            .then(p.2.cmp(&q.2))
    });

    let mut used_a = vec![false; a.len()];
    let mut used_b = vec![false; b.len()];
    let mut matched = 0.0;
    for (sim, i, j) in pairs {
        if used_a[i] || used_b[j] {
            continue;
        }
        used_a[i] = true;
        used_b[j] = true;
        matched += sim * (weights_a[i] + weights_b[j]) / 2.0;
    }

    let total: f64 = weights_a.iter().sum::<f64>() + weights_b.iter().sum::<f64>();
    let union = total - matched;
    if union <= 0.0 {
        return 0.0;
    }
    (matched / union).clamp(0.0, 1.0)
}

/// Similarity of two single tokens: the better of Jaro-Winkler and bigram Dice.
#[must_use]
pub fn token_similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    strsim::jaro_winkler(a, b).max(bigram_dice(a, b))
}

fn token_weight(token: &str, params: SimilarityParams) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let length = token.chars().count().clamp(1, MAX_LENGTH_WEIGHT) as f64;
    if COMMON_TOKENS.contains(&token) {
        length * params.common_token_weight
    } else {
        length
    }
}

#[allow(clippy::cast_precision_loss)]
fn bigram_dice(a: &str, b: &str) -> f64 {
    let bigrams_a = bigrams(a);
    let mut bigrams_b = bigrams(b);
    if bigrams_a.is_empty() || bigrams_b.is_empty() {
        return 0.0;
    }
    let total = bigrams_a.len() + bigrams_b.len();

    let mut shared = 0usize;
    for gram in &bigrams_a {
        if let Some(pos) = bigrams_b.iter().position(|g| g == gram) {
            bigrams_b.swap_remove(pos);
            shared += 1;
        }
    }

    (2 * shared) as f64 / total as f64
}

fn bigrams(token: &str) -> Vec<(char, char)> {
    let chars: Vec<char> = token.chars().collect();
    chars.windows(2).map(|w| (w[0], w[1])).collect()
}
