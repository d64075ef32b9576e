//! Canonical comparable form for address strings.
//!
//! Both the raw input and geocoder candidates pass through [`normalize`]
//! before any comparison, so accents, casing, and separator punctuation never
//! decide a match on their own.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Letters with no canonical decomposition that still have a conventional
/// ASCII spelling. Applied after lower-casing.
const LETTER_FOLDS: &[(char, &str)] = &[
    ('ß', "ss"),
    ('æ', "ae"),
    ('œ', "oe"),
    ('ø', "o"),
    ('ł', "l"),
    ('đ', "d"),
    ('ð', "d"),
    ('þ', "th"),
    ('ı', "i"),
];

/// Normalizes an address string into a comparable form.
///
/// 1. Lower-cases every character (locale-agnostic, per-char mapping).
/// 2. Applies canonical decomposition (NFD) and drops combining marks, so
///    `"Montréal"` and `"Montreal"` compare equal.
/// 3. Folds the few letters without a decomposition (`ß`, `æ`, `ø`, ...).
/// 4. Collapses every run of non-alphanumeric characters (whitespace, commas,
///    periods, hyphens, slashes) into one space and trims the ends.
///
/// Digits and house-number suffixes such as `12b` are kept intact.
/// The function is total and idempotent.
#[must_use]
pub fn normalize(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut pending_space = false;

    let letters = s
        .chars()
        .flat_map(char::to_lowercase)
        .nfd()
        .filter(|c| !is_combining_mark(*c));

    for c in letters {
        if c.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            match LETTER_FOLDS.iter().find(|(from, _)| *from == c) {
                Some((_, to)) => out.push_str(to),
                None => out.push(c),
            }
        } else {
            pending_space = true;
        }
    }

    out
}

/// Splits an already-normalized string into its tokens.
#[must_use]
pub fn tokens(normalized: &str) -> Vec<&str> {
    normalized.split(' ').filter(|t| !t.is_empty()).collect()
}
