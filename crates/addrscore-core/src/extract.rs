//! Weak structural parsing of normalized addresses.
//!
//! Pulls out country, postal code, and house number with light heuristics.
//! Nothing here fails: a field that cannot be found with confidence is left
//! as `None`.

use std::sync::LazyLock;

use regex::Regex;

use crate::countries::find_country;
use crate::normalize::tokens;
use crate::postal::find_postal;
use crate::types::StructuralTokens;

static HOUSE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{1,5}[a-z]{0,2}$").expect("valid house number regex"));

/// Ordinal suffixes: `5th avenue` names a street, not a house.
const ORDINAL_SUFFIXES: &[&str] = &["st", "nd", "rd", "th", "er", "re"];

/// Structural tokens plus the words left over for textual comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedAddress {
    pub tokens: StructuralTokens,
    /// Word tokens outside the country and postal spans that carry no digits.
    pub residual: Vec<String>,
}

/// Extracts structural tokens from a normalized address.
#[must_use]
pub fn extract(normalized: &str) -> StructuralTokens {
    parse(normalized).tokens
}

/// Parses a normalized address into structural tokens and residual words.
///
/// Order matters: the country is found first so its postal family can be
/// preferred, and the postal span is excluded before the house number search
/// so one token never fills both roles.
#[must_use]
pub fn parse(normalized: &str) -> ParsedAddress {
    let words = tokens(normalized);
    if words.is_empty() {
        return ParsedAddress::default();
    }

    let country = find_country(&words);
    let postal = find_postal(normalized, country.map(|c| c.code));

    let consumed = |i: usize| {
        country.is_some_and(|c| (c.start..c.end).contains(&i))
            || postal.as_ref().is_some_and(|p| (p.start..p.end).contains(&i))
    };

    let house_number = find_house_number(&words, &consumed);

    let residual = words
        .iter()
        .enumerate()
        .filter(|(i, w)| !consumed(*i) && !w.chars().any(|c| c.is_ascii_digit()))
        .map(|(_, w)| (*w).to_owned())
        .collect();

    ParsedAddress {
        tokens: StructuralTokens {
            country_code: country.map(|c| c.code.to_owned()),
            postal_code: postal.map(|p| p.value),
            house_number,
        },
        residual,
    }
}

fn find_house_number(words: &[&str], consumed: &impl Fn(usize) -> bool) -> Option<String> {
    let candidates: Vec<usize> = words
        .iter()
        .enumerate()
        .filter(|(i, w)| !consumed(*i) && is_house_number(w))
        .map(|(i, _)| i)
        .collect();

    let &first = candidates.first()?;

    // A lone, long, trailing number is as likely an unrecognised postal code.
    let digits = words[first].chars().filter(char::is_ascii_digit).count();
    if candidates.len() == 1 && first == words.len() - 1 && digits >= 4 && words.len() > 1 {
        return None;
    }

    Some(words[first].to_owned())
}

fn is_house_number(word: &str) -> bool {
    if !HOUSE_NUMBER_RE.is_match(word) {
        return false;
    }
    let suffix = word.trim_start_matches(|c: char| c.is_ascii_digit());
    !ORDINAL_SUFFIXES.contains(&suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;

    fn parsed(text: &str) -> ParsedAddress {
        parse(&normalize(text))
    }

    #[test]
    fn downing_street_short_form() {
        let p = parsed("10 Downing Street, London, UK");
        assert_eq!(p.tokens.country_code.as_deref(), Some("GB"));
        assert_eq!(p.tokens.postal_code, None);
        assert_eq!(p.tokens.house_number.as_deref(), Some("10"));
        assert_eq!(p.residual, vec!["downing", "street", "london"]);
    }

    #[test]
    fn downing_street_long_form() {
        let p = parsed("10 Downing Street, London, United Kingdom, SW1A 2AA");
        assert_eq!(p.tokens.country_code.as_deref(), Some("GB"));
        assert_eq!(p.tokens.postal_code.as_deref(), Some("sw1a2aa"));
        assert_eq!(p.tokens.house_number.as_deref(), Some("10"));
        assert_eq!(p.residual, vec!["downing", "street", "london"]);
    }

    #[test]
    fn dutch_address_with_suffix_house_number() {
        let p = parsed("Keizersgracht 12b, 1015 CJ Amsterdam, Nederland");
        assert_eq!(p.tokens.country_code.as_deref(), Some("NL"));
        assert_eq!(p.tokens.postal_code.as_deref(), Some("1015cj"));
        assert_eq!(p.tokens.house_number.as_deref(), Some("12b"));
        assert_eq!(p.residual, vec!["keizersgracht", "amsterdam"]);
    }

    #[test]
    fn ordinals_are_not_house_numbers() {
        let p = parsed("350 5th Avenue, New York, NY 10118, USA");
        assert_eq!(p.tokens.house_number.as_deref(), Some("350"));
        assert_eq!(p.tokens.postal_code.as_deref(), Some("10118"));
        assert_eq!(p.tokens.country_code.as_deref(), Some("US"));

        let p = parsed("5th Avenue, New York");
        assert_eq!(p.tokens.house_number, None);
    }

    #[test]
    fn postal_code_is_not_reused_as_house_number() {
        let p = parsed("Berlin 10115, Deutschland");
        assert_eq!(p.tokens.postal_code.as_deref(), Some("10115"));
        assert_eq!(p.tokens.house_number, None);
    }

    #[test]
    fn trailing_four_digits_read_as_postal_code() {
        let p = parsed("Rue Principale, Village 1234");
        assert_eq!(p.tokens.postal_code.as_deref(), Some("1234"));
        assert_eq!(p.tokens.house_number, None);
    }

    #[test]
    fn ambiguous_trailing_number_is_left_alone() {
        let p = parsed("Kirchweg, Dorf 1234a");
        assert_eq!(p.tokens.postal_code, None);
        assert_eq!(p.tokens.house_number, None);

        let p = parsed("Kirchweg 12, Dorf 1234a");
        assert_eq!(p.tokens.house_number.as_deref(), Some("12"));
    }

    #[test]
    fn place_names_only() {
        let p = parsed("Parijs, Frankrijk");
        assert_eq!(p.tokens.country_code.as_deref(), Some("FR"));
        assert_eq!(p.tokens.postal_code, None);
        assert_eq!(p.tokens.house_number, None);
        assert_eq!(p.residual, vec!["parijs"]);
    }

    #[test]
    fn empty_input_extracts_nothing() {
        assert_eq!(extract(""), StructuralTokens::default());
        assert!(parse("").residual.is_empty());
    }

    #[test]
    fn extract_matches_parse_tokens() {
        let text = normalize("Hauptstraße 5, 10115 Berlin, Germany");
        assert_eq!(extract(&text), parse(&text).tokens);
    }
}
