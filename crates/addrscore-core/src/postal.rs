//! Postal code pattern families.
//!
//! Patterns run against normalized text (lower case, single spaces), so the
//! separators real codes use (`SW1A 2AA`, `1012-AB`, `00-950`) all arrive as
//! one space or none.

use std::sync::LazyLock;

use regex::Regex;

struct PostalFamily {
    countries: &'static [&'static str],
    pattern: Regex,
}

fn family(countries: &'static [&'static str], pattern: &str) -> PostalFamily {
    PostalFamily {
        countries,
        pattern: Regex::new(pattern).expect("valid postal regex"),
    }
}

static FAMILIES: LazyLock<Vec<PostalFamily>> = LazyLock::new(|| {
    vec![
        family(&["NL"], r"\b[1-9][0-9]{3} ?[a-z]{2}\b"),
        family(&["GB"], r"\b[a-z]{1,2}[0-9][a-z0-9]? ?[0-9][a-z]{2}\b"),
        family(&["CA"], r"\b[a-z][0-9][a-z] ?[0-9][a-z][0-9]\b"),
        family(&["IE"], r"\b[a-z][0-9][0-9w] ?[0-9a-z]{4}\b"),
        family(&["US"], r"\b[0-9]{5}(?: [0-9]{4})?\b"),
        family(&["PT"], r"\b[0-9]{4} [0-9]{3}\b"),
        family(&["PL"], r"\b[0-9]{2} [0-9]{3}\b"),
        family(&["SE", "CZ", "SK", "GR"], r"\b[0-9]{3} ?[0-9]{2}\b"),
        family(&["DE", "FR", "ES", "IT", "FI"], r"\b[0-9]{5}\b"),
        family(
            &["BE", "AT", "CH", "DK", "NO", "HU", "LU", "AU", "PT"],
            r"\b[0-9]{4}\b",
        ),
    ]
});

/// "Group of digits near the end", with the Dutch two-letter suffix allowed.
static GENERIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[0-9]{4} ?[a-z]{2}\b|\b[0-9]{4,5}\b").expect("valid generic postal regex")
});

/// Families distinctive enough to try without knowing the country.
const DISTINCTIVE: &[&str] = &["GB", "CA"];

/// A postal code located in normalized text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PostalMatch {
    /// Compacted code: the matched text without spaces.
    pub(crate) value: String,
    /// Index of the first token covered by the code.
    pub(crate) start: usize,
    /// Index one past the last token covered by the code.
    pub(crate) end: usize,
}

/// Finds the postal code in `normalized`.
///
/// With a known `country` its own families are tried first. Otherwise, or
/// when they find nothing, the generic trailing-digits heuristic runs, then
/// the alphanumeric GB and CA layouts. Within a family the last hit wins;
/// digit-only hits on the leading token are skipped because house numbers
/// lead an address and postal codes trail it.
pub(crate) fn find_postal(normalized: &str, country: Option<&str>) -> Option<PostalMatch> {
    let starts = token_starts(normalized);

    if let Some(code) = country {
        let own = FAMILIES
            .iter()
            .filter(|f| f.countries.contains(&code))
            .find_map(|f| last_match(&f.pattern, normalized, &starts));
        if own.is_some() {
            return own;
        }
    }

    last_match(&GENERIC, normalized, &starts).or_else(|| {
        FAMILIES
            .iter()
            .filter(|f| f.countries.iter().any(|c| DISTINCTIVE.contains(c)))
            .find_map(|f| last_match(&f.pattern, normalized, &starts))
    })
}

fn last_match(pattern: &Regex, normalized: &str, starts: &[usize]) -> Option<PostalMatch> {
    pattern
        .find_iter(normalized)
        .filter_map(|m| {
            let start = starts.iter().position(|&s| s == m.start())?;
            let end = starts.iter().filter(|&&s| s < m.end()).count();
            let digits_only = m.as_str().chars().all(|c| c.is_ascii_digit() || c == ' ');
            if start == 0 && digits_only {
                return None;
            }
            Some(PostalMatch {
                value: m.as_str().replace(' ', ""),
                start,
                end,
            })
        })
        .last()
}

/// Byte offset where each space-separated token begins.
fn token_starts(normalized: &str) -> Vec<usize> {
    let mut starts = Vec::new();
    let mut at_boundary = true;
    for (i, c) in normalized.char_indices() {
        if c == ' ' {
            at_boundary = true;
        } else if at_boundary {
            starts.push(i);
            at_boundary = false;
        }
    }
    starts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;

    fn postal(text: &str, country: Option<&str>) -> Option<String> {
        find_postal(&normalize(text), country).map(|m| m.value)
    }

    #[test]
    fn dutch_code_with_and_without_space() {
        assert_eq!(
            postal("Damrak 1, 1012 LG Amsterdam", Some("NL")).as_deref(),
            Some("1012lg")
        );
        assert_eq!(
            postal("Damrak 1, 1012LG Amsterdam", Some("NL")).as_deref(),
            Some("1012lg")
        );
    }

    #[test]
    fn british_code_found_by_country_family() {
        assert_eq!(
            postal("10 Downing Street, London SW1A 2AA", Some("GB")).as_deref(),
            Some("sw1a2aa")
        );
    }

    #[test]
    fn british_code_found_without_country() {
        assert_eq!(
            postal("10 Downing Street, London SW1A 2AA", None).as_deref(),
            Some("sw1a2aa")
        );
    }

    #[test]
    fn five_digit_code_for_germany() {
        assert_eq!(
            postal("Hauptstraße 5, 10115 Berlin", Some("DE")).as_deref(),
            Some("10115")
        );
    }

    #[test]
    fn generic_fallback_picks_trailing_digits() {
        assert_eq!(
            postal("1600 Pennsylvania Avenue NW, Washington, DC 20500", None).as_deref(),
            Some("20500")
        );
    }

    #[test]
    fn leading_digits_are_not_postal_codes() {
        assert_eq!(postal("12345 Main Street, Springfield", Some("US")), None);
        assert_eq!(postal("1600 Pennsylvania Avenue", None), None);
    }

    #[test]
    fn spaced_layouts_are_compacted() {
        assert_eq!(
            postal("Kungsgatan 1, 111 43 Stockholm", Some("SE")).as_deref(),
            Some("11143")
        );
        assert_eq!(
            postal("Rua Augusta 10, 1100-053 Lisboa", Some("PT")).as_deref(),
            Some("1100053")
        );
    }

    #[test]
    fn country_without_family_falls_back_to_generic() {
        assert_eq!(
            postal("Tverskaya 7, 125009 Moskva, XX", Some("XX")),
            None
        );
        assert_eq!(
            postal("Tverskaya 7, 12500 Moskva", Some("XX")).as_deref(),
            Some("12500")
        );
    }

    #[test]
    fn span_points_at_tokens() {
        let text = normalize("Damrak 1, 1012 LG Amsterdam");
        let m = find_postal(&text, Some("NL")).expect("postal expected");
        assert_eq!((m.start, m.end), (2, 4));
    }

    #[test]
    fn no_code_in_plain_text() {
        assert_eq!(postal("Paris, France", Some("FR")), None);
        assert_eq!(postal("", None), None);
    }
}
