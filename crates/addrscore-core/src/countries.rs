//! Multilingual country alias table.
//!
//! Aliases are written in their natural spelling and normalized once, on
//! first use, through [`crate::normalize::normalize`], so the table stays
//! readable and matching is always done on the same form as the input.

use std::sync::LazyLock;

use crate::normalize::{normalize, tokens};

/// ISO 3166-1 alpha-2 code followed by every spelling that names the country.
///
/// Two-letter aliases that double as US state abbreviations (`CA`, `DE`) are
/// left out; their three-letter forms are kept.
const COUNTRY_ALIASES: &[(&str, &[&str])] = &[
    (
        "NL",
        &[
            "Netherlands",
            "The Netherlands",
            "Holland",
            "Nederland",
            "Niederlande",
            "Pays-Bas",
            "Países Bajos",
            "Paesi Bassi",
            "NL",
            "NLD",
        ],
    ),
    (
        "DE",
        &[
            "Germany",
            "Deutschland",
            "Duitsland",
            "Allemagne",
            "Alemania",
            "Germania",
            "DEU",
        ],
    ),
    (
        "FR",
        &["France", "Frankrijk", "Frankreich", "Francia", "FR", "FRA"],
    ),
    (
        "GB",
        &[
            "United Kingdom",
            "UK",
            "Great Britain",
            "GB",
            "GBR",
            "England",
            "Scotland",
            "Wales",
            "Northern Ireland",
            "Verenigd Koninkrijk",
            "Vereinigtes Königreich",
            "Großbritannien",
            "Royaume-Uni",
            "Angleterre",
            "Reino Unido",
            "Regno Unito",
            "Engeland",
            "Schotland",
        ],
    ),
    (
        "ES",
        &["Spain", "España", "Spanje", "Spanien", "Espagne", "Spagna", "ES", "ESP"],
    ),
    (
        "IT",
        &["Italy", "Italia", "Italië", "Italien", "Italie", "IT", "ITA"],
    ),
    (
        "BE",
        &[
            "Belgium", "België", "Belgique", "Belgien", "Bélgica", "Belgio", "BE", "BEL",
        ],
    ),
    (
        "AT",
        &["Austria", "Österreich", "Oostenrijk", "Autriche", "AT", "AUT"],
    ),
    ("PT", &["Portugal", "Portogallo", "PT", "PRT"]),
    (
        "IE",
        &[
            "Ireland",
            "Republic of Ireland",
            "Éire",
            "Ierland",
            "Irland",
            "Irlande",
            "Irlanda",
            "IE",
            "IRL",
        ],
    ),
    (
        "HU",
        &[
            "Hungary",
            "Magyarország",
            "Hongarije",
            "Ungarn",
            "Hongrie",
            "Hungría",
            "Ungheria",
            "HU",
            "HUN",
        ],
    ),
    (
        "CH",
        &[
            "Switzerland",
            "Schweiz",
            "Suisse",
            "Svizzera",
            "Zwitserland",
            "Suiza",
            "CH",
            "CHE",
        ],
    ),
    (
        "SE",
        &[
            "Sweden", "Sverige", "Zweden", "Schweden", "Suède", "Suecia", "Svezia", "SE", "SWE",
        ],
    ),
    (
        "NO",
        &[
            "Norway", "Norge", "Noorwegen", "Norwegen", "Norvège", "Noruega", "Norvegia", "NO",
            "NOR",
        ],
    ),
    (
        "DK",
        &[
            "Denmark",
            "Danmark",
            "Denemarken",
            "Dänemark",
            "Danemark",
            "Dinamarca",
            "Danimarca",
            "DK",
            "DNK",
        ],
    ),
    (
        "PL",
        &["Poland", "Polska", "Polen", "Pologne", "Polonia", "PL", "POL"],
    ),
    (
        "CZ",
        &[
            "Czech Republic",
            "Czechia",
            "Česko",
            "Česká republika",
            "Tsjechië",
            "Tschechien",
            "CZ",
            "CZE",
        ],
    ),
    ("LU", &["Luxembourg", "Luxemburg", "LU", "LUX"]),
    (
        "FI",
        &["Finland", "Suomi", "Finnland", "Finlande", "FI", "FIN"],
    ),
    (
        "GR",
        &[
            "Greece",
            "Ελλάδα",
            "Hellas",
            "Griekenland",
            "Griechenland",
            "Grèce",
            "Grecia",
            "GR",
            "GRC",
        ],
    ),
    (
        "US",
        &[
            "United States",
            "United States of America",
            "USA",
            "US",
            "Vereinigte Staaten",
            "Verenigde Staten",
            "États-Unis",
            "Estados Unidos",
            "Stati Uniti",
        ],
    ),
    ("CA", &["Canada", "Kanada", "CAN"]),
    (
        "AU",
        &["Australia", "Australië", "Australien", "Australie", "AU", "AUS"],
    ),
];

/// Street types, articles and prepositions that put a following country name
/// inside a street name (`rue de belgique`, `place d italie`).
const STREET_NAME_LEAD: &[&str] = &[
    "rue", "avenue", "av", "ave", "boulevard", "blvd", "place", "pl", "quai", "cours", "chemin",
    "allee", "route", "impasse", "street", "st", "road", "via", "viale", "piazza", "corso",
    "calle", "avenida", "plaza", "paseo", "rua", "praca", "strasse", "platz", "de", "d", "du",
    "des", "la", "le", "l", "di", "della", "del", "da", "do", "of",
];

/// Street types that put a preceding country name inside a street name
/// (`holland park avenue`).
const STREET_NAME_TAIL: &[&str] = &[
    "park", "avenue", "ave", "road", "rd", "street", "st", "lane", "drive", "square", "place",
    "gardens", "way", "terrace", "strasse", "straat", "laan", "weg", "platz", "plein",
];

/// One normalized alias, pre-split into tokens.
#[derive(Debug)]
struct CountryAlias {
    code: &'static str,
    tokens: Vec<String>,
    /// Code-like aliases (`uk`, `nl`, `usa`) collide with ordinary words and
    /// only count as the final token of an address.
    short: bool,
}

static ALIASES: LazyLock<Vec<CountryAlias>> = LazyLock::new(|| {
    COUNTRY_ALIASES
        .iter()
        .flat_map(|&(code, aliases)| {
            aliases.iter().map(move |alias| {
                let normalized = normalize(alias);
                let alias_tokens: Vec<String> =
                    tokens(&normalized).into_iter().map(str::to_owned).collect();
                let short = alias_tokens.len() == 1 && normalized.chars().count() <= 3;
                CountryAlias {
                    code,
                    tokens: alias_tokens,
                    short,
                }
            })
        })
        .filter(|alias| !alias.tokens.is_empty())
        .collect()
});

/// A country alias located inside a token list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CountryMatch {
    pub(crate) code: &'static str,
    /// Index of the first token covered by the alias.
    pub(crate) start: usize,
    /// Index one past the last token covered by the alias.
    pub(crate) end: usize,
}

/// Finds the country named in `words`.
///
/// Among overlapping matches the longest alias wins (`united kingdom` over
/// `kingdom`, `northern ireland` over `ireland`); among disjoint matches the
/// one ending latest wins, since countries trail the address.
pub(crate) fn find_country(words: &[&str]) -> Option<CountryMatch> {
    let mut best: Option<(CountryMatch, usize)> = None;

    for alias in ALIASES.iter() {
        let len = alias.tokens.len();
        if len > words.len() {
            continue;
        }
        for start in 0..=words.len() - len {
            let end = start + len;
            if alias.short && end != words.len() {
                continue;
            }
            let hit = alias
                .tokens
                .iter()
                .zip(&words[start..end])
                .all(|(a, w)| a == w);
            if !hit {
                continue;
            }
            if !alias.short && end != words.len() && inside_street_name(words, start, end) {
                continue;
            }
            let chars: usize = alias.tokens.iter().map(String::len).sum();
            let candidate = CountryMatch {
                code: alias.code,
                start,
                end,
            };
            let better = match best {
                None => true,
                Some((current, current_chars)) => {
                    (end, len, chars) > (current.end, current.end - current.start, current_chars)
                }
            };
            if better {
                best = Some((candidate, chars));
            }
        }
    }

    best.map(|(m, _)| m)
}

/// A full country name that is not the last word and sits against a street
/// word is part of the street, not the address's country.
fn inside_street_name(words: &[&str], start: usize, end: usize) -> bool {
    let lead = start
        .checked_sub(1)
        .is_some_and(|i| STREET_NAME_LEAD.contains(&words[i]));
    let tail = words
        .get(end)
        .is_some_and(|w| STREET_NAME_TAIL.contains(w));
    lead || tail
}

#[cfg(test)]
mod tests {
    use super::*;

    fn country_of(text: &str) -> Option<&'static str> {
        let normalized = normalize(text);
        find_country(&tokens(&normalized)).map(|m| m.code)
    }

    #[test]
    fn multilingual_names_map_to_one_code() {
        assert_eq!(country_of("Paris, France"), Some("FR"));
        assert_eq!(country_of("Parijs, Frankrijk"), Some("FR"));
        assert_eq!(country_of("Paris, Frankreich"), Some("FR"));
    }

    #[test]
    fn accented_aliases_match_unaccented_input() {
        assert_eq!(country_of("Wien, Osterreich"), Some("AT"));
        assert_eq!(country_of("Madrid, España"), Some("ES"));
    }

    #[test]
    fn longest_overlapping_alias_wins() {
        assert_eq!(country_of("Belfast, Northern Ireland"), Some("GB"));
        assert_eq!(country_of("Dublin, Ireland"), Some("IE"));
        assert_eq!(country_of("London, United Kingdom"), Some("GB"));
    }

    #[test]
    fn latest_disjoint_alias_wins() {
        assert_eq!(country_of("Holland Park Avenue, London, UK"), Some("GB"));
        assert_eq!(country_of("Rue de France 3, Nice, Italie"), Some("IT"));
    }

    #[test]
    fn short_codes_only_count_as_final_token() {
        assert_eq!(country_of("5 Rue de la Paix, Paris"), None);
        assert_eq!(country_of("Damrak 1, Amsterdam, NL"), Some("NL"));
        assert_eq!(country_of("Via Roma 1, it is here"), None);
    }

    #[test]
    fn state_abbreviations_are_not_countries() {
        assert_eq!(country_of("Mountain View, CA"), None);
        assert_eq!(country_of("Dover, DE"), None);
    }

    #[test]
    fn country_names_inside_street_names_are_ignored() {
        assert_eq!(country_of("Place d'Italie, Paris"), None);
        assert_eq!(country_of("12 Avenue d'Italie, Paris"), None);
        assert_eq!(country_of("Holland Park Avenue, London"), None);
        assert_eq!(country_of("Rue de Belgique 3, Strasbourg"), None);
    }

    #[test]
    fn trailing_country_name_counts_after_a_street_word() {
        assert_eq!(country_of("Main Street, France"), Some("FR"));
        assert_eq!(country_of("Place d'Italie, Paris, France"), Some("FR"));
    }

    #[test]
    fn no_alias_returns_none() {
        assert_eq!(country_of(""), None);
        assert_eq!(country_of("Main Street 5, Springfield"), None);
    }

    #[test]
    fn span_covers_alias_tokens() {
        let normalized = normalize("10 Downing Street, London, United Kingdom, SW1A 2AA");
        let words = tokens(&normalized);
        let m = find_country(&words).expect("country expected");
        assert_eq!(m.code, "GB");
        assert_eq!(&words[m.start..m.end], &["united", "kingdom"]);
    }
}
