//! Response types for the Mapbox Search Geocoding v6 forward endpoint.
//!
//! Only the fields the matcher reads are modelled; everything is optional
//! because the provider omits context layers that do not apply.

use addrscore_core::{GeocodeCandidate, StructuralTokens};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ForwardResponse {
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
pub struct Feature {
    pub properties: FeatureProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FeatureProperties {
    pub name: Option<String>,
    pub place_formatted: Option<String>,
    pub full_address: Option<String>,
    pub context: FeatureContext,
    pub match_code: Option<MatchCode>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FeatureContext {
    pub address: Option<AddressContext>,
    pub postcode: Option<NamedContext>,
    pub country: Option<CountryContext>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AddressContext {
    pub address_number: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NamedContext {
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CountryContext {
    pub name: Option<String>,
    pub country_code: Option<String>,
}

/// Only present on address-level results.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MatchCode {
    pub confidence: Option<String>,
}

/// Maps the provider's confidence label onto `[0.0, 1.0]`.
#[must_use]
pub fn confidence_to_relevance(label: &str) -> Option<f64> {
    match label {
        "exact" => Some(1.0),
        "high" => Some(0.9),
        "medium" => Some(0.7),
        "low" => Some(0.4),
        _ => None,
    }
}

impl Feature {
    /// Converts a feature into a candidate at position `rank`.
    #[must_use]
    pub fn into_candidate(self, rank: usize) -> GeocodeCandidate {
        let props = self.properties;

        let formatted_address = non_blank(props.full_address).unwrap_or_else(|| {
            [props.name.as_deref(), props.place_formatted.as_deref()]
                .into_iter()
                .flatten()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(", ")
        });

        let tokens = StructuralTokens {
            country_code: non_blank(props.context.country.and_then(|c| c.country_code))
                .map(|c| c.to_ascii_uppercase()),
            postal_code: non_blank(props.context.postcode.and_then(|p| p.name)).map(|p| compact(&p)),
            house_number: non_blank(props.context.address.and_then(|a| a.address_number))
                .map(|h| compact(&h)),
        };

        let mut candidate = GeocodeCandidate::new(formatted_address, rank).with_tokens(tokens);
        if let Some(relevance) = props
            .match_code
            .and_then(|m| m.confidence)
            .and_then(|c| confidence_to_relevance(&c))
        {
            candidate = candidate.with_relevance(relevance);
        }
        candidate
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Lower case with separators removed (`SW1A 2AA` -> `sw1a2aa`).
fn compact(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature(json: serde_json::Value) -> Feature {
        serde_json::from_value(json).expect("valid feature")
    }

    #[test]
    fn address_feature_carries_tokens_and_relevance() {
        let f = feature(serde_json::json!({
            "type": "Feature",
            "properties": {
                "feature_type": "address",
                "name": "10 Downing Street",
                "place_formatted": "London, SW1A 2AA, United Kingdom",
                "full_address": "10 Downing Street, London, SW1A 2AA, United Kingdom",
                "context": {
                    "address": { "address_number": "10", "street_name": "Downing Street" },
                    "postcode": { "name": "SW1A 2AA" },
                    "country": { "name": "United Kingdom", "country_code": "gb" }
                },
                "match_code": { "confidence": "exact" }
            }
        }));
        let c = f.into_candidate(0);
        assert_eq!(
            c.formatted_address,
            "10 Downing Street, London, SW1A 2AA, United Kingdom"
        );
        assert_eq!(c.relevance, Some(1.0));
        assert_eq!(c.tokens.country_code.as_deref(), Some("GB"));
        assert_eq!(c.tokens.postal_code.as_deref(), Some("sw1a2aa"));
        assert_eq!(c.tokens.house_number.as_deref(), Some("10"));
    }

    #[test]
    fn place_feature_falls_back_to_name_and_place() {
        let f = feature(serde_json::json!({
            "properties": {
                "feature_type": "place",
                "name": "Paris",
                "place_formatted": "Île-de-France, France",
                "context": { "country": { "country_code": "FR" } }
            }
        }));
        let c = f.into_candidate(2);
        assert_eq!(c.formatted_address, "Paris, Île-de-France, France");
        assert_eq!(c.rank, 2);
        assert_eq!(c.relevance, None);
        assert!(c.tokens.postal_code.is_none());
    }

    #[test]
    fn empty_properties_give_blank_candidate() {
        let c = feature(serde_json::json!({ "properties": {} })).into_candidate(0);
        assert_eq!(c.formatted_address, "");
        assert!(c.tokens.is_empty());
    }

    #[test]
    fn compact_strips_separators_and_lowercases() {
        assert_eq!(compact("SW1A 2AA"), "sw1a2aa");
        assert_eq!(compact(" 1012-AB "), "1012ab");
        assert_eq!(compact("12bis"), "12bis");
    }

    #[test]
    fn confidence_labels() {
        assert_eq!(confidence_to_relevance("high"), Some(0.9));
        assert_eq!(confidence_to_relevance("low"), Some(0.4));
        assert_eq!(confidence_to_relevance("unknown"), None);
    }
}
