use std::future::Future;

use crate::error::GeocoderError;
use crate::types::GeocodeCandidate;

/// An external forward geocoder.
///
/// One call per address: `query` is the raw input, trimmed but otherwise
/// untouched, and the result is the provider's ranked candidate list. An
/// empty list is a valid answer, not an error.
pub trait Geocoder: Send + Sync {
    fn forward(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<GeocodeCandidate>, GeocoderError>> + Send;
}
