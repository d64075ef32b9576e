use addrscore_core::GeocoderError;
use thiserror::Error;

/// Errors returned by the Mapbox geocoding client.
#[derive(Debug, Error)]
pub enum MapboxError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The client-side request timeout elapsed.
    #[error("Mapbox request timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    /// Access token missing, invalid, or lacking the geocoding scope.
    #[error("Mapbox rejected the access token (HTTP {status})")]
    Unauthorized { status: u16 },

    #[error("rate limited by Mapbox (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("unexpected HTTP status {status} from Mapbox")]
    UnexpectedStatus { status: u16 },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl From<MapboxError> for GeocoderError {
    fn from(err: MapboxError) -> Self {
        match err {
            MapboxError::Timeout { timeout_ms } => GeocoderError::Timeout { timeout_ms },
            MapboxError::Unauthorized { status } => GeocoderError::Unauthorized { status },
            MapboxError::RateLimited { retry_after_secs } => {
                GeocoderError::RateLimited { retry_after_secs }
            }
            MapboxError::UnexpectedStatus { status } => GeocoderError::UnexpectedStatus { status },
            MapboxError::Deserialize { context, source } => GeocoderError::Malformed {
                context,
                reason: source.to_string(),
            },
            other @ (MapboxError::Http(_) | MapboxError::InvalidBaseUrl { .. }) => {
                GeocoderError::Transport(Box::new(other))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_keep_their_meaning_at_the_seam() {
        assert!(matches!(
            GeocoderError::from(MapboxError::Unauthorized { status: 403 }),
            GeocoderError::Unauthorized { status: 403 }
        ));
        assert!(matches!(
            GeocoderError::from(MapboxError::RateLimited {
                retry_after_secs: Some(7)
            }),
            GeocoderError::RateLimited {
                retry_after_secs: Some(7)
            }
        ));
        assert!(matches!(
            GeocoderError::from(MapboxError::Timeout { timeout_ms: 50 }),
            GeocoderError::Timeout { timeout_ms: 50 }
        ));
    }

    #[test]
    fn deserialize_error_becomes_malformed() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = GeocoderError::from(MapboxError::Deserialize {
            context: "forward".to_owned(),
            source,
        });
        assert!(matches!(err, GeocoderError::Malformed { ref context, .. } if context == "forward"));
        assert!(!err.is_retryable());
    }
}
