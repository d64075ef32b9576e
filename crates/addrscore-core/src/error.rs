use thiserror::Error;

/// Failures of the one outbound geocoder call.
///
/// Every variant means "could not evaluate this address right now"; none of
/// them says anything about how well the address matches.
#[derive(Debug, Error)]
pub enum GeocoderError {
    /// No answer within the bounded wait.
    #[error("geocoder timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    /// Connection, TLS, or body-read failure.
    #[error("geocoder transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Credentials rejected (HTTP 401/403).
    #[error("geocoder rejected credentials (HTTP {status})")]
    Unauthorized { status: u16 },

    /// Provider asked us to back off (HTTP 429).
    #[error("geocoder rate limited (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("unexpected HTTP status {status} from geocoder")]
    UnexpectedStatus { status: u16 },

    /// The response body did not have the expected shape.
    #[error("malformed geocoder response for {context}: {reason}")]
    Malformed { context: String, reason: String },
}

impl GeocoderError {
    /// Returns `true` for conditions a caller may reasonably retry later.
    ///
    /// Rejected credentials and malformed responses will not fix themselves.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            GeocoderError::Timeout { .. }
            | GeocoderError::Transport(_)
            | GeocoderError::RateLimited { .. } => true,
            GeocoderError::UnexpectedStatus { status } => *status >= 500,
            GeocoderError::Unauthorized { .. } | GeocoderError::Malformed { .. } => false,
        }
    }
}

/// Errors surfaced by the match pipeline.
#[derive(Debug, Error)]
pub enum MatchError {
    /// Blank input, rejected before any network call.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Geocoder(#[from] GeocoderError),
}

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read weights file {path}: {source}")]
    WeightsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse weights file: {0}")]
    WeightsFileParse(#[from] serde_yaml::Error),

    #[error("invalid scoring weights: {0}")]
    InvalidWeights(String),
}

/// Problems with a labelled evaluation set.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("line {line}: label {label} is outside [0.0, 1.0]")]
    InvalidLabel { line: usize, label: f64 },

    #[error("no labelled pairs to evaluate")]
    Empty,
}
