//! Address match-and-score core.
//!
//! Resolves a free-text address to the best candidate from a forward
//! geocoder and attaches a confidence in `[0.0, 1.0]` that both name the
//! same place. Everything except the geocoder call is pure and synchronous.

pub mod app_config;
pub mod config;
mod countries;
pub mod error;
pub mod eval;
pub mod extract;
pub mod geocoder;
pub mod normalize;
pub mod pipeline;
mod postal;
pub mod score;
pub mod select;
pub mod similarity;
pub mod types;
pub mod weights;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{ConfigError, EvalError, GeocoderError, MatchError};
pub use extract::{extract, parse, ParsedAddress};
pub use geocoder::Geocoder;
pub use normalize::{normalize, tokens};
pub use pipeline::MatchPipeline;
pub use score::Scorer;
pub use select::{select_and_score, select_best, SelectionPolicy};
pub use types::{
    Agreement, GeocodeCandidate, MatchOutcome, MatchResult, ScoreBreakdown, StructuralTokens,
};
pub use weights::{load_weights, ScoringWeights};
