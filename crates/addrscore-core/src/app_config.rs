use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::select::SelectionPolicy;
use crate::weights::{load_weights, ScoringWeights};

#[derive(Clone)]
pub struct AppConfig {
    pub mapbox_access_token: String,
    pub geocoder_base_url: String,
    pub geocoder_timeout_ms: u64,
    pub geocoder_limit: u8,
    pub geocoder_language: Option<String>,
    pub user_agent: String,
    pub selection_policy: SelectionPolicy,
    pub weights_path: Option<PathBuf>,
    pub log_level: String,
}

impl AppConfig {
    #[must_use]
    pub fn geocoder_timeout(&self) -> Duration {
        Duration::from_millis(self.geocoder_timeout_ms)
    }

    /// Scoring weights from `weights_path`, or the compiled-in defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the weights file cannot be loaded.
    pub fn scoring_weights(&self) -> Result<ScoringWeights, ConfigError> {
        match &self.weights_path {
            Some(path) => load_weights(path),
            None => Ok(ScoringWeights::default()),
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("mapbox_access_token", &"[redacted]")
            .field("geocoder_base_url", &self.geocoder_base_url)
            .field("geocoder_timeout_ms", &self.geocoder_timeout_ms)
            .field("geocoder_limit", &self.geocoder_limit)
            .field("geocoder_language", &self.geocoder_language)
            .field("user_agent", &self.user_agent)
            .field("selection_policy", &self.selection_policy)
            .field("weights_path", &self.weights_path)
            .field("log_level", &self.log_level)
            .finish()
    }
}
