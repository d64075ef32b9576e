use std::path::PathBuf;

use crate::app_config::AppConfig;
use crate::error::ConfigError;
use crate::select::SelectionPolicy;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from the current process environment only.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Parses and validates configuration through `lookup`, so tests can feed a
/// plain `HashMap` instead of mutating the process environment.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> { lookup(var).ok().filter(|v| !v.trim().is_empty()) };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let mapbox_access_token = require("MAPBOX_ACCESS_TOKEN")?;

    let geocoder_base_url = or_default("ADDRSCORE_GEOCODER_BASE_URL", "https://api.mapbox.com")
        .trim_end_matches('/')
        .to_string();

    let geocoder_timeout_ms = or_default("ADDRSCORE_GEOCODER_TIMEOUT_MS", "5000")
        .parse::<u64>()
        .map_err(|e| invalid("ADDRSCORE_GEOCODER_TIMEOUT_MS", e.to_string()))?;
    if geocoder_timeout_ms == 0 {
        return Err(invalid(
            "ADDRSCORE_GEOCODER_TIMEOUT_MS",
            "must be greater than zero".to_string(),
        ));
    }

    let geocoder_limit = or_default("ADDRSCORE_GEOCODER_LIMIT", "5")
        .parse::<u8>()
        .map_err(|e| invalid("ADDRSCORE_GEOCODER_LIMIT", e.to_string()))?;
    if !(1..=10).contains(&geocoder_limit) {
        return Err(invalid(
            "ADDRSCORE_GEOCODER_LIMIT",
            format!("must be between 1 and 10, got {geocoder_limit}"),
        ));
    }

    let geocoder_language = optional("ADDRSCORE_GEOCODER_LANGUAGE");
    let user_agent = or_default("ADDRSCORE_USER_AGENT", "addrscore/0.1 (address-matching)");

    let selection_policy = or_default("ADDRSCORE_SELECTION_POLICY", "top-rank")
        .parse::<SelectionPolicy>()
        .map_err(|reason| invalid("ADDRSCORE_SELECTION_POLICY", reason))?;

    let weights_path = optional("ADDRSCORE_WEIGHTS_PATH").map(PathBuf::from);
    let log_level = or_default("ADDRSCORE_LOG_LEVEL", "info");

    Ok(AppConfig {
        mapbox_access_token,
        geocoder_base_url,
        geocoder_timeout_ms,
        geocoder_limit,
        geocoder_language,
        user_agent,
        selection_policy,
        weights_path,
        log_level,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    fn full_env<'a>() -> HashMap<&'a str, &'a str> {
        let mut m = HashMap::new();
        m.insert("MAPBOX_ACCESS_TOKEN", "pk.test-token");
        m
    }

    #[test]
    fn fails_without_access_token() {
        let map: HashMap<&str, &str> = HashMap::new();
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "MAPBOX_ACCESS_TOKEN"),
            "expected MissingEnvVar(MAPBOX_ACCESS_TOKEN), got: {result:?}"
        );
    }

    #[test]
    fn blank_access_token_counts_as_missing() {
        let mut map = full_env();
        map.insert("MAPBOX_ACCESS_TOKEN", "  ");
        let result = build_app_config(lookup_from_map(&map));
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(_))));
    }

    #[test]
    fn defaults_apply_with_only_required_vars() {
        let map = full_env();
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.geocoder_base_url, "https://api.mapbox.com");
        assert_eq!(cfg.geocoder_timeout_ms, 5000);
        assert_eq!(cfg.geocoder_limit, 5);
        assert!(cfg.geocoder_language.is_none());
        assert_eq!(cfg.user_agent, "addrscore/0.1 (address-matching)");
        assert_eq!(cfg.selection_policy, SelectionPolicy::TopRank);
        assert!(cfg.weights_path.is_none());
        assert_eq!(cfg.log_level, "info");
    }

    #[test]
    fn overrides_are_applied() {
        let mut map = full_env();
        map.insert("ADDRSCORE_GEOCODER_BASE_URL", "http://127.0.0.1:9999/");
        map.insert("ADDRSCORE_GEOCODER_TIMEOUT_MS", "250");
        map.insert("ADDRSCORE_GEOCODER_LIMIT", "10");
        map.insert("ADDRSCORE_GEOCODER_LANGUAGE", "nl");
        map.insert("ADDRSCORE_SELECTION_POLICY", "rescore");
        map.insert("ADDRSCORE_WEIGHTS_PATH", "./config/weights.yaml");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.geocoder_base_url, "http://127.0.0.1:9999");
        assert_eq!(cfg.geocoder_timeout().as_millis(), 250);
        assert_eq!(cfg.geocoder_limit, 10);
        assert_eq!(cfg.geocoder_language.as_deref(), Some("nl"));
        assert_eq!(cfg.selection_policy, SelectionPolicy::Rescore);
        assert_eq!(
            cfg.weights_path.as_deref(),
            Some(std::path::Path::new("./config/weights.yaml"))
        );
    }

    #[test]
    fn limit_out_of_range_is_rejected() {
        for bad in ["0", "11", "abc"] {
            let mut map = full_env();
            map.insert("ADDRSCORE_GEOCODER_LIMIT", bad);
            let result = build_app_config(lookup_from_map(&map));
            assert!(
                matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ADDRSCORE_GEOCODER_LIMIT"),
                "expected InvalidEnvVar for {bad}, got: {result:?}"
            );
        }
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut map = full_env();
        map.insert("ADDRSCORE_GEOCODER_TIMEOUT_MS", "0");
        let result = build_app_config(lookup_from_map(&map));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar { .. })));
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let mut map = full_env();
        map.insert("ADDRSCORE_SELECTION_POLICY", "random");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ADDRSCORE_SELECTION_POLICY"),
            "got: {result:?}"
        );
    }

    #[test]
    fn debug_redacts_access_token() {
        let map = full_env();
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("pk.test-token"));
        assert!(rendered.contains("[redacted]"));
    }

    #[test]
    fn default_weights_without_path() {
        let map = full_env();
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(
            cfg.scoring_weights().unwrap(),
            crate::weights::ScoringWeights::default()
        );
    }
}
