use crate::app_config::{AppConfig, ElasticSettings, Environment};
use crate::{ConfigError, DetectionThresholds};

/// Accepted range for the recent and trend window lengths.
const WINDOW_DAYS_RANGE: std::ops::RangeInclusive<u32> = 1..=3650;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can pass a `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u8 = |var: &str, default: &str| -> Result<u8, ConfigError> {
        or_default(var, default)
            .parse::<u8>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_window = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let days = or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if !WINDOW_DAYS_RANGE.contains(&days) {
            return Err(invalid(
                var,
                format!(
                    "{days} is outside {}..={} days",
                    WINDOW_DAYS_RANGE.start(),
                    WINDOW_DAYS_RANGE.end()
                ),
            ));
        }
        Ok(days)
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_unit = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let value = or_default(var, default)
            .parse::<f64>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if !(0.0..=1.0).contains(&value) {
            return Err(invalid(var, format!("{value} is outside 0.0..=1.0")));
        }
        Ok(value)
    };

    let env = parse_environment(&or_default("VOC_ENV", "development"))?;

    let bind_addr = or_default("VOC_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("VOC_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("VOC_LOG_LEVEL", "info");
    let products_path = PathBuf::from(or_default("VOC_PRODUCTS_PATH", "./config/products.yaml"));

    let reviews_index = or_default("VOC_REVIEWS_INDEX", "customer_reviews");
    let issues_index = or_default("VOC_ISSUES_INDEX", "voc_issues");
    let request_timeout_secs = parse_u64("VOC_ELASTIC_TIMEOUT_SECS", "30")?;

    let base_url = lookup("ELASTIC_BASE_URL")
        .ok()
        .filter(|v| !v.trim().is_empty());
    let api_key = lookup("ELASTIC_API_KEY")
        .ok()
        .filter(|v| !v.trim().is_empty());
    let elastic = match (base_url, api_key) {
        (Some(base_url), Some(api_key)) => Some(ElasticSettings {
            base_url,
            api_key,
            reviews_index,
            issues_index,
            request_timeout_secs,
        }),
        _ => None,
    };

    let defaults = DetectionThresholds::default();
    let thresholds = DetectionThresholds {
        complaint_sentiment_max: parse_unit("VOC_COMPLAINT_SENTIMENT_MAX", "0.35")?,
        complaint_rating_max: parse_u8("VOC_COMPLAINT_RATING_MAX", "2")?,
        min_complaints: parse_usize("VOC_MIN_COMPLAINTS", "3")?,
        alert_sentiment: parse_unit("VOC_ALERT_SENTIMENT", "0.45")?,
        high_confidence_complaints: parse_usize("VOC_HIGH_COMPLAINTS", "15")?,
        high_confidence_sentiment: parse_unit("VOC_HIGH_SENTIMENT", "0.3")?,
        low_confidence_complaints: parse_usize("VOC_LOW_COMPLAINTS", "5")?,
        low_confidence_sentiment: parse_unit("VOC_LOW_SENTIMENT", "0.42")?,
        recent_window_days: parse_window("VOC_RECENT_WINDOW_DAYS", "7")?,
        trend_window_days: parse_window("VOC_TREND_WINDOW_DAYS", "30")?,
        ..defaults
    };

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        products_path,
        elastic,
        thresholds,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "VOC_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}
