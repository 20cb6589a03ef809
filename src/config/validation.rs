use crate::config::types::{Config, HarvestConfig, HttpConfig, ScoringConfig};
use crate::ConfigError;

/// Upper bound for any single pool size
const MAX_WORKERS: usize = 256;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_harvest_config(&config.harvest)?;
    validate_http_config(&config.http)?;
    validate_scoring_config(&config.scoring)?;
    Ok(())
}

/// Validates harvest pipeline limits
fn validate_harvest_config(config: &HarvestConfig) -> Result<(), ConfigError> {
    if config.deadline_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "deadline_secs must be >= 1, got {}",
            config.deadline_secs
        )));
    }

    if config.card_cap < 1 {
        return Err(ConfigError::Validation(format!(
            "card_cap must be >= 1, got {}",
            config.card_cap
        )));
    }

    for (name, value) in [
        ("listing_workers", config.listing_workers),
        ("max_detail_workers", config.max_detail_workers),
        ("max_concurrent_fetches", config.max_concurrent_fetches),
    ] {
        if !(1..=MAX_WORKERS).contains(&value) {
            return Err(ConfigError::Validation(format!(
                "{} must be between 1 and {}, got {}",
                name, MAX_WORKERS, value
            )));
        }
    }

    Ok(())
}

/// Validates HTTP client configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "connect_timeout_secs must be >= 1, got {}",
            config.connect_timeout_secs
        )));
    }

    Ok(())
}

/// Validates scoring configuration
fn validate_scoring_config(config: &ScoringConfig) -> Result<(), ConfigError> {
    if !config.scale_factor.is_finite() || config.scale_factor <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "scale_factor must be a positive finite number, got {}",
            config.scale_factor
        )));
    }

    Ok(())
}
