use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

pub const DEFAULT_API_BASE_URL: &str = "https://api.rainforestapi.com/request";

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

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let api_key = lookup("RAINFOREST_API_KEY")
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty());

    let env = parse_environment(&or_default("ASINKIT_ENV", "development"));
    let log_level = or_default("ASINKIT_LOG_LEVEL", "info");
    let bind_addr = or_default("ASINKIT_BIND_ADDR", "127.0.0.1:3000")
        .parse::<SocketAddr>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: "ASINKIT_BIND_ADDR".to_string(),
            reason: e.to_string(),
        })?;
    let api_base_url = or_default("ASINKIT_API_BASE_URL", DEFAULT_API_BASE_URL);
    let amazon_domain = or_default("ASINKIT_AMAZON_DOMAIN", "amazon.com");
    let output_dir = PathBuf::from(or_default("ASINKIT_OUTPUT_DIR", "."));

    let request_timeout_secs = parse_u64("ASINKIT_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("ASINKIT_USER_AGENT", "asinkit/0.1 (catalog-research)");
    let inter_request_delay_ms = parse_u64("ASINKIT_INTER_REQUEST_DELAY_MS", "250")?;

    let database_url = lookup("DATABASE_URL").ok().filter(|v| !v.is_empty());
    let db_max_connections = parse_u32("ASINKIT_DB_MAX_CONNECTIONS", "5")?;
    let db_min_connections = parse_u32("ASINKIT_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("ASINKIT_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    Ok(AppConfig {
        env,
        log_level,
        bind_addr,
        api_key,
        api_base_url,
        amazon_domain,
        output_dir,
        request_timeout_secs,
        user_agent,
        inter_request_delay_ms,
        database_url,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
