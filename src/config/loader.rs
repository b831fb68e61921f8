//! Configuration loading from disk and environment.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::config::schema::ProxyConfig;
use crate::config::validation::validate_config;
use crate::error::ConfigError;

/// Environment variable holding the JSON route mapping.
pub const ROUTES_ENV: &str = "APP_URI_LIST";

/// Load configuration from an optional TOML file and the `APP_URI_LIST`
/// environment variable, then validate it.
pub fn load_config(path: Option<&Path>) -> Result<ProxyConfig, ConfigError> {
    let routes = std::env::var(ROUTES_ENV).ok();
    load_config_from(path, routes.as_deref())
}

/// Same as [`load_config`] with the route mapping passed explicitly.
pub fn load_config_from(
    path: Option<&Path>,
    routes_json: Option<&str>,
) -> Result<ProxyConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => ProxyConfig::default(),
    };

    if let Some(raw) = routes_json {
        config.routes = parse_routes(raw)?;
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Parse a `{"/template": "http://target/path"}` JSON object.
pub fn parse_routes(raw: &str) -> Result<BTreeMap<String, String>, ConfigError> {
    serde_json::from_str(raw).map_err(|source| ConfigError::Routes {
        var: ROUTES_ENV,
        source,
    })
}
