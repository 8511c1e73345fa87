//! Configuration loading from disk and the environment.
//!
//! Precedence, lowest to highest: compiled defaults, config file,
//! environment variables, command-line flags. Validation runs once, after
//! every layer has been applied.

use std::fs;
use std::path::Path;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable carrying the remote service base URL.
pub const ENV_CACHE_URL: &str = "ACTIONS_CACHE_URL";

/// Environment variable carrying the remote service bearer token.
pub const ENV_RUNTIME_TOKEN: &str = "ACTIONS_RUNTIME_TOKEN";

/// Environment variable overriding the listener port.
pub const ENV_PORT: &str = "PORT";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Env { name: &'static str, value: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env { name, value } => {
                write!(f, "Invalid {} value '{}'", name, value)
            }
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load configuration, apply overrides, and validate the result.
///
/// `path` is optional: without a file the compiled defaults are the base.
/// `listen_override` comes from the command line and wins over everything.
pub fn resolve_config(
    path: Option<&Path>,
    listen_override: Option<&str>,
) -> Result<ProxyConfig, ConfigError> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };

    apply_env(&mut config, |name| std::env::var(name).ok())?;

    if let Some(listen) = listen_override {
        config.listener.bind_address = listen.to_string();
    }

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Parse a TOML configuration file.
fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: ProxyConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;
    Ok(config)
}

/// Apply environment overrides through an injectable lookup.
fn apply_env(
    config: &mut ProxyConfig,
    var: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    if let Some(base_url) = var(ENV_CACHE_URL) {
        config.upstream.base_url = base_url;
    }
    if let Some(token) = var(ENV_RUNTIME_TOKEN) {
        config.upstream.token = token;
    }
    if let Some(port) = var(ENV_PORT) {
        let port: u16 = port.parse().map_err(|_| ConfigError::Env {
            name: ENV_PORT,
            value: port.clone(),
        })?;
        rewrite_port(&mut config.listener.bind_address, port);
    }
    Ok(())
}

/// Swap the port in a `host:port` bind address, leaving the host untouched.
fn rewrite_port(bind_address: &mut String, port: u16) {
    let rewritten = match bind_address.rsplit_once(':') {
        Some((host, _)) => format!("{host}:{port}"),
        None => format!("{bind_address}:{port}"),
    };
    *bind_address = rewritten;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"

            [upstream]
            base_url = "https://cache.example.com/org/"
            token = "secret"
            "#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.upstream.token, "secret");
    }

    #[test]
    fn test_load_config_rejects_malformed_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[listener\nbind_address = ").unwrap();

        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = ProxyConfig::default();
        config.upstream.base_url = "https://old.example.com/".to_string();

        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_CACHE_URL, "https://new.example.com/"),
            (ENV_RUNTIME_TOKEN, "fresh-token"),
        ]);
        apply_env(&mut config, |name| env.get(name).map(|v| v.to_string())).unwrap();

        assert_eq!(config.upstream.base_url, "https://new.example.com/");
        assert_eq!(config.upstream.token, "fresh-token");
    }

    #[test]
    fn test_port_override_keeps_the_host() {
        let mut config = ProxyConfig::default();

        let env: HashMap<&str, &str> = HashMap::from([(ENV_PORT, "8080")]);
        apply_env(&mut config, |name| env.get(name).map(|v| v.to_string())).unwrap();

        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }

    #[test]
    fn test_unparseable_port_is_rejected() {
        let mut config = ProxyConfig::default();

        let env: HashMap<&str, &str> = HashMap::from([(ENV_PORT, "eighty")]);
        let error =
            apply_env(&mut config, |name| env.get(name).map(|v| v.to_string())).unwrap_err();

        assert!(matches!(error, ConfigError::Env { name: "PORT", .. }));
    }
}
