//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that addresses parse and that the upstream URL is usable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::ProxyConfig;

/// A single semantic problem with a configuration.
#[derive(Debug)]
pub enum ValidationError {
    InvalidBindAddress(String),
    InvalidMetricsAddress(String),
    MissingUpstreamUrl,
    InvalidUpstreamUrl {
        url: String,
        source: url::ParseError,
    },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::InvalidBindAddress(addr) => {
                write!(f, "listener.bind_address '{}' is not a socket address", addr)
            }
            ValidationError::InvalidMetricsAddress(addr) => {
                write!(
                    f,
                    "observability.metrics_address '{}' is not a socket address",
                    addr
                )
            }
            ValidationError::MissingUpstreamUrl => {
                write!(
                    f,
                    "upstream.base_url is not set (configure it or export ACTIONS_CACHE_URL)"
                )
            }
            ValidationError::InvalidUpstreamUrl { url, source } => {
                write!(f, "upstream.base_url '{}' is not a URL: {}", url, source)
            }
        }
    }
}

/// Check a configuration for semantic problems, reporting every failure.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.upstream.base_url.is_empty() {
        errors.push(ValidationError::MissingUpstreamUrl);
    } else if let Err(source) = url::Url::parse(&config.upstream.base_url) {
        errors.push(ValidationError::InvalidUpstreamUrl {
            url: config.upstream.base_url.clone(),
            source,
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> ProxyConfig {
        let mut config = ProxyConfig::default();
        config.upstream.base_url = "https://cache.example.com/org/".to_string();
        config
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_missing_upstream_url_fails() {
        let config = ProxyConfig::default();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::MissingUpstreamUrl)));
    }

    #[test]
    fn test_all_errors_are_reported() {
        let mut config = ProxyConfig::default();
        config.listener.bind_address = "not-an-address".to_string();
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "also bad".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_relative_upstream_url_fails() {
        let mut config = valid_config();
        config.upstream.base_url = "cache.example.com/org".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidUpstreamUrl { .. })));
    }

    #[test]
    fn test_metrics_address_ignored_when_disabled() {
        let mut config = valid_config();
        config.observability.metrics_enabled = false;
        config.observability.metrics_address = "nonsense".to_string();

        assert!(validate_config(&config).is_ok());
    }
}
