//! Main configuration type.

use std::collections::HashSet;

use hermes_core::RouteDefinition;
use serde::{Deserialize, Serialize};

use crate::{ConfigError, GatewaySettings, LoggingSection};

/// Complete Hermes gateway configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use hermes_config::HermesConfig;
///
/// let config = HermesConfig::default();
/// assert!(config.routes.is_empty());
/// assert_eq!(config.logging.level, "info");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct HermesConfig {
    /// Gateway behavior.
    #[serde(default)]
    pub gateway: GatewaySettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSection,

    /// Route table, in match order. The first matching route wins.
    #[serde(default)]
    pub routes: Vec<RouteDefinition>,
}

impl HermesConfig {
    /// Validate the configuration.
    ///
    /// Rule contents are not checked here: a bad JSON path or header
    /// name fails only the rule that carries it, at request time.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `gateway.max_body_bytes` is
    /// zero or `logging.level` is blank, and `ConfigError::InvalidRoute` if a
    /// route id is blank or repeated or a match pattern does not start
    /// with `/`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gateway.max_body_bytes == 0 {
            return Err(ConfigError::invalid_value(
                "gateway.max_body_bytes",
                "must be greater than zero",
            ));
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::invalid_value("logging.level", "must not be empty"));
        }

        let mut seen = HashSet::new();
        for (index, route) in self.routes.iter().enumerate() {
            if route.route_id.trim().is_empty() {
                return Err(ConfigError::invalid_route(
                    index,
                    &route.route_id,
                    "RouteId must not be blank",
                ));
            }
            if !seen.insert(route.route_id.as_str()) {
                return Err(ConfigError::invalid_route(
                    index,
                    &route.route_id,
                    "duplicate route id",
                ));
            }
            if !route.match_path.starts_with('/') {
                return Err(ConfigError::invalid_route(
                    index,
                    &route.route_id,
                    format!("MatchPath must start with '/': '{}'", route.match_path),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_routes(routes: Vec<RouteDefinition>) -> HermesConfig {
        HermesConfig {
            routes,
            ..HermesConfig::default()
        }
    }

    #[test]
    fn test_default_is_valid() {
        assert!(HermesConfig::default().validate().is_ok());
    }

    #[test]
    fn test_duplicate_route_ids_rejected() {
        let config = with_routes(vec![
            RouteDefinition::new("users", "/users"),
            RouteDefinition::new("users", "/people"),
        ]);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRoute { index: 1, .. }));
        assert_eq!(err.to_string(), "route #1 ('users'): duplicate route id");
    }

    #[test]
    fn test_blank_route_id_rejected() {
        let config = with_routes(vec![RouteDefinition::new(" ", "/users")]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_relative_match_path_rejected() {
        for pattern in ["", "users/{id}"] {
            let config = with_routes(vec![RouteDefinition::new("users", pattern)]);
            assert!(config.validate().is_err(), "{pattern:?} should be rejected");
        }
    }

    #[test]
    fn test_zero_body_limit_rejected() {
        let mut config = HermesConfig::default();
        config.gateway.max_body_bytes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_top_level_section_rejected() {
        let result: Result<HermesConfig, _> = toml::from_str("[server]\nport = 1");
        assert!(result.is_err());
    }
}
