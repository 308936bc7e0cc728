//! Dispatcher configuration.

use serde::{Deserialize, Serialize};
use shared_types::ServiceName;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// Dispatcher configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("call timeout must be greater than zero")]
    ZeroTimeout,

    #[error("sweep grace must be greater than zero")]
    ZeroSweepGrace,

    #[error("instance name must not be empty")]
    EmptyInstanceName,

    #[error("no queue configured for service '{0}'")]
    MissingRoute(ServiceName),

    #[error("queue name for service '{0}' must not be empty")]
    EmptyQueueName(ServiceName),
}

/// Settings for one dispatcher instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Prefix of this instance's reply queue (`<instance>.reply.<uuid>`).
    pub instance_name: String,
    /// Wait used when a call passes no timeout.
    pub default_timeout: Duration,
    /// Service queue per backend service.
    pub routes: HashMap<ServiceName, String>,
    /// How often abandoned correlation entries are swept.
    pub cleanup_interval: Duration,
    /// How long past its timeout an entry may linger before the sweep.
    pub sweep_grace: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            instance_name: "gateway".to_string(),
            default_timeout: Duration::from_secs(5),
            routes: [ServiceName::Auth, ServiceName::Profile]
                .into_iter()
                .map(|s| (s, s.default_queue().to_string()))
                .collect(),
            cleanup_interval: Duration::from_secs(10),
            sweep_grace: Duration::from_secs(1),
        }
    }
}

impl DispatcherConfig {
    pub fn new(instance_name: impl Into<String>) -> Self {
        Self {
            instance_name: instance_name.into(),
            ..Self::default()
        }
    }

    /// Set the queue a service listens on.
    #[must_use]
    pub fn with_route(mut self, service: ServiceName, queue: impl Into<String>) -> Self {
        self.routes.insert(service, queue.into());
        self
    }

    #[must_use]
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.sweep_grace.is_zero() {
            return Err(ConfigError::ZeroSweepGrace);
        }
        if self.instance_name.is_empty() {
            return Err(ConfigError::EmptyInstanceName);
        }
        for service in [ServiceName::Auth, ServiceName::Profile] {
            match self.routes.get(&service) {
                None => return Err(ConfigError::MissingRoute(service)),
                Some(queue) if queue.is_empty() => return Err(ConfigError::EmptyQueueName(service)),
                Some(_) => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_routes_use_service_queues() {
        let config = DispatcherConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.routes[&ServiceName::Auth], "auth_queue");
        assert_eq!(config.routes[&ServiceName::Profile], "profile_queue");
    }

    #[test]
    fn test_validation_errors() {
        let config = DispatcherConfig::default().with_default_timeout(Duration::ZERO);
        assert_eq!(config.validate(), Err(ConfigError::ZeroTimeout));

        let config = DispatcherConfig {
            sweep_grace: Duration::ZERO,
            ..DispatcherConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroSweepGrace));

        let mut config = DispatcherConfig::default();
        config.routes.remove(&ServiceName::Profile);
        assert_eq!(config.validate(), Err(ConfigError::MissingRoute(ServiceName::Profile)));

        let config = DispatcherConfig::default().with_route(ServiceName::Auth, "");
        assert_eq!(config.validate(), Err(ConfigError::EmptyQueueName(ServiceName::Auth)));
    }
}
