//! # Runtime Configuration
//!
//! One struct for every component the runtime assembles, loaded from
//! `COURIER_*` environment variables.
//!
//! ## Security Requirements
//!
//! - `COURIER_JWT_SECRET` MUST be set, at least 32 bytes, and not the
//!   development placeholder
//! - All timeouts and limits have defaults with override capability

use courier_telemetry::TelemetryConfig;
use cr_01_identity::IdentityConfig;
use cr_04_command_router::RouterConfig;
use cr_05_api_gateway::GatewayConfig;
use shared_types::ServiceName;
use std::env;
use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("COURIER_JWT_SECRET is not set")]
    MissingSecret,

    #[error("{name} has an invalid value '{value}'")]
    InvalidValue { name: &'static str, value: String },

    #[error(transparent)]
    Identity(#[from] cr_01_identity::ConfigError),

    #[error(transparent)]
    Gateway(#[from] cr_05_api_gateway::ConfigError),

    #[error(transparent)]
    Router(#[from] cr_04_command_router::RouterError),

    #[error("{0} queue name must not be empty")]
    EmptyQueue(ServiceName),
}

/// Argon2 cost parameters for password hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCosts {
    /// Memory in KiB.
    pub memory_kib: u32,
    pub iterations: u32,
    pub lanes: u32,
}

impl Default for HashCosts {
    fn default() -> Self {
        // argon2 crate defaults (OWASP minimum for Argon2id)
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            lanes: 1,
        }
    }
}

/// Complete runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub gateway: GatewayConfig,
    pub identity: IdentityConfig,
    pub router: RouterConfig,
    /// Queue the auth service consumes.
    pub auth_queue: String,
    /// Queue the profile service consumes.
    pub profile_queue: String,
    /// Emails granted the `admin` role at registration.
    pub admin_emails: Vec<String>,
    pub hash_costs: HashCosts,
    pub telemetry: TelemetryConfig,
}

impl RuntimeConfig {
    /// Defaults everywhere except the signing secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            gateway: GatewayConfig::default(),
            identity: IdentityConfig::new(secret),
            router: RouterConfig::default(),
            auth_queue: ServiceName::Auth.default_queue().to_string(),
            profile_queue: ServiceName::Profile.default_queue().to_string(),
            admin_emails: Vec::new(),
            hash_costs: HashCosts::default(),
            telemetry: TelemetryConfig::default(),
        }
    }

    /// Load configuration from the process environment.
    ///
    /// # Environment Variables
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `COURIER_JWT_SECRET` | required |
    /// | `COURIER_HTTP_HOST` | `127.0.0.1` |
    /// | `COURIER_HTTP_PORT` | `3000` |
    /// | `COURIER_TOKEN_TTL_SECS` | `86400` |
    /// | `COURIER_CALL_TIMEOUT_MS` | `5000` |
    /// | `COURIER_ROUTER_CONCURRENCY` | `64` |
    /// | `COURIER_AUTH_QUEUE` | `auth_queue` |
    /// | `COURIER_PROFILE_QUEUE` | `profile_queue` |
    /// | `COURIER_ADMIN_EMAILS` | none (comma separated) |
    /// | `COURIER_ARGON2_MEMORY_KIB` | `19456` |
    /// | `COURIER_ARGON2_ITERATIONS` | `2` |
    ///
    /// Logging variables are read by [`TelemetryConfig::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::from_lookup(|name| env::var(name).ok())?;
        config.telemetry = TelemetryConfig::from_env();
        Ok(config)
    }

    /// Load configuration through `lookup` instead of the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup("COURIER_JWT_SECRET").ok_or(ConfigError::MissingSecret)?;
        let mut config = Self::new(secret);

        if let Some(host) = parse::<IpAddr>(&lookup, "COURIER_HTTP_HOST")? {
            config.gateway.http.host = host;
        }
        if let Some(port) = parse::<u16>(&lookup, "COURIER_HTTP_PORT")? {
            config.gateway.http.port = port;
        }
        if let Some(ttl) = parse::<u64>(&lookup, "COURIER_TOKEN_TTL_SECS")? {
            config.identity.token_ttl = Duration::from_secs(ttl);
        }
        if let Some(timeout) = parse::<u64>(&lookup, "COURIER_CALL_TIMEOUT_MS")? {
            config.gateway.call_timeout_ms = timeout;
        }
        if let Some(concurrency) = parse::<usize>(&lookup, "COURIER_ROUTER_CONCURRENCY")? {
            config.router.concurrency = concurrency;
        }
        if let Some(queue) = lookup("COURIER_AUTH_QUEUE") {
            config.auth_queue = queue;
        }
        if let Some(queue) = lookup("COURIER_PROFILE_QUEUE") {
            config.profile_queue = queue;
        }
        if let Some(emails) = lookup("COURIER_ADMIN_EMAILS") {
            config.admin_emails = emails
                .split(',')
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(memory) = parse::<u32>(&lookup, "COURIER_ARGON2_MEMORY_KIB")? {
            config.hash_costs.memory_kib = memory;
        }
        if let Some(iterations) = parse::<u32>(&lookup, "COURIER_ARGON2_ITERATIONS")? {
            config.hash_costs.iterations = iterations;
        }

        Ok(config)
    }

    /// Validate configuration for production readiness.
    pub fn validate_for_production(&self) -> Result<(), ConfigError> {
        self.identity.validate_for_production()?;
        self.validate()
    }

    /// Checks that do not depend on the deployment.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.identity.validate()?;
        self.gateway.validate()?;
        self.router.validate()?;
        if self.auth_queue.is_empty() {
            return Err(ConfigError::EmptyQueue(ServiceName::Auth));
        }
        if self.profile_queue.is_empty() {
            return Err(ConfigError::EmptyQueue(ServiceName::Profile));
        }
        Ok(())
    }

    pub fn call_timeout(&self) -> Duration {
        self.gateway.call_timeout()
    }
}

fn parse<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &'static str) -> Result<Option<T>, ConfigError> {
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { name, value }),
    }
}
