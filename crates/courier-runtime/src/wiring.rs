//! # Service Wiring
//!
//! Assembles every component over one broker, in dependency order:
//!
//! ```text
//! broker ─┬─ profile router ←── profile_queue
//!         ├─ auth dispatcher ──→ profile_queue   (nested create/delete-profile)
//!         ├─ auth router ←────── auth_queue
//!         └─ gateway dispatcher ─→ auth_queue, profile_queue
//!                  ↑
//!             HTTP gateway
//! ```

use crate::config::RuntimeConfig;
use cr_01_identity::TokenIssuer;
use cr_03_dispatcher::{DispatchError, Dispatcher, DispatcherConfig, ServiceClient};
use cr_04_command_router::{CommandRouter, RouterError};
use cr_05_api_gateway::{ApiGatewayService, GatewayError, RunningGateway};
use cr_06_auth_service::{
    Argon2Hasher, AuthService, AuthSettings, HashError, InMemoryUserRepository, QueueProfileDirectory,
};
use cr_07_profile_service::{InMemoryProfileRepository, ProfileService};
use shared_bus::{InMemoryBroker, QueueTransport, TransportError};
use shared_types::ServiceName;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// How long routers get to finish in-flight commands on shutdown.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Startup failures.
#[derive(Debug, Error)]
pub enum WiringError {
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    #[error("identity: {0}")]
    Identity(#[from] cr_01_identity::ConfigError),

    #[error("dispatcher: {0}")]
    Dispatcher(#[from] cr_03_dispatcher::ConfigError),

    #[error("dispatcher: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("router: {0}")]
    Router(#[from] RouterError),

    #[error("transport: {0}")]
    Transport(#[from] TransportError),

    #[error("password hasher: {0}")]
    Hasher(#[from] HashError),

    #[error("gateway: {0}")]
    Gateway(#[from] GatewayError),
}

/// Every component assembled and consuming, with the HTTP listener not yet
/// bound.
pub struct Services {
    broker: Arc<InMemoryBroker>,
    gateway: ApiGatewayService,
    /// Command routers; they end when the broker closes.
    routers: Vec<JoinHandle<()>>,
    /// Reply listeners and correlation sweeps.
    background: Vec<JoinHandle<()>>,
}

impl Services {
    /// Assemble all services on `broker`.
    pub async fn assemble(config: RuntimeConfig, broker: Arc<InMemoryBroker>) -> Result<Self, WiringError> {
        config.validate()?;
        let transport: Arc<dyn QueueTransport> = broker.clone();
        let mut routers = Vec::new();
        let mut background = Vec::new();

        // Profile service
        let profiles = Arc::new(ProfileService::new(Arc::new(InMemoryProfileRepository::new())));
        let router = CommandRouter::new(
            cr_07_profile_service::register_handlers(profiles),
            transport.clone(),
            config.router,
        )?;
        routers.push(router.spawn(&config.profile_queue).await?);
        info!(queue = %config.profile_queue, "Profile service consuming");

        // Auth service, with its own dispatcher for the nested profile calls
        let auth_dispatcher = start_dispatcher(&config, "auth-service", &transport, &mut background).await?;
        let hasher = Argon2Hasher::with_costs(
            config.hash_costs.memory_kib,
            config.hash_costs.iterations,
            config.hash_costs.lanes,
        )?;
        let auth = Arc::new(AuthService::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(hasher),
            Arc::new(QueueProfileDirectory::new(ServiceClient::new(auth_dispatcher))),
            TokenIssuer::new(&config.identity)?,
            AuthSettings {
                admin_emails: config.admin_emails.clone(),
            },
        ));
        let router = CommandRouter::new(
            cr_06_auth_service::register_handlers(auth),
            transport.clone(),
            config.router,
        )?;
        routers.push(router.spawn(&config.auth_queue).await?);
        info!(queue = %config.auth_queue, "Auth service consuming");

        // Gateway
        let gateway_dispatcher = start_dispatcher(&config, "gateway", &transport, &mut background).await?;
        let gateway = ApiGatewayService::new(config.gateway.clone(), gateway_dispatcher, &config.identity)?;

        Ok(Self {
            broker,
            gateway,
            routers,
            background,
        })
    }

    pub fn broker(&self) -> &Arc<InMemoryBroker> {
        &self.broker
    }

    pub fn gateway(&self) -> &ApiGatewayService {
        &self.gateway
    }

    /// Bind the HTTP listener.
    pub async fn start(self) -> Result<CourierRuntime, WiringError> {
        let http = self.gateway.start().await?;
        Ok(CourierRuntime {
            http,
            broker: self.broker,
            routers: self.routers,
            background: self.background,
        })
    }

    /// Stop consuming without ever serving HTTP.
    pub async fn shutdown(self) {
        stop(self.broker, self.routers, self.background).await;
    }
}

/// The running process: HTTP server, routers and reply listeners.
pub struct CourierRuntime {
    http: RunningGateway,
    broker: Arc<InMemoryBroker>,
    routers: Vec<JoinHandle<()>>,
    background: Vec<JoinHandle<()>>,
}

impl CourierRuntime {
    /// Assemble everything on a fresh in-process broker and start serving.
    pub async fn start(config: RuntimeConfig) -> Result<Self, WiringError> {
        Services::assemble(config, Arc::new(InMemoryBroker::new())).await?.start().await
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.http.local_addr()
    }

    /// Graceful shutdown: the HTTP server stops first, then the broker
    /// closes and routers drain their in-flight commands.
    pub async fn shutdown(self) {
        info!("Initiating graceful shutdown...");
        if let Err(e) = self.http.shutdown().await {
            warn!(error = %e, "HTTP server stopped with an error");
        }
        stop(self.broker, self.routers, self.background).await;
        info!("Shutdown complete");
    }
}

async fn start_dispatcher(
    config: &RuntimeConfig,
    instance: &str,
    transport: &Arc<dyn QueueTransport>,
    background: &mut Vec<JoinHandle<()>>,
) -> Result<Arc<Dispatcher>, WiringError> {
    let dispatcher_config = DispatcherConfig::new(instance)
        .with_default_timeout(config.call_timeout())
        .with_route(ServiceName::Auth, config.auth_queue.clone())
        .with_route(ServiceName::Profile, config.profile_queue.clone());
    let dispatcher = Arc::new(Dispatcher::new(transport.clone(), &dispatcher_config)?);
    background.extend(dispatcher.start().await?);
    info!(instance, reply_queue = %dispatcher.reply_queue(), "Dispatcher started");
    Ok(dispatcher)
}

async fn stop(broker: Arc<InMemoryBroker>, routers: Vec<JoinHandle<()>>, background: Vec<JoinHandle<()>>) {
    broker.close();

    for router in routers {
        match tokio::time::timeout(DRAIN_TIMEOUT, router).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "Router task failed"),
            Err(_) => warn!("Router did not drain in time"),
        }
    }
    // The correlation sweep never ends on its own
    for task in background {
        task.abort();
    }
}
