//! API Gateway service lifecycle.

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::routes::build_router;
use crate::state::AppState;
use axum::Router;
use cr_01_identity::{IdentityConfig, IdentityVerifier};
use cr_02_access_guard::AccessGuard;
use cr_03_dispatcher::Dispatcher;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// API Gateway service state
pub struct ApiGatewayService {
    config: GatewayConfig,
    state: AppState,
}

impl ApiGatewayService {
    /// Create the gateway over a started dispatcher.
    pub fn new(
        config: GatewayConfig,
        dispatcher: Arc<Dispatcher>,
        identity: &IdentityConfig,
    ) -> Result<Self, GatewayError> {
        config.validate()?;
        let verifier = Arc::new(IdentityVerifier::new(identity)?);
        let state = AppState::new(dispatcher, verifier, AccessGuard::new(), config.call_timeout());
        Ok(Self { config, state })
    }

    /// The HTTP router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        build_router(self.state.clone(), self.config.expose_metrics)
    }

    /// Bind the listener and serve in the background.
    pub async fn start(self) -> Result<RunningGateway, GatewayError> {
        let listener = tokio::net::TcpListener::bind(self.config.http_addr())
            .await
            .map_err(GatewayError::Bind)?;
        let local_addr = listener.local_addr().map_err(GatewayError::Bind)?;
        let router = self.router();

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .map_err(GatewayError::Serve)
        });

        info!(addr = %local_addr, "API Gateway listening");
        Ok(RunningGateway {
            local_addr,
            shutdown_tx: Some(shutdown_tx),
            server,
        })
    }
}

/// A gateway serving HTTP in the background.
pub struct RunningGateway {
    local_addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    server: JoinHandle<Result<(), GatewayError>>,
}

impl RunningGateway {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting connections and wait for in-flight requests.
    pub async fn shutdown(mut self) -> Result<(), GatewayError> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        match self.server.await {
            Ok(result) => {
                info!("API Gateway stopped");
                result
            }
            Err(e) => {
                error!(error = %e, "API Gateway task failed");
                Err(GatewayError::Serve(std::io::Error::new(std::io::ErrorKind::Other, e.to_string())))
            }
        }
    }
}
