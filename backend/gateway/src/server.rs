//! The listening server handle.
//!
//! Construction and start are split: the sequencer builds the server after
//! plugin phase one completes and only then asks it to listen, so a bind
//! failure surfaces as a fatal `ServerStart` rather than a panic inside the
//! serve loop.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use axum::Router;
use casd_config::CasdConfig;
use casd_core::{CasError, ServerBuilder, ServerHandle};
use once_cell::sync::OnceCell;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::routes::{self, GatewayState};

/// Axum-backed web server. `start` binds, spawns the serve loop, and records
/// the bound address for [`ServerHandle::uri`].
pub struct GatewayServer {
    bind: String,
    router: Mutex<Option<Router>>,
    bound: OnceCell<SocketAddr>,
}

impl GatewayServer {
    pub fn new(config: &CasdConfig, state: GatewayState) -> Self {
        Self {
            bind: format!("{}:{}", config.server.bind_address, config.server.port),
            router: Mutex::new(Some(routes::router(state))),
            bound: OnceCell::new(),
        }
    }
}

#[async_trait]
impl ServerHandle for GatewayServer {
    async fn start(&self) -> Result<SocketAddr, CasError> {
        let router = self
            .router
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or_else(|| CasError::ServerStart(anyhow!("server already started")))?;

        let listener = TcpListener::bind(&self.bind)
            .await
            .with_context(|| format!("failed to bind {}", self.bind))
            .map_err(CasError::ServerStart)?;
        let addr = listener
            .local_addr()
            .context("failed to read bound address")
            .map_err(CasError::ServerStart)?;
        let _ = self.bound.set(addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                error!("web server terminated: {e}");
            }
        });
        info!(%addr, "web server accepting connections");
        Ok(addr)
    }

    fn uri(&self) -> Option<String> {
        self.bound.get().map(|addr| format!("http://{addr}"))
    }
}

/// Builds the gateway server for the sequencer. Captures the registry and
/// hook references at wiring time, before either is fully populated.
pub struct GatewayBuilder {
    config: Arc<CasdConfig>,
    state: GatewayState,
}

impl GatewayBuilder {
    pub fn new(config: Arc<CasdConfig>, state: GatewayState) -> Self {
        Self { config, state }
    }
}

impl ServerBuilder for GatewayBuilder {
    fn build(&self) -> Result<Arc<dyn ServerHandle>> {
        Ok(Arc::new(GatewayServer::new(
            &self.config,
            self.state.clone(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casd_hooks::HookRegistry;
    use casd_registry::DependencyRegistry;
    use crate::xml::XmlRenderer;

    fn test_state() -> GatewayState {
        GatewayState {
            registry: DependencyRegistry::new(),
            hooks: HookRegistry::standard(),
            renderer: Arc::new(XmlRenderer::new()),
        }
    }

    fn test_config(port: u16) -> CasdConfig {
        let mut config = CasdConfig::default();
        config.server.bind_address = "127.0.0.1".to_string();
        config.server.port = port;
        config
    }

    #[tokio::test]
    async fn start_binds_and_exposes_uri() {
        // port 0: the OS picks a free port
        let server = GatewayServer::new(&test_config(0), test_state());
        assert!(server.uri().is_none());

        let addr = server.start().await.unwrap();
        assert_eq!(server.uri(), Some(format!("http://{addr}")));
    }

    #[tokio::test]
    async fn second_start_is_rejected() {
        let server = GatewayServer::new(&test_config(0), test_state());
        server.start().await.unwrap();
        let err = server.start().await.unwrap_err();
        assert!(matches!(err, CasError::ServerStart(_)));
    }

    #[tokio::test]
    async fn bind_failure_is_a_server_start_error() {
        let first = GatewayServer::new(&test_config(0), test_state());
        let addr = first.start().await.unwrap();

        // same port again: bind must fail
        let second = GatewayServer::new(&test_config(addr.port()), test_state());
        let err = second.start().await.unwrap_err();
        assert!(matches!(err, CasError::ServerStart(_)));
    }
}
