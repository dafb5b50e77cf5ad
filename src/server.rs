//! Proxy server - relays one upstream MCP SSE endpoint over HTTP.

use crate::config::ProxyConfig;
use crate::env::Env;
use crate::error::ProxyError;
use crate::handlers::{AppState, forward_handler, health_handler, sse_handler};
use crate::launcher::{ProxyService, ServerFactory};
use crate::port::Port;
use crate::sse::SseClientFactory;
use anyhow::Result;
use axum::Router;
use axum::routing::get;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Builds [`ProxyServer`]s from the launcher's environment, handing each one
/// the injected SSE client factory.
pub struct ProxyServerFactory {
    sse: SseClientFactory,
}

impl ProxyServerFactory {
    pub fn new(sse: SseClientFactory) -> Self {
        Self { sse }
    }
}

impl ServerFactory for ProxyServerFactory {
    type Server = ProxyServer;

    async fn create(&self, env: &Env) -> Result<ProxyServer> {
        let config = ProxyConfig::from_env(env)?;
        info!(
            upstream = %config.upstream_url,
            host = %config.host,
            auth = config.upstream_token.is_some(),
            "Proxy configured"
        );
        Ok(ProxyServer::new(config, self.sse.clone()))
    }
}

pub struct ProxyServer {
    state: AppState,
}

impl ProxyServer {
    pub fn new(config: ProxyConfig, sse: SseClientFactory) -> Self {
        let sse = sse.with_bearer_token(config.upstream_token.clone());
        Self {
            state: AppState {
                config: Arc::new(config),
                sse,
            },
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/sse", get(sse_handler))
            .fallback(forward_handler)
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve<S>(&self, listener: TcpListener, shutdown: S) -> Result<(), ProxyError>
    where
        S: Future<Output = ()> + Send + 'static,
    {
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}

impl ProxyService for ProxyServer {
    async fn start_server(&self, port: Port) -> Result<()> {
        let port = port.as_u16().ok_or(ProxyError::InvalidPort(port))?;
        let addr = format!("{}:{}", self.state.config.host, port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ProxyError::Bind {
                addr: addr.clone(),
                source,
            })?;

        info!("Listening on http://{}", listener.local_addr()?);
        self.serve(listener, shutdown_signal()).await?;
        info!("Server shutdown complete");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, initiating shutdown"),
            Err(e) => {
                warn!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("Received SIGTERM, initiating shutdown");
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
