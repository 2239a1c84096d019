//! HTTP server setup.
//!
//! # Responsibilities
//! - Build shared state and the three limiter instances
//! - Assemble the route table inside the global pipeline
//! - Serve with peer addresses attached (client identity fallback)
//! - Drain gracefully on shutdown, bounded by a deadline

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::{AppConfig, RateLimitConfig};
use crate::http::pipeline::Pipeline;
use crate::lifecycle::Shutdown;
use crate::portfolio::PortfolioService;
use crate::routing::{self, RouteLimiters};
use crate::security::limits::BodyLimit;
use crate::security::rate_limit::RateLimiterConfigError;
use crate::security::RateLimiter;
use crate::store::DocumentStore;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub portfolio: PortfolioService,
    pub store: Arc<dyn DocumentStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            portfolio: PortfolioService::new(store.clone()),
            store,
        }
    }
}

/// The three independent limiter instances.
#[derive(Debug, Clone)]
pub struct Limiters {
    pub global: Arc<RateLimiter>,
    pub contacts: Arc<RateLimiter>,
    pub questions: Arc<RateLimiter>,
}

impl Limiters {
    /// Build every limiter on the system clock, each with its own
    /// compaction task. Must be called inside a Tokio runtime.
    pub fn spawn(config: &RateLimitConfig) -> Result<Self, RateLimiterConfigError> {
        Ok(Self {
            global: RateLimiter::spawn("global", config.global.to_limiter_config()?),
            contacts: RateLimiter::spawn("contacts", config.contacts.to_limiter_config()?),
            questions: RateLimiter::spawn("questions", config.questions.to_limiter_config()?),
        })
    }

    /// Stop every compaction task.
    pub fn stop(&self) {
        self.global.stop();
        self.contacts.stop();
        self.questions.stop();
    }
}

/// HTTP server for the portfolio API.
pub struct AppServer {
    router: Router,
    limiters: Limiters,
    shutdown_timeout: Duration,
}

impl AppServer {
    pub fn new(config: &AppConfig, store: Arc<dyn DocumentStore>, limiters: Limiters) -> Self {
        let routes = routing::build_routes(
            AppState::new(store),
            RouteLimiters {
                contacts: limiters.contacts.clone(),
                questions: limiters.questions.clone(),
            },
        );
        let router = Pipeline {
            global_limiter: limiters.global.clone(),
            body_limit: BodyLimit(config.limits.max_body_bytes),
            allowed_origins: config.cors.allowed_origins.clone(),
        }
        .wrap(routes);

        Self {
            router,
            limiters,
            shutdown_timeout: config.server.shutdown_timeout(),
        }
    }

    /// The fully wrapped router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve until `shutdown` is triggered, then drain for at most the
    /// configured timeout. Limiter compaction stops on return.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> std::io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();
        let server = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown.wait())
            .into_future();

        let deadline = {
            let triggered = shutdown.wait();
            let timeout = self.shutdown_timeout;
            async move {
                triggered.await;
                tokio::time::sleep(timeout).await;
            }
        };

        let result = tokio::select! {
            result = server => result,
            _ = deadline => {
                tracing::warn!(
                    timeout_secs = self.shutdown_timeout.as_secs(),
                    "Graceful drain timed out, closing remaining connections"
                );
                Ok(())
            }
        };

        self.limiters.stop();
        tracing::info!("HTTP server stopped");
        result
    }
}
