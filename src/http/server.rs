//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the route table and proxy cache from configuration
//! - Register every route template on the axum router
//! - Wire up middleware (tracing, request ID)
//! - Serve until the shutdown signal fires, draining in-flight requests

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware,
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::validation::validate_config;
use crate::config::ProxyConfig;
use crate::error::ConfigError;
use crate::http::dispatcher::Dispatcher;
use crate::http::request::request_id_middleware;
use crate::proxy::{build_client, ForwardSettings, ProxyCache};
use crate::routing::{MatchedPathMatcher, RouteTable, TemplateMatcher};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub matcher: Arc<dyn TemplateMatcher>,
}

/// HTTP server for the envelope proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
    dispatcher: Dispatcher,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// The configuration is validated again here so a template the router
    /// cannot register surfaces as an error instead of a panic.
    pub fn new(config: ProxyConfig) -> Result<Self, ConfigError> {
        validate_config(&config).map_err(ConfigError::Validation)?;
        let routes = Arc::new(RouteTable::from_config(&config.routes)?);
        let cache = Arc::new(ProxyCache::new(
            build_client(&config.timeouts),
            ForwardSettings::from_config(&config.timeouts, &config.limits),
        ));
        let dispatcher = Dispatcher::new(routes, cache);

        let state = AppState {
            dispatcher: dispatcher.clone(),
            matcher: Arc::new(MatchedPathMatcher),
        };

        let router = Self::build_router(dispatcher.routes(), state);
        Ok(Self {
            router,
            config,
            dispatcher,
        })
    }

    /// Build the axum router: one route per template, fallback for the rest.
    fn build_router(routes: &RouteTable, state: AppState) -> Router {
        let mut router = Router::new();
        for template in routes.templates() {
            tracing::info!(template = %template, "Registering route");
            router = router.route(template, any(proxy_handler));
        }

        router
            .fallback(proxy_handler)
            .with_state(state)
            .layer(middleware::from_fn(request_id_middleware))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.dispatcher.routes().len(),
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Shared proxy cache, for inspection.
    pub fn proxy_cache(&self) -> Arc<ProxyCache> {
        Arc::clone(self.dispatcher.cache())
    }
}

/// Main proxy handler, shared by every registered template and the fallback.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let template = state.matcher.matched_template(&request);
    state.dispatcher.handle(template.as_deref(), request).await
}
