//! Pochi Gateway: HTTP surface for the chat proxy.
//! Web client at `/api/chat`, wearable client at `/api/v1/chat`.

pub mod error;
pub mod handlers;

use axum::{
    body::Body,
    http::{header, Method, Request},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use pochi_core::{ChatPipeline, ConfigError, ProxyConfig};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};

/// Shared, read-only per process.
pub struct AppState {
    pub config: Arc<ProxyConfig>,
    /// `None` when no API key is configured; chat routes then answer 500 without calling upstream.
    pub pipeline: Option<ChatPipeline>,
}

impl AppState {
    pub fn new(config: ProxyConfig, pipeline: Option<ChatPipeline>) -> Self {
        Self {
            config: Arc::new(config),
            pipeline,
        }
    }

    /// A missing key still yields a serving state; any other setup failure is fatal.
    pub fn from_config(config: ProxyConfig) -> Result<Self, ConfigError> {
        let pipeline = match ChatPipeline::from_config(&config) {
            Ok(p) => Some(p),
            Err(ConfigError::MissingApiKey) => {
                tracing::warn!(
                    "No API key: set CLAUDE_API_KEY or ANTHROPIC_API_KEY. Chat endpoints will return 500."
                );
                None
            }
            Err(e) => return Err(e),
        };
        Ok(Self::new(config, pipeline))
    }
}

pub fn build_app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route(
            "/api/chat",
            post(handlers::chat::web_chat).fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/v1/chat",
            post(handlers::chat::wear_chat).fallback(handlers::method_not_allowed),
        )
        .with_state(state)
        .layer(cors)
        .layer(axum::middleware::from_fn(log_traffic))
}

async fn log_traffic(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri_path = request.uri().path().to_string();
    let started = Instant::now();
    let response = next.run(request).await;
    tracing::info!(
        "{} {} -> {} ({} ms)",
        method,
        uri_path,
        response.status().as_u16(),
        started.elapsed().as_millis()
    );
    response
}
