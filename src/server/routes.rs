//! Router configuration.
//!
//! # Route Structure
//!
//! ```text
//! /health                                - Health check
//! /sources                               - List (GET) or drop (DELETE) stored datasets
//! /frames/{image_id}                     - Raw frame samples
//! /frames/{image_id}/info                - Frame description
//! /metadata/{module_type}/{image_id}     - Metadata module
//! ```
//!
//! # Example
//!
//! ```ignore
//! use multiframe_loader::server::{create_router, AppState, RouterConfig};
//!
//! let state = AppState::new(store, TruncationPolicy::ZeroFill);
//! let config = RouterConfig::new()
//!     .with_cors_origins(vec!["https://viewer.example.com".to_string()]);
//!
//! let router = create_router(state, config);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::time::Duration;

use axum::{routing::get, Router};
use http::header::CONTENT_TYPE;
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    clear_sources_handler, frame_handler, frame_info_handler, health_handler, metadata_handler,
    sources_handler, AppState,
};

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Cache-Control max-age in seconds
    pub cache_max_age: u32,

    pub enable_tracing: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RouterConfig {
    /// Any CORS origin, 1 hour max-age, tracing on.
    pub fn new() -> Self {
        Self {
            cors_origins: None,
            cache_max_age: 3600,
            enable_tracing: true,
        }
    }

    /// Set specific allowed CORS origins.
    ///
    /// An empty vec disallows all cross-origin requests.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    pub fn with_cors_any_origin(mut self) -> Self {
        self.cors_origins = None;
        self
    }

    pub fn with_cache_max_age(mut self, seconds: u32) -> Self {
        self.cache_max_age = seconds;
        self
    }

    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Build the application router.
pub fn create_router(state: AppState, config: RouterConfig) -> Router {
    let state = state.with_cache_max_age(config.cache_max_age);
    let cors = build_cors_layer(&config);

    let router = Router::new()
        .route("/health", get(health_handler))
        .route(
            "/sources",
            get(sources_handler).delete(clear_sources_handler),
        )
        .route("/frames/{image_id}", get(frame_handler))
        .route("/frames/{image_id}/info", get(frame_info_handler))
        .route("/metadata/{module_type}/{image_id}", get(metadata_handler))
        .with_state(state)
        .layer(cors);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::HEAD, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .expose_headers(Any)
        .max_age(Duration::from_secs(86400));

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}
