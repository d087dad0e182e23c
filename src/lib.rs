pub mod api;
pub mod client;
pub mod config;
pub mod models;
pub mod services;
pub mod utils;

#[cfg(test)]
mod test_support;

use crate::config::ServerConfig;
use crate::models::{X_COMPRESSED_SIZE, X_COMPRESSION_RATIO, X_ORIGINAL_SIZE};
use crate::services::compressor::{CompressionOptions, PdfCompressor};
use axum::{
    Json, Router,
    http::{HeaderValue, Method, Request, Response, header},
    middleware::from_fn,
    routing::{get, post},
};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{Span, info};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::compress::compress_pdf,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            models::CompressForm,
            api::error::ErrorResponse,
            api::handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "compress", description = "PDF compression endpoints"),
        (name = "system", description = "Service status")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub compressor: PdfCompressor,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            compressor: PdfCompressor::new(CompressionOptions::from(&config)),
            config,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .route("/health", get(api::handlers::health::health_check))
        .route("/api/compress", post(api::handlers::compress::compress_pdf))
        .layer(from_fn(api::middleware::metrics::metrics_middleware))
        // Inside the request-id layer so the span sees minted ids
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    let request_id = request
                        .headers()
                        .get(&api::middleware::request_id::X_REQUEST_ID)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("unknown");
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id,
                    )
                })
                .on_request(|request: &Request<_>, _span: &Span| {
                    info!("📥 {} {}", request.method(), request.uri());
                })
                .on_response(|response: &Response<_>, latency: Duration, _span: &Span| {
                    info!(
                        "📤 Finished in {:?} with status {}",
                        latency,
                        response.status()
                    );
                }),
        )
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
        .layer(cors)
        .layer(axum::extract::DefaultBodyLimit::max(state.config.max_body_size))
        .with_state(state)
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origin = if config.allows_any_origin() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(
            config
                .allowed_origins
                .iter()
                .filter_map(|o| HeaderValue::from_str(o).ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
        .expose_headers([
            header::CONTENT_DISPOSITION,
            X_ORIGINAL_SIZE,
            X_COMPRESSED_SIZE,
            X_COMPRESSION_RATIO,
        ])
}
