pub mod api;
pub mod dtos;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod models;
pub mod parsers;
pub mod services;
pub mod utils;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use axum::{
    Extension, Router, ServiceExt,
    extract::Request,
    http::HeaderValue,
    routing::get,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use once_cell::sync::Lazy;
use tower::Layer;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    normalize_path::NormalizePathLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::config::AppConfig;
use api::{AddonController, MetricsController, StreamController};
use services::AddonServices;

static START_TIME: Lazy<Instant> = Lazy::new(Instant::now);

pub fn get_app_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub fn get_uptime_seconds() -> u64 {
    START_TIME.elapsed().as_secs()
}

pub struct ApplicationServer;

impl ApplicationServer {
    /// all routes with their layers, split out of serve so tests can drive it directly
    pub fn router(services: AddonServices) -> Router {
        let prefix = services.config.normalized_prefix();
        let cors = Self::cors_layer(&services.config.cors_origin);

        let addon = Router::new()
            .merge(AddonController::app())
            .merge(StreamController::app());

        // axum doesn't nest at the root anymore, an empty prefix is a plain merge
        let routes = if prefix.is_empty() {
            addon
        } else {
            Router::new().nest(&prefix, addon)
        };

        routes
            .route("/", get(AddonController::status_endpoint))
            .route("/metrics", get(MetricsController::metrics_endpoint))
            .layer(Extension(services))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// "*" lets everyone in, otherwise a comma separated list of origins
    fn cors_layer(cors_origin: &str) -> CorsLayer {
        let layer = CorsLayer::new()
            .allow_methods(Any)
            .allow_headers(Any);

        if cors_origin.trim() == "*" {
            return layer.allow_origin(Any);
        }

        let origins: Vec<HeaderValue> = cors_origin
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .filter_map(|o| o.parse().ok())
            .collect();

        layer.allow_origin(AllowOrigin::list(origins))
    }

    pub async fn serve(config: Arc<AppConfig>) -> anyhow::Result<()> {
        Lazy::force(&START_TIME);

        let metrics = match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!("prometheus recorder not installed: {}", e);
                None
            }
        };

        let services = AddonServices::new(config.clone()).with_metrics(metrics);
        let app = NormalizePathLayer::trim_trailing_slash().layer(Self::router(services));

        let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {}", addr))?;

        info!("relay listening on {}", addr);

        axum::serve(
            listener,
            ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("error while serving the relay")?;

        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {}", e);
        // without a signal handler just keep serving
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received, draining connections...");
}
