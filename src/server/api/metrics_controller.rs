use axum::{
    Extension,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::server::services::AddonServices;

pub struct MetricsController;

impl MetricsController {
    /// prometheus text format, 404 when no recorder got installed (tests, or a second server in
    /// the same process)
    pub async fn metrics_endpoint(Extension(services): Extension<AddonServices>) -> Response {
        match services.metrics {
            Some(handle) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
                handle.render(),
            )
                .into_response(),
            None => StatusCode::NOT_FOUND.into_response(),
        }
    }
}
