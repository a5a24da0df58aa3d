use axum::{
    Extension,
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::server::{
    error::Error,
    extractors::ClientAddress,
    services::{AddonServices, rate_limit_services::RateLimitResult},
};

pub const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";
pub const RATE_LIMIT_RESET: &str = "x-ratelimit-reset";

/// per client rate limiting for the stream routes, everything else is static and cheap
pub async fn rate_limit_middleware(
    ClientAddress(client): ClientAddress,
    Extension(services): Extension<AddonServices>,
    request: Request,
    next: Next,
) -> Response {
    match services.rate_limit.check_rate_limit(&client).await {
        RateLimitResult::Allowed {
            remaining,
            reset_at,
        } => {
            let mut response = next.run(request).await;
            let headers = response.headers_mut();
            headers.insert(RATE_LIMIT_REMAINING, HeaderValue::from(remaining));
            headers.insert(RATE_LIMIT_RESET, HeaderValue::from(reset_at));
            response
        }
        RateLimitResult::RateLimited { retry_after } => {
            warn!("rate limited {} for {}s", client, retry_after);
            Error::TooManyRequests { retry_after }.into_response()
        }
    }
}
