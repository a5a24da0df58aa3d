use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use std::convert::Infallible;
use std::net::SocketAddr;
use tracing::debug;

use crate::server::services::AddonServices;

/// the address a request came from, used as the rate limit key
///
/// the socket peer by default. behind a proxy (vercel, fly, nginx) with `trust_forwarded_headers`
/// on, the first X-Forwarded-For entry wins, then X-Real-IP. clients set those headers freely,
/// so without a proxy they'd get a fresh window per request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientAddress(pub String);

fn forwarded_address(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            parts
                .headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}

pub fn client_address_from_parts(parts: &Parts, trust_forwarded: bool) -> String {
    let forwarded = if trust_forwarded {
        forwarded_address(parts)
    } else {
        None
    };

    forwarded
        .or_else(|| {
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ci| ci.0.ip().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

impl<S> FromRequestParts<S> for ClientAddress
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let trust_forwarded = parts
            .extensions
            .get::<AddonServices>()
            .is_some_and(|services| services.config.trust_forwarded_headers);

        let address = client_address_from_parts(parts, trust_forwarded);
        debug!("client address: {}", address);
        Ok(ClientAddress(address))
    }
}
