use axum::{Extension, Json, Router, extract::Path, middleware, routing::get};
use tracing::info;

use crate::server::{
    dtos::stream_dto::StreamsResponse,
    error::{AppResult, Error},
    middleware::rate_limit_middleware,
    models::MediaType,
    parsers::parse_content_id,
    services::AddonServices,
};

pub struct StreamController;

impl StreamController {
    pub fn app() -> Router {
        Router::new()
            .route("/stream/{type}/{file}", get(Self::stream_endpoint))
            .route_layer(middleware::from_fn(rate_limit_middleware))
    }

    /// GET /stream/{type}/{id}.json
    ///
    /// `id` is `base[:season:episode]`, e.g. `tt0111161` or `tt0944947:1:2`. Lookup, fetch and
    /// parse failures all answer 200 with an empty list, only an unknown type is a 400.
    pub async fn stream_endpoint(
        Extension(services): Extension<AddonServices>,
        Path((media_type, file)): Path<(String, String)>,
    ) -> AppResult<Json<StreamsResponse>> {
        let media_type: MediaType = media_type.parse()?;

        let raw_id = file
            .strip_suffix(".json")
            .ok_or_else(|| Error::NotFound(format!("no such resource '{}'", file)))?;

        let request = parse_content_id(raw_id, media_type);
        info!(
            "stream request for {} {} (season {:?}, episode {:?})",
            request.media_type, request.base_id, request.season, request.episode
        );

        Ok(Json(services.streams.get_streams(&request).await))
    }
}
