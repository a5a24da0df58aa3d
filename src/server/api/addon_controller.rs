use axum::{
    Extension, Json, Router,
    extract::Path,
    http::{HeaderMap, header},
    routing::get,
};

use crate::server::{
    dtos::addon_dto::{
        ADDON_LOGO, ADDON_NAME, CatalogResponse, Manifest, MetaPreview, MetaResponse,
        StatusResponse,
    },
    get_app_version, get_uptime_seconds,
    services::AddonServices,
};

pub struct AddonController;

impl AddonController {
    /// the static side of the addon protocol, mounted under the route prefix
    pub fn app() -> Router {
        Router::new()
            .route("/manifest.json", get(Self::manifest_endpoint))
            .route("/meta/{type}/{file}", get(Self::meta_endpoint))
            .route("/catalog/{type}/{file}", get(Self::catalog_endpoint))
    }

    pub async fn manifest_endpoint() -> Json<Manifest> {
        Json(Manifest::current())
    }

    /// there is no catalog behind this addon, every meta is the addon itself
    pub async fn meta_endpoint(Path((media_type, file)): Path<(String, String)>) -> Json<MetaResponse> {
        let id = file.strip_suffix(".json").unwrap_or(&file).to_string();

        Json(MetaResponse {
            meta: MetaPreview {
                id,
                media_type,
                name: ADDON_NAME.to_string(),
                poster: ADDON_LOGO.to_string(),
            },
        })
    }

    pub async fn catalog_endpoint() -> Json<CatalogResponse> {
        Json(CatalogResponse::default())
    }

    /// GET / - status plus the absolute manifest url to paste into a player
    pub async fn status_endpoint(
        Extension(services): Extension<AddonServices>,
        headers: HeaderMap,
    ) -> Json<StatusResponse> {
        let host = headers
            .get("x-forwarded-host")
            .or_else(|| headers.get(header::HOST))
            .and_then(|h| h.to_str().ok())
            .unwrap_or("localhost");
        let scheme = headers
            .get("x-forwarded-proto")
            .and_then(|h| h.to_str().ok())
            .unwrap_or("http");

        Json(StatusResponse {
            status: "online".to_string(),
            addon: ADDON_NAME.to_string(),
            version: get_app_version().to_string(),
            uptime_seconds: get_uptime_seconds(),
            manifest: format!(
                "{}://{}{}/manifest.json",
                scheme,
                host,
                services.config.normalized_prefix()
            ),
        })
    }
}
