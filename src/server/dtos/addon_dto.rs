use serde::{Deserialize, Serialize};

pub const ADDON_ID: &str = "org.stremio.mammamia.ufo";
pub const ADDON_NAME: &str = "UFO addon";
pub const ADDON_DESCRIPTION: &str = "VixSrc Stream";
pub const ADDON_LOGO: &str = "https://static.vecteezy.com/system/resources/thumbnails/050/270/611/small/ufo-logo-design-no-background-perfect-for-print-on-demand-t-shirt-design-png.png";
pub const STREAM_NAME: &str = "🛸UFO";
pub const BINGE_GROUP: &str = "streamingcommunity";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub id: String,
    pub version: String,
    pub name: String,
    pub description: String,
    pub logo: String,
    pub resources: Vec<String>,
    pub types: Vec<String>,
    pub catalogs: Vec<serde_json::Value>,
    pub id_prefixes: Vec<String>,
    pub behavior_hints: ManifestBehaviorHints,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestBehaviorHints {
    pub configurable: bool,
}

impl Manifest {
    pub fn current() -> Self {
        Self {
            id: ADDON_ID.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            name: ADDON_NAME.to_string(),
            description: ADDON_DESCRIPTION.to_string(),
            logo: ADDON_LOGO.to_string(),
            resources: vec!["stream".to_string()],
            types: vec!["movie".to_string(), "series".to_string()],
            catalogs: Vec::new(),
            id_prefixes: vec!["tt".to_string()],
            behavior_hints: ManifestBehaviorHints {
                configurable: false,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaPreview {
    pub id: String,
    #[serde(rename = "type")]
    pub media_type: String,
    pub name: String,
    pub poster: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaResponse {
    pub meta: MetaPreview,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogResponse {
    pub metas: Vec<MetaPreview>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub addon: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub manifest: String,
}
