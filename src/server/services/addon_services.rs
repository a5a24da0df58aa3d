use std::sync::Arc;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusHandle;
use tracing::info;
use url::Url;

use crate::{
    config::AppConfig,
    server::{
        dtos::{
            addon_dto::{BINGE_GROUP, STREAM_NAME},
            stream_dto::StreamPresentation,
        },
        parsers::{ExtractionPolicy, ScriptSelection},
        utils::browser_headers::RELAY_USER_AGENT,
    },
};

use super::{
    catalog_services::{DynCatalogService, TmdbCatalogService},
    page_services::{DynPageService, PageService},
    rate_limit_services::{DynRateLimitService, InMemoryRateLimitService, RateLimitConfig},
    stream_services::{DynStreamsService, StreamsService},
};

/// everything the handlers need, handed out through an axum Extension
#[derive(Clone)]
pub struct AddonServices {
    pub streams: DynStreamsService,
    pub rate_limit: DynRateLimitService,
    pub metrics: Option<PrometheusHandle>,
    pub config: Arc<AppConfig>,
}

impl AddonServices {
    pub fn new(config: Arc<AppConfig>) -> Self {
        info!("starting addon services...");

        // one client for the whole process, tmdb and the source site share its pool
        let http = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        let catalog = Arc::new(TmdbCatalogService::new(http.clone(), &config)) as DynCatalogService;
        let pages = Arc::new(PageService::new(http, &config)) as DynPageService;

        Self::with_sources(config, catalog, pages)
    }

    /// builds the services on top of a given lookup and page source, tests swap in mocks here
    pub fn with_sources(
        config: Arc<AppConfig>,
        catalog: DynCatalogService,
        pages: DynPageService,
    ) -> Self {
        let policy = ExtractionPolicy {
            selection: if config.scan_all_scripts {
                ScriptSelection::AnyCandidate
            } else {
                ScriptSelection::FirstCandidate
            },
            force_bitrate: config.force_bitrate,
        };

        let presentation = StreamPresentation {
            name: STREAM_NAME.to_string(),
            binge_group: Some(BINGE_GROUP.to_string()),
            user_agent: RELAY_USER_AGENT.to_string(),
        };

        let streams = Arc::new(StreamsService::new(
            catalog,
            pages,
            policy,
            presentation,
            site_title(config.source_root()),
            config.enrich_titles,
        )) as DynStreamsService;

        let rate_limit = Arc::new(InMemoryRateLimitService::new(RateLimitConfig::from(
            config.as_ref(),
        ))) as DynRateLimitService;

        info!(
            "services ok, first candidate only: {}, force bitrate: {}, trust forwarded: {}",
            !config.scan_all_scripts, config.force_bitrate, config.trust_forwarded_headers
        );

        Self {
            streams,
            rate_limit,
            metrics: None,
            config,
        }
    }

    pub fn with_metrics(mut self, metrics: Option<PrometheusHandle>) -> Self {
        self.metrics = metrics;
        self
    }
}

/// the host part of the source domain, falls back to the raw value if it doesn't parse
fn site_title(domain: &str) -> String {
    Url::parse(domain)
        .ok()
        .and_then(|url| url.host_str().map(|host| host.to_string()))
        .unwrap_or_else(|| domain.to_string())
}
