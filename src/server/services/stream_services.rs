// ties the lookup, the page fetch and the parser together, every failure in here ends up as an
// empty stream list so players just show "no streams" instead of an error
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::server::{
    dtos::stream_dto::{StreamDescriptor, StreamPresentation, StreamsResponse},
    models::{ContentRequest, MediaType, ResolvedCatalog},
    parsers::{ExtractionPolicy, extract_stream_link},
    services::{catalog_services::DynCatalogService, page_services::DynPageService},
};

pub type DynStreamsService = Arc<dyn StreamsServiceTrait + Send + Sync>;

#[async_trait]
pub trait StreamsServiceTrait {
    async fn get_streams(&self, request: &ContentRequest) -> StreamsResponse;
}

pub struct StreamsService {
    catalog: DynCatalogService,
    pages: DynPageService,
    policy: ExtractionPolicy,
    presentation: StreamPresentation,
    // shown as the title when there is nothing better, the source site's host
    default_title: String,
    enrich_titles: bool,
}

fn record_outcome(outcome: &'static str) {
    metrics::counter!("stream_requests_total", "outcome" => outcome).increment(1);
}

impl StreamsService {
    pub fn new(
        catalog: DynCatalogService,
        pages: DynPageService,
        policy: ExtractionPolicy,
        presentation: StreamPresentation,
        default_title: String,
        enrich_titles: bool,
    ) -> Self {
        Self {
            catalog,
            pages,
            policy,
            presentation,
            default_title,
            enrich_titles,
        }
    }

    /// "{title}" for movies, "{title} S{s}E{e} - {episode}" for episodes, falls back to the
    /// site host whenever tmdb has nothing
    async fn compose_title(&self, request: &ContentRequest, resolved: &ResolvedCatalog) -> String {
        let title = match resolved.title.clone() {
            Some(title) => Some(title),
            None => match self.catalog.title(&resolved.id, request.media_type).await {
                Ok(title) => title,
                Err(e) => {
                    warn!("title lookup failed for {}: {}", resolved.id, e);
                    None
                }
            },
        };

        let Some(title) = title else {
            return self.default_title.clone();
        };

        let Some((season, episode)) = request.episode_coordinates() else {
            return title;
        };

        let episode_name = if request.media_type == MediaType::Series {
            match self.catalog.episode_title(&resolved.id, season, episode).await {
                Ok(name) => name,
                Err(e) => {
                    warn!(
                        "episode lookup failed for {} S{}E{}: {}",
                        resolved.id, season, episode, e
                    );
                    None
                }
            }
        } else {
            None
        };

        match episode_name {
            Some(name) => format!("{} S{}E{} - {}", title, season, episode, name),
            None => format!("{} S{}E{}", title, season, episode),
        }
    }
}

#[async_trait]
impl StreamsServiceTrait for StreamsService {
    async fn get_streams(&self, request: &ContentRequest) -> StreamsResponse {
        if request.base_id.is_empty() {
            info!("empty content id, nothing to resolve");
            record_outcome("unresolved");
            return StreamsResponse::empty();
        }

        let resolved = match self.catalog.resolve(&request.base_id).await {
            Ok(Some(resolved)) => resolved,
            Ok(None) => {
                info!("no catalog id for {}", request.base_id);
                record_outcome("unresolved");
                return StreamsResponse::empty();
            }
            Err(e) => {
                warn!("catalog lookup failed for {}: {}", request.base_id, e);
                record_outcome("unresolved");
                return StreamsResponse::empty();
            }
        };

        debug!("{} resolved to catalog id {}", request.base_id, resolved.id);

        let html = match self.pages.fetch_player_page(request, &resolved.id).await {
            Ok(html) => html,
            Err(e) => {
                warn!("player page fetch failed for {}: {}", resolved.id, e);
                record_outcome("fetch_failed");
                return StreamsResponse::empty();
            }
        };

        let Some(link) = extract_stream_link(&html, &self.policy) else {
            info!("no stream link in player page for {}", resolved.id);
            record_outcome("no_link");
            return StreamsResponse::empty();
        };

        info!(
            "extracted stream for {} (expires {}, bitrate {}, fhd {})",
            resolved.id, link.expires, link.flags.forced_bitrate, link.flags.forced_hd
        );

        let title = if self.enrich_titles {
            self.compose_title(request, &resolved).await
        } else {
            self.default_title.clone()
        };

        record_outcome("found");
        StreamsResponse {
            streams: vec![StreamDescriptor::from_link(&link, title, &self.presentation)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::error::Error;
    use crate::server::services::catalog_services::MockCatalogServiceTrait;
    use crate::server::services::page_services::MockPageServiceTrait;

    const PLAYER_PAGE: &str = r#"<html><body><script>
        window.masterPlaylist = {
            params: { 'token': 'tok123', 'expires': '1700000000' },
            url: 'https://vixsrc.to/playlist/278?b=1',
        }
    </script></body></html>"#;

    fn presentation() -> StreamPresentation {
        StreamPresentation {
            name: "UFO".to_string(),
            binge_group: Some("streamingcommunity".to_string()),
            user_agent: "agent/1.0".to_string(),
        }
    }

    fn service(
        catalog: MockCatalogServiceTrait,
        pages: MockPageServiceTrait,
        enrich_titles: bool,
    ) -> StreamsService {
        StreamsService::new(
            Arc::new(catalog),
            Arc::new(pages),
            ExtractionPolicy::default(),
            presentation(),
            "vixsrc.to".to_string(),
            enrich_titles,
        )
    }

    fn movie(id: &str) -> ContentRequest {
        ContentRequest {
            base_id: id.to_string(),
            season: None,
            episode: None,
            media_type: MediaType::Movie,
        }
    }

    fn episode(id: &str) -> ContentRequest {
        ContentRequest {
            base_id: id.to_string(),
            season: Some("2".to_string()),
            episode: Some("5".to_string()),
            media_type: MediaType::Series,
        }
    }

    #[tokio::test]
    async fn returns_single_stream_for_resolved_movie() {
        let mut catalog = MockCatalogServiceTrait::new();
        catalog
            .expect_resolve()
            .withf(|id| id == "tt0111161")
            .times(1)
            .returning(|_| Ok(Some(ResolvedCatalog::bare("278"))));

        let mut pages = MockPageServiceTrait::new();
        pages
            .expect_fetch_player_page()
            .withf(|_, id| id == "278")
            .times(1)
            .returning(|_, _| Ok(PLAYER_PAGE.to_string()));

        let response = service(catalog, pages, false)
            .get_streams(&movie("tt0111161"))
            .await;

        assert_eq!(response.streams.len(), 1);
        let stream = &response.streams[0];
        assert_eq!(stream.title, "vixsrc.to");
        assert_eq!(
            stream.url,
            "https://vixsrc.to/playlist/278.m3u8?b=1&token=tok123&expires=1700000000"
        );
        assert!(stream.behavior_hints.not_web_ready);
    }

    #[tokio::test]
    async fn unresolved_imdb_id_gives_empty_list_without_fetching() {
        let mut catalog = MockCatalogServiceTrait::new();
        catalog.expect_resolve().times(1).returning(|_| Ok(None));

        let mut pages = MockPageServiceTrait::new();
        pages.expect_fetch_player_page().times(0);

        let response = service(catalog, pages, false)
            .get_streams(&movie("tt0111161"))
            .await;
        assert!(response.streams.is_empty());
    }

    #[tokio::test]
    async fn lookup_errors_collapse_to_empty_list() {
        let mut catalog = MockCatalogServiceTrait::new();
        catalog.expect_resolve().times(1).returning(|_| {
            Err(Error::UpstreamStatus {
                service: "tmdb",
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            })
        });

        let mut pages = MockPageServiceTrait::new();
        pages.expect_fetch_player_page().times(0);

        let response = service(catalog, pages, false)
            .get_streams(&movie("tt0111161"))
            .await;
        assert!(response.streams.is_empty());
    }

    #[tokio::test]
    async fn empty_base_id_never_reaches_the_resolver() {
        let mut catalog = MockCatalogServiceTrait::new();
        catalog.expect_resolve().times(0);
        let mut pages = MockPageServiceTrait::new();
        pages.expect_fetch_player_page().times(0);

        let response = service(catalog, pages, false).get_streams(&movie("")).await;
        assert!(response.streams.is_empty());
    }

    #[tokio::test]
    async fn episode_request_passes_coordinates_to_fetcher() {
        let mut catalog = MockCatalogServiceTrait::new();
        catalog
            .expect_resolve()
            .withf(|id| id == "12345")
            .returning(|id| Ok(Some(ResolvedCatalog::bare(id))));

        let mut pages = MockPageServiceTrait::new();
        pages
            .expect_fetch_player_page()
            .withf(|request, id| {
                id == "12345"
                    && request.season.as_deref() == Some("2")
                    && request.episode.as_deref() == Some("5")
            })
            .times(1)
            .returning(|_, _| Ok(PLAYER_PAGE.to_string()));

        let response = service(catalog, pages, false)
            .get_streams(&episode("12345"))
            .await;
        assert_eq!(response.streams.len(), 1);
    }

    #[tokio::test]
    async fn fetch_failure_and_parse_miss_give_empty_list() {
        let mut catalog = MockCatalogServiceTrait::new();
        catalog
            .expect_resolve()
            .returning(|_| Ok(Some(ResolvedCatalog::bare("278"))));
        let mut pages = MockPageServiceTrait::new();
        pages.expect_fetch_player_page().returning(|_, _| {
            Err(Error::UpstreamStatus {
                service: "source",
                status: reqwest::StatusCode::FORBIDDEN,
            })
        });
        let response = service(catalog, pages, false).get_streams(&movie("278")).await;
        assert!(response.streams.is_empty());

        let mut catalog = MockCatalogServiceTrait::new();
        catalog
            .expect_resolve()
            .returning(|_| Ok(Some(ResolvedCatalog::bare("278"))));
        let mut pages = MockPageServiceTrait::new();
        pages
            .expect_fetch_player_page()
            .returning(|_, _| Ok("<html><script>var nothing = 1;</script></html>".to_string()));
        let response = service(catalog, pages, false).get_streams(&movie("278")).await;
        assert!(response.streams.is_empty());
    }

    #[tokio::test]
    async fn enriched_episode_title_uses_show_and_episode_names() {
        let mut catalog = MockCatalogServiceTrait::new();
        catalog.expect_resolve().returning(|_| {
            Ok(Some(ResolvedCatalog {
                id: "1399".to_string(),
                title: Some("Il Trono di Spade".to_string()),
            }))
        });
        catalog.expect_title().times(0);
        catalog
            .expect_episode_title()
            .withf(|id, season, episode| id == "1399" && season == "2" && episode == "5")
            .returning(|_, _, _| Ok(Some("Il Nord non dimentica".to_string())));

        let mut pages = MockPageServiceTrait::new();
        pages
            .expect_fetch_player_page()
            .returning(|_, _| Ok(PLAYER_PAGE.to_string()));

        let response = service(catalog, pages, true)
            .get_streams(&episode("tt0944947"))
            .await;
        assert_eq!(
            response.streams[0].title,
            "Il Trono di Spade S2E5 - Il Nord non dimentica"
        );
    }

    #[tokio::test]
    async fn enrichment_falls_back_to_site_title() {
        let mut catalog = MockCatalogServiceTrait::new();
        catalog
            .expect_resolve()
            .returning(|_| Ok(Some(ResolvedCatalog::bare("278"))));
        catalog.expect_title().returning(|_, _| {
            Err(Error::UpstreamStatus {
                service: "tmdb",
                status: reqwest::StatusCode::NOT_FOUND,
            })
        });

        let mut pages = MockPageServiceTrait::new();
        pages
            .expect_fetch_player_page()
            .returning(|_, _| Ok(PLAYER_PAGE.to_string()));

        let response = service(catalog, pages, true).get_streams(&movie("278")).await;
        assert_eq!(response.streams[0].title, "vixsrc.to");
    }
}
