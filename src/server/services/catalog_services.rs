// tmdb lookups, imdb ids get turned into the numeric ids the source site wants
use async_trait::async_trait;
use mockall::automock;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::{
    config::AppConfig,
    server::{
        error::{AppResult, Error},
        models::{MediaType, ResolvedCatalog},
    },
};

static IMDB_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^tt\d+$").expect("Static regex should compile"));

pub type DynCatalogService = Arc<dyn CatalogServiceTrait + Send + Sync>;

/// what tmdb's /find answers with, only the first hit of each list matters
#[derive(Debug, Deserialize)]
struct TmdbFindResponse {
    #[serde(default)]
    movie_results: Vec<TmdbMovieResult>,
    #[serde(default)]
    tv_results: Vec<TmdbTvResult>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovieResult {
    id: u64,
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TmdbTvResult {
    id: u64,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovieDetail {
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TmdbNamedDetail {
    name: Option<String>,
}

#[automock]
#[async_trait]
pub trait CatalogServiceTrait {
    /// imdb id -> tmdb id, numeric ids pass straight through without a request
    async fn resolve(&self, base_id: &str) -> AppResult<Option<ResolvedCatalog>>;
    /// display title of a movie or show by tmdb id
    async fn title(&self, catalog_id: &str, media_type: MediaType) -> AppResult<Option<String>>;
    /// episode name, only used for series titles
    async fn episode_title(
        &self,
        catalog_id: &str,
        season: &str,
        episode: &str,
    ) -> AppResult<Option<String>>;
}

pub fn is_imdb_id(id: &str) -> bool {
    IMDB_ID_RE.is_match(id)
}

pub fn is_catalog_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())
}

pub struct TmdbCatalogService {
    http_client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    language: String,
    timeout: Duration,
}

impl TmdbCatalogService {
    pub fn new(http_client: reqwest::Client, config: &AppConfig) -> Self {
        Self {
            http_client,
            base_url: config.tmdb_base_url.trim_end_matches('/').to_string(),
            api_key: config
                .tmdb_api_key
                .clone()
                .filter(|key| !key.trim().is_empty()),
            language: config.tmdb_language.clone(),
            timeout: Duration::from_secs(config.tmdb_timeout_secs),
        }
    }

    /// `None` without an api key, tmdb would only answer 401 anyway
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> AppResult<Option<T>> {
        let Some(api_key) = self.api_key.as_deref() else {
            warn!("no tmdb api key configured, skipping lookup of {}", path);
            return Ok(None);
        };

        let mut all_params = vec![("api_key", api_key), ("language", self.language.as_str())];
        all_params.extend_from_slice(params);

        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "tmdb request");

        let response = self
            .http_client
            .get(&url)
            .query(&all_params)
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::UpstreamStatus {
                service: "tmdb",
                status: response.status(),
            });
        }

        Ok(Some(response.json::<T>().await?))
    }
}

#[async_trait]
impl CatalogServiceTrait for TmdbCatalogService {
    async fn resolve(&self, base_id: &str) -> AppResult<Option<ResolvedCatalog>> {
        if is_catalog_id(base_id) {
            return Ok(Some(ResolvedCatalog::bare(base_id)));
        }

        if !is_imdb_id(base_id) {
            debug!("'{}' is neither an imdb id nor a catalog id", base_id);
            return Ok(None);
        }

        let Some(found) = self
            .get_json::<TmdbFindResponse>(
                &format!("/find/{}", base_id),
                &[("external_source", "imdb_id")],
            )
            .await?
        else {
            return Ok(None);
        };

        // movies win over shows when an id somehow maps to both
        if let Some(movie) = found.movie_results.into_iter().next() {
            return Ok(Some(ResolvedCatalog {
                id: movie.id.to_string(),
                title: movie.title,
            }));
        }

        Ok(found.tv_results.into_iter().next().map(|show| ResolvedCatalog {
            id: show.id.to_string(),
            title: show.name,
        }))
    }

    async fn title(&self, catalog_id: &str, media_type: MediaType) -> AppResult<Option<String>> {
        match media_type {
            MediaType::Movie => {
                let detail: Option<TmdbMovieDetail> =
                    self.get_json(&format!("/movie/{}", catalog_id), &[]).await?;
                Ok(detail.and_then(|d| d.title))
            }
            MediaType::Series => {
                let detail: Option<TmdbNamedDetail> =
                    self.get_json(&format!("/tv/{}", catalog_id), &[]).await?;
                Ok(detail.and_then(|d| d.name))
            }
        }
    }

    async fn episode_title(
        &self,
        catalog_id: &str,
        season: &str,
        episode: &str,
    ) -> AppResult<Option<String>> {
        let path = format!(
            "/tv/{}/season/{}/episode/{}",
            catalog_id,
            urlencoding::encode(season),
            urlencoding::encode(episode)
        );
        let detail: Option<TmdbNamedDetail> = self.get_json(&path, &[]).await?;
        Ok(detail.and_then(|d| d.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service_for(server: &MockServer) -> TmdbCatalogService {
        let config = AppConfig {
            tmdb_api_key: Some("test-key".to_string()),
            tmdb_base_url: server.uri(),
            ..Default::default()
        };
        TmdbCatalogService::new(reqwest::Client::new(), &config)
    }

    #[test]
    fn recognizes_id_shapes() {
        assert!(is_imdb_id("tt0111161"));
        assert!(!is_imdb_id("tt"));
        assert!(!is_imdb_id("tt12ab"));
        assert!(!is_imdb_id("12345"));

        assert!(is_catalog_id("12345"));
        assert!(!is_catalog_id(""));
        assert!(!is_catalog_id("12a45"));
    }

    #[tokio::test]
    async fn resolves_movie_results_first() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/find/tt0111161"))
            .and(query_param("external_source", "imdb_id"))
            .and(query_param("api_key", "test-key"))
            .and(query_param("language", "it"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "movie_results": [{ "id": 278, "title": "Le ali della libertà" }],
                "tv_results": [{ "id": 999, "name": "Not this one" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let resolved = service_for(&server).resolve("tt0111161").await.unwrap();
        assert_eq!(
            resolved,
            Some(ResolvedCatalog {
                id: "278".to_string(),
                title: Some("Le ali della libertà".to_string()),
            })
        );
    }

    #[tokio::test]
    async fn falls_back_to_tv_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/find/tt0944947"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "movie_results": [],
                "tv_results": [{ "id": 1399, "name": "Il Trono di Spade" }]
            })))
            .mount(&server)
            .await;

        let resolved = service_for(&server).resolve("tt0944947").await.unwrap().unwrap();
        assert_eq!(resolved.id, "1399");
        assert_eq!(resolved.title.as_deref(), Some("Il Trono di Spade"));
    }

    #[tokio::test]
    async fn empty_results_are_unresolved() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/find/tt0000001"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "movie_results": [],
                "tv_results": [],
                "person_results": []
            })))
            .mount(&server)
            .await;

        let resolved = service_for(&server).resolve("tt0000001").await.unwrap();
        assert_eq!(resolved, None);
    }

    #[tokio::test]
    async fn error_status_is_an_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let result = service_for(&server).resolve("tt0111161").await;
        match result {
            Err(Error::UpstreamStatus { service, status }) => {
                assert_eq!(service, "tmdb");
                assert_eq!(status, reqwest::StatusCode::UNAUTHORIZED);
            }
            other => panic!("Expected UpstreamStatus error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn numeric_ids_never_hit_the_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let service = service_for(&server);
        assert_eq!(
            service.resolve("12345").await.unwrap(),
            Some(ResolvedCatalog::bare("12345"))
        );
        assert_eq!(service.resolve("").await.unwrap(), None);
        assert_eq!(service.resolve("not-an-id").await.unwrap(), None);
    }

    #[tokio::test]
    async fn missing_api_key_leaves_imdb_ids_unresolved() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .expect(0)
            .mount(&server)
            .await;

        let config = AppConfig {
            tmdb_api_key: None,
            tmdb_base_url: server.uri(),
            ..Default::default()
        };
        let service = TmdbCatalogService::new(reqwest::Client::new(), &config);

        assert_eq!(service.resolve("tt0111161").await.unwrap(), None);
        assert_eq!(
            service.resolve("278").await.unwrap(),
            Some(ResolvedCatalog::bare("278"))
        );
        assert_eq!(service.title("278", MediaType::Movie).await.unwrap(), None);
    }

    #[tokio::test]
    async fn looks_up_titles_and_episode_names() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/movie/278"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "title": "Le ali della libertà" })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/tv/1399"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "Il Trono di Spade" })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/tv/1399/season/1/episode/2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "La strada del re" })))
            .mount(&server)
            .await;

        let service = service_for(&server);
        assert_eq!(
            service.title("278", MediaType::Movie).await.unwrap().as_deref(),
            Some("Le ali della libertà")
        );
        assert_eq!(
            service.title("1399", MediaType::Series).await.unwrap().as_deref(),
            Some("Il Trono di Spade")
        );
        assert_eq!(
            service.episode_title("1399", "1", "2").await.unwrap().as_deref(),
            Some("La strada del re")
        );
    }
}
