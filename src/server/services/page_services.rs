use async_trait::async_trait;
use mockall::automock;
use reqwest::header::{self, HeaderValue};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::{
    config::AppConfig,
    server::{
        error::{AppResult, Error},
        models::ContentRequest,
        utils::browser_headers::{BrowserHeaders, RELAY_USER_AGENT},
    },
};

pub type DynPageService = Arc<dyn PageServiceTrait + Send + Sync>;

#[automock]
#[async_trait]
pub trait PageServiceTrait {
    /// fetches the player page for a movie or an episode, anything but a 200 is an error
    async fn fetch_player_page(
        &self,
        request: &ContentRequest,
        catalog_id: &str,
    ) -> AppResult<String>;
}

pub struct PageService {
    http_client: reqwest::Client,
    domain: String,
    timeout: Duration,
}

impl PageService {
    pub fn new(http_client: reqwest::Client, config: &AppConfig) -> Self {
        Self {
            http_client,
            domain: config.source_root().to_string(),
            timeout: Duration::from_secs(config.fetch_timeout_secs),
        }
    }

    /// `/tv/{id}/{season}/{episode}/` once both coordinates are known, `/movie/{id}/` otherwise
    pub fn page_url(&self, request: &ContentRequest, catalog_id: &str) -> String {
        let catalog_id = urlencoding::encode(catalog_id);

        match request.episode_coordinates() {
            Some((season, episode)) => format!(
                "{}/tv/{}/{}/{}/",
                self.domain,
                catalog_id,
                urlencoding::encode(season),
                urlencoding::encode(episode)
            ),
            None => format!("{}/movie/{}/", self.domain, catalog_id),
        }
    }
}

#[async_trait]
impl PageServiceTrait for PageService {
    async fn fetch_player_page(
        &self,
        request: &ContentRequest,
        catalog_id: &str,
    ) -> AppResult<String> {
        let url = self.page_url(request, catalog_id);
        info!("fetching player page: {}", url);

        let mut headers = BrowserHeaders::generate();
        // the playlist token gets tied to this agent, players are told to send the same one
        headers.insert(header::USER_AGENT, HeaderValue::from_static(RELAY_USER_AGENT));
        let referer = HeaderValue::from_str(&format!("{}/", self.domain)).map_err(|e| {
            Error::InternalServerErrorWithContext(format!("invalid referer for source site: {}", e))
        })?;
        headers.insert(header::REFERER, referer);

        let response = self
            .http_client
            .get(&url)
            .headers(headers)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(Error::UpstreamStatus {
                service: "source",
                status,
            });
        }

        let body = response.text().await?;
        debug!("player page is {} bytes", body.len());

        Ok(body)
    }
}
