use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::server::models::ExtractedLink;

/// fixed bits of every stream entry the addon hands out
#[derive(Debug, Clone)]
pub struct StreamPresentation {
    pub name: String,
    pub binge_group: Option<String>,
    pub user_agent: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamsResponse {
    pub streams: Vec<StreamDescriptor>,
}

impl StreamsResponse {
    pub fn empty() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamDescriptor {
    pub name: String,
    pub title: String,
    pub url: String,
    pub behavior_hints: BehaviorHints,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorHints {
    pub not_web_ready: bool,
    pub proxy_headers: ProxyHeaders,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binge_group: Option<String>,
}

/// headers the player has to send when it pulls the playlist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyHeaders {
    pub request: BTreeMap<String, String>,
}

impl StreamDescriptor {
    /// the playlist needs our user agent, so it's never marked as directly web playable
    pub fn from_link(link: &ExtractedLink, title: String, presentation: &StreamPresentation) -> Self {
        let mut request = BTreeMap::new();
        request.insert("user-agent".to_string(), presentation.user_agent.clone());

        Self {
            name: presentation.name.clone(),
            title,
            url: link.url.clone(),
            behavior_hints: BehaviorHints {
                not_web_ready: true,
                proxy_headers: ProxyHeaders { request },
                binge_group: presentation.binge_group.clone(),
            },
        }
    }
}
