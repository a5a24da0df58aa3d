use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::server::error::Error;

/// the two content types the addon answers for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Series,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Series => "series",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(Self::Movie),
            "series" => Ok(Self::Series),
            other => Err(Error::BadRequest(format!("unsupported type '{}'", other))),
        }
    }
}

/// what a player asked for, parsed once from the `{id}` route segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRequest {
    pub base_id: String,
    pub season: Option<String>,
    pub episode: Option<String>,
    pub media_type: MediaType,
}

impl ContentRequest {
    /// season and episode are only ever set together
    pub fn episode_coordinates(&self) -> Option<(&str, &str)> {
        match (self.season.as_deref(), self.episode.as_deref()) {
            (Some(season), Some(episode)) => Some((season, episode)),
            _ => None,
        }
    }
}

/// tmdb id the source site understands, plus whatever title the lookup handed back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCatalog {
    pub id: String,
    pub title: Option<String>,
}

impl ResolvedCatalog {
    pub fn bare(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkFlags {
    pub forced_bitrate: bool,
    pub forced_hd: bool,
}

/// a playlist link pulled out of the player script
///
/// only built once token, expires and url all matched, `url` is the final playable
/// link and the rest is kept for logging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedLink {
    pub url: String,
    pub base_url: String,
    pub token: String,
    pub expires: String,
    pub flags: LinkFlags,
}
