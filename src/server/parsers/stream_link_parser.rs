//! Player page parser for the source site
//!
//! The embed page ships an inline script roughly shaped like
//!
//! ```text
//! window.masterPlaylist = {
//!     params: { 'token': 'a1b2c3', 'expires': '1735689600' },
//!     url: 'https://host/playlist/123?b=1',
//! }
//! window.canPlayFHD = true
//! ```
//!
//! and the playable HLS link is the `url` with the token and expiry glued onto its query.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

use crate::server::models::{ExtractedLink, LinkFlags};

static SCRIPT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("script").expect("Static selector should parse"));

static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"'token':\s*'(\w+)'").expect("Static regex should compile"));

static EXPIRES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"'expires':\s*'(\d+)'").expect("Static regex should compile"));

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"url:\s*'([^']+)'").expect("Static regex should compile"));

static FULL_HD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"window\.canPlayFHD\s*=\s*true").expect("Static regex should compile")
});

const PLAYLIST_EXTENSION: &str = ".m3u8";

/// which `token`/`expires` scripts get a full parse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScriptSelection {
    /// only the first script mentioning both words, a miss there is final
    #[default]
    FirstCandidate,
    /// keep going through later candidates until one yields all three fields
    AnyCandidate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionPolicy {
    pub selection: ScriptSelection,
    /// add `b=1` to every link, off means only links whose source url already carried it
    pub force_bitrate: bool,
}

impl Default for ExtractionPolicy {
    fn default() -> Self {
        Self {
            selection: ScriptSelection::FirstCandidate,
            force_bitrate: true,
        }
    }
}

/// Finds the player script in a page and builds the playable link out of it
///
/// # Returns
/// `None` when no inline script mentions both `token` and `expires`, or when the selected
/// script is missing any of the token, expiry or url fields. Never a partial link.
pub fn extract_stream_link(html: &str, policy: &ExtractionPolicy) -> Option<ExtractedLink> {
    let document = Html::parse_document(html);

    let mut candidates = document
        .select(&SCRIPT_SELECTOR)
        .filter(|script| script.value().attr("src").is_none())
        .map(|script| script.text().collect::<String>())
        .filter(|text| !text.trim().is_empty())
        .filter(|text| text.contains("token") && text.contains("expires"));

    match policy.selection {
        ScriptSelection::FirstCandidate => candidates
            .next()
            .and_then(|script| parse_player_script(&script, policy)),
        ScriptSelection::AnyCandidate => {
            candidates.find_map(|script| parse_player_script(&script, policy))
        }
    }
}

/// Pulls token, expiry and url out of a single script body
pub fn parse_player_script(script: &str, policy: &ExtractionPolicy) -> Option<ExtractedLink> {
    let token = capture(&TOKEN_RE, script);
    let expires = capture(&EXPIRES_RE, script);
    let base_url = capture(&URL_RE, script);

    let (Some(token), Some(expires), Some(base_url)) = (token, expires, base_url) else {
        debug!("player script is missing token, expires or url");
        return None;
    };

    let flags = LinkFlags {
        forced_bitrate: policy.force_bitrate || has_query_param(&base_url, "b", "1"),
        forced_hd: FULL_HD_RE.is_match(script),
    };

    let url = assemble_stream_url(&base_url, &token, &expires, flags);

    Some(ExtractedLink {
        url,
        base_url,
        token,
        expires,
        flags,
    })
}

/// Glues token and expiry onto the source url, applies the flags and fixes the extension
///
/// # Example
/// ```
/// use relay::server::models::LinkFlags;
/// use relay::server::parsers::stream_link_parser::assemble_stream_url;
/// let url = assemble_stream_url("http://x.test/play?q=1", "abc123", "999", LinkFlags::default());
/// assert_eq!(url, "http://x.test/play.m3u8?q=1&token=abc123&expires=999");
/// ```
pub fn assemble_stream_url(base_url: &str, token: &str, expires: &str, flags: LinkFlags) -> String {
    let separator = if base_url.contains('?') { '&' } else { '?' };
    let mut url = format!("{}{}token={}&expires={}", base_url, separator, token, expires);

    if flags.forced_bitrate {
        url = ensure_query_param(&url, "b", "1");
    }
    if flags.forced_hd {
        url = ensure_query_param(&url, "h", "1");
    }

    normalize_extension(&url)
}

/// Appends `key=value` unless the query already has that exact pair
pub fn ensure_query_param(url: &str, key: &str, value: &str) -> String {
    if has_query_param(url, key, value) {
        return url.to_string();
    }

    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}{}={}", url, separator, key, value)
}

/// Puts `.m3u8` right before the query string, or at the end when there is none
///
/// Anything already mentioning `.m3u8` is returned untouched.
pub fn normalize_extension(url: &str) -> String {
    if url.contains(PLAYLIST_EXTENSION) {
        return url.to_string();
    }

    match url.split_once('?') {
        Some((path, query)) => format!("{}{}?{}", path, PLAYLIST_EXTENSION, query),
        None => format!("{}{}", url, PLAYLIST_EXTENSION),
    }
}

fn has_query_param(url: &str, key: &str, value: &str) -> bool {
    let Some((_, query)) = url.split_once('?') else {
        return false;
    };

    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .any(|(k, v)| k == key && v == value)
}

fn capture(re: &Regex, haystack: &str) -> Option<String> {
    re.captures(haystack)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
