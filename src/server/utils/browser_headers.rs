use rand::Rng;
use rand::seq::IndexedRandom;
use reqwest::header::{self, HeaderMap, HeaderValue};

/// the user agent the relay fetches pages with, players get told to send the same one since the
/// playlist token is handed out per browser
pub const RELAY_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:127.0) Gecko/20100101 Firefox/127.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BrowserFamily {
    Chrome,
    Firefox,
    Edge,
}

const PLATFORMS: &[(&str, &str)] = &[
    ("Windows NT 10.0; Win64; x64", "\"Windows\""),
    ("Macintosh; Intel Mac OS X 10_15_7", "\"macOS\""),
    ("X11; Linux x86_64", "\"Linux\""),
];

const LANGUAGES: &[&str] = &[
    "en-US,en;q=0.9",
    "en-GB,en;q=0.9,en-US;q=0.8",
    "it-IT,it;q=0.9,en-US;q=0.8,en;q=0.7",
    "en-US,en;q=0.8,it;q=0.6",
];

const DOCUMENT_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

/// random desktop browser header sets, one per page fetch
///
/// every set is internally consistent, so a firefox agent never sends chromium client hints
pub struct BrowserHeaders;

impl BrowserHeaders {
    pub fn generate() -> HeaderMap {
        let mut rng = rand::rng();

        let family = [BrowserFamily::Chrome, BrowserFamily::Firefox, BrowserFamily::Edge]
            .choose(&mut rng)
            .copied()
            .unwrap_or(BrowserFamily::Firefox);
        let (platform, platform_hint) = PLATFORMS
            .choose(&mut rng)
            .copied()
            .unwrap_or(PLATFORMS[0]);
        let language = LANGUAGES.choose(&mut rng).copied().unwrap_or(LANGUAGES[0]);
        let major: u32 = rng.random_range(120..=131);

        let user_agent = match family {
            BrowserFamily::Chrome => format!(
                "Mozilla/5.0 ({}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{}.0.0.0 Safari/537.36",
                platform, major
            ),
            BrowserFamily::Edge => format!(
                "Mozilla/5.0 ({}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{}.0.0.0 Safari/537.36 Edg/{}.0.0.0",
                platform, major, major
            ),
            BrowserFamily::Firefox => {
                let platform = platform.replace("Mac OS X 10_15_7", "Mac OS X 10.15");
                format!(
                    "Mozilla/5.0 ({}; rv:{}.0) Gecko/20100101 Firefox/{}.0",
                    platform, major, major
                )
            }
        };

        let mut headers = HeaderMap::new();
        insert(&mut headers, header::USER_AGENT, &user_agent);
        insert(&mut headers, header::ACCEPT, DOCUMENT_ACCEPT);
        insert(&mut headers, header::ACCEPT_LANGUAGE, language);
        // accept-encoding is left to reqwest, setting it by hand turns off body decoding
        insert(&mut headers, header::UPGRADE_INSECURE_REQUESTS, "1");
        insert(&mut headers, "sec-fetch-dest", "document");
        insert(&mut headers, "sec-fetch-mode", "navigate");
        insert(&mut headers, "sec-fetch-site", "same-origin");
        insert(&mut headers, "sec-fetch-user", "?1");

        if family != BrowserFamily::Firefox {
            let brand = match family {
                BrowserFamily::Edge => "Microsoft Edge",
                _ => "Google Chrome",
            };
            let hints = format!(
                "\"Chromium\";v=\"{}\", \"{}\";v=\"{}\", \"Not?A_Brand\";v=\"99\"",
                major, brand, major
            );
            insert(&mut headers, "sec-ch-ua", &hints);
            insert(&mut headers, "sec-ch-ua-mobile", "?0");
            insert(&mut headers, "sec-ch-ua-platform", platform_hint);
        }

        if rng.random_bool(0.5) {
            insert(&mut headers, header::DNT, "1");
        }

        headers
    }
}

fn insert<K>(headers: &mut HeaderMap, key: K, value: &str)
where
    K: header::IntoHeaderName,
{
    // everything above is plain ascii, a bad value just means one header less
    if let Ok(value) = HeaderValue::from_str(value) {
        headers.insert(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_sends_core_document_headers() {
        for _ in 0..50 {
            let headers = BrowserHeaders::generate();
            assert!(headers.contains_key(header::USER_AGENT));
            assert_eq!(headers.get(header::ACCEPT).unwrap(), DOCUMENT_ACCEPT);
            assert!(headers.contains_key(header::ACCEPT_LANGUAGE));
            assert_eq!(headers.get("sec-fetch-mode").unwrap(), "navigate");
        }
    }

    #[test]
    fn client_hints_only_come_with_chromium_agents() {
        for _ in 0..100 {
            let headers = BrowserHeaders::generate();
            let agent = headers.get(header::USER_AGENT).unwrap().to_str().unwrap();

            if agent.contains("Firefox/") {
                assert!(!headers.contains_key("sec-ch-ua"));
            } else {
                assert!(agent.contains("Chrome/"));
                assert!(headers.contains_key("sec-ch-ua"));
                assert_eq!(headers.get("sec-ch-ua-mobile").unwrap(), "?0");
            }
        }
    }

    #[test]
    fn firefox_agents_use_dotted_mac_versions() {
        for _ in 0..100 {
            let headers = BrowserHeaders::generate();
            let agent = headers.get(header::USER_AGENT).unwrap().to_str().unwrap();
            if agent.contains("Firefox/") {
                assert!(!agent.contains("10_15_7"));
            }
        }
    }
}
