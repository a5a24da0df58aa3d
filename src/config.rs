#[derive(clap::ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
pub enum CargoEnv {
    Development,
    Production,
}

#[derive(clap::Parser, Debug, Clone)]
pub struct AppConfig {
    // production or development
    #[clap(long, env, value_enum, default_value = "development")]
    pub cargo_env: CargoEnv,

    // port that the app will bind to
    #[clap(long, env, default_value = "5000")]
    pub port: u16,

    // optional override for the log level, otherwise it follows cargo_env
    #[clap(long, env)]
    pub log_level: Option<String>,

    // tmdb v3 api key, used for imdb -> tmdb id lookups. without it only numeric ids resolve
    #[clap(long, env = "TMDB_KEY")]
    pub tmdb_api_key: Option<String>,

    // only changed in tests or if tmdb ever moves
    #[clap(long, env, default_value = "https://api.themoviedb.org/3")]
    pub tmdb_base_url: String,

    #[clap(long, env, default_value = "it")]
    pub tmdb_language: String,

    #[clap(long, env, default_value = "10")]
    pub tmdb_timeout_secs: u64,

    // the site that hosts the player pages, no trailing slash needed
    #[clap(long, env, default_value = "https://vixsrc.to")]
    pub source_domain: String,

    #[clap(long, env, default_value = "15")]
    pub fetch_timeout_secs: u64,

    // something like "/U0MQ" if the addon should live under a path, empty mounts at the root
    #[clap(long, env, default_value = "")]
    pub route_prefix: String,

    // this should be either * for allowing everything, or a comma seperated list of domains like
    // example.com,something.com
    #[clap(long, env, default_value = "*")]
    pub cors_origin: String,

    // requests allowed per client inside one window
    #[clap(long, env, default_value = "10")]
    pub rate_limit_requests: u32,

    #[clap(long, env, default_value = "1")]
    pub rate_limit_window_secs: u64,

    // look up movie/episode titles on tmdb for the stream title
    #[clap(long, env)]
    pub enrich_titles: bool,

    // keep scanning later token/expires scripts when the first one doesn't parse
    #[clap(long, env)]
    pub scan_all_scripts: bool,

    // put b=1 on every playlist url, false only keeps it where the source url already had it
    #[clap(long, env, default_value_t = true, action = clap::ArgAction::Set)]
    pub force_bitrate: bool,

    // key the rate limit on x-forwarded-for / x-real-ip, only turn on behind a proxy that sets them
    #[clap(long, env)]
    pub trust_forwarded_headers: bool,

    // optional sentry integration
    #[clap(long, env)]
    pub sentry_dsn: Option<String>,
}

impl Default for AppConfig {
    // defaults aren't really needed here but it's here as a bad fallback, tests lean on it too
    fn default() -> Self {
        Self {
            cargo_env: CargoEnv::Development,
            port: 5000,
            log_level: None,
            tmdb_api_key: None,
            tmdb_base_url: "https://api.themoviedb.org/3".to_string(),
            tmdb_language: "it".to_string(),
            tmdb_timeout_secs: 10,
            source_domain: "https://vixsrc.to".to_string(),
            fetch_timeout_secs: 15,
            route_prefix: String::new(),
            cors_origin: "*".to_string(),
            rate_limit_requests: 10,
            rate_limit_window_secs: 1,
            enrich_titles: false,
            scan_all_scripts: false,
            force_bitrate: true,
            trust_forwarded_headers: false,
            sentry_dsn: None,
        }
    }
}

impl AppConfig {
    /// source domain without a trailing slash so paths can be appended directly
    pub fn source_root(&self) -> &str {
        self.source_domain.trim_end_matches('/')
    }

    /// route prefix normalized to either "" or "/something"
    pub fn normalized_prefix(&self) -> String {
        let trimmed = self.route_prefix.trim().trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{}", trimmed)
        }
    }
}
