use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::debug;

use crate::config::AppConfig;

// once this many clients are tracked the stale windows get swept on the next check
const PRUNE_THRESHOLD: usize = 1024;

#[derive(Clone, Debug)]
pub struct RateLimitConfig {
    /// maximum requests per window for stream lookups
    pub max_requests_per_window: u32,
    /// window duration in seconds for rate limiting
    pub window_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests_per_window: 10, // 10 stream lookups
            window_seconds: 1,           // per second
        }
    }
}

impl From<&AppConfig> for RateLimitConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_requests_per_window: config.rate_limit_requests.max(1),
            window_seconds: config.rate_limit_window_secs.max(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// request is allowed
    Allowed { remaining: u32, reset_at: i64 },
    /// client has exceeded rate limit
    RateLimited { retry_after: u64 },
}

pub type DynRateLimitService = Arc<dyn RateLimitServiceTrait + Send + Sync>;

#[async_trait::async_trait]
pub trait RateLimitServiceTrait {
    /// count a request against the client and say whether it may go through
    async fn check_rate_limit(&self, client_id: &str) -> RateLimitResult;
}

struct Window {
    started: Instant,
    count: u32,
}

/// fixed window counters per client address, kept in memory since nothing else is shared
pub struct InMemoryRateLimitService {
    windows: Mutex<HashMap<String, Window>>,
    config: RateLimitConfig,
}

impl InMemoryRateLimitService {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            config,
        }
    }

    fn window(&self) -> Duration {
        Duration::from_secs(self.config.window_seconds)
    }
}

#[async_trait::async_trait]
impl RateLimitServiceTrait for InMemoryRateLimitService {
    async fn check_rate_limit(&self, client_id: &str) -> RateLimitResult {
        let now = Instant::now();
        let window = self.window();
        let mut windows = self.windows.lock().await;

        if windows.len() >= PRUNE_THRESHOLD {
            windows.retain(|_, w| now.duration_since(w.started) < window);
        }

        let entry = windows.entry(client_id.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(entry.started) >= window {
            entry.started = now;
            entry.count = 0;
        }

        entry.count = entry.count.saturating_add(1);
        let left_in_window = window.saturating_sub(now.duration_since(entry.started));

        if entry.count > self.config.max_requests_per_window {
            debug!(
                "Client {} rate limited: {} requests in window",
                client_id, entry.count
            );
            return RateLimitResult::RateLimited {
                retry_after: left_in_window.as_secs().max(1),
            };
        }

        RateLimitResult::Allowed {
            remaining: self.config.max_requests_per_window.saturating_sub(entry.count),
            reset_at: chrono::Utc::now().timestamp() + left_in_window.as_secs() as i64,
        }
    }
}
