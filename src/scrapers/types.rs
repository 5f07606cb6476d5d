use std::env;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::warn;

const TIMEOUT_ENV: &str = "CAR_SCOUT_TIMEOUT_SECS";
const USER_AGENT_ENV: &str = "CAR_SCOUT_USER_AGENT";

/// Per-call options for a scrape
#[derive(Debug, Clone, Default)]
pub struct ScrapeOptions {
    /// Aborts the in-flight fetch when cancelled
    pub cancellation: Option<CancellationToken>,
}

impl ScrapeOptions {
    pub fn with_cancellation(token: CancellationToken) -> Self {
        Self {
            cancellation: Some(token),
        }
    }
}

/// HTTP settings shared by every fetch
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Whole-request timeout (connect, headers and body)
    pub timeout: Duration,
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
    /// How many leading bytes are searched for a `<meta>` charset
    pub sniff_window: usize,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".to_string(),
            accept_language: "bg-BG,bg;q=0.9,en-US;q=0.8,en;q=0.7".to_string(),
            sniff_window: 2048,
        }
    }
}

impl ScraperConfig {
    /// Defaults, overridden by `CAR_SCOUT_TIMEOUT_SECS` and
    /// `CAR_SCOUT_USER_AGENT` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = env::var(TIMEOUT_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout = Duration::from_secs(secs),
                _ => warn!("Ignoring invalid {}={:?}", TIMEOUT_ENV, raw),
            }
        }

        if let Ok(agent) = env::var(USER_AGENT_ENV) {
            if !agent.trim().is_empty() {
                config.user_agent = agent.trim().to_string();
            }
        }

        config
    }
}
