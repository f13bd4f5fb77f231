use std::path::PathBuf;
use std::time::Duration;

use xoso_db::db::db_path;

pub const DEFAULT_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_CRAWL_BASE_URL: &str = "https://www.minhngoc.net.vn";
pub const DEFAULT_CRAWL_DELAY_MS: u64 = 500;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: String,
    pub db_path: PathBuf,
    pub crawl_base_url: String,
    /// Pause between two days of a range crawl.
    pub crawl_delay: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            db_path: db_path(),
            crawl_base_url: DEFAULT_CRAWL_BASE_URL.to_string(),
            crawl_delay: Duration::from_millis(DEFAULT_CRAWL_DELAY_MS),
        }
    }
}

impl ServerConfig {
    /// Reads `XOSO_ADDR`, `XOSO_DB`, `XOSO_CRAWL_BASE_URL` and
    /// `XOSO_CRAWL_DELAY_MS`, keeping defaults for anything unset or invalid.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(addr) = std::env::var("XOSO_ADDR") {
            config.addr = addr;
        }
        if let Ok(url) = std::env::var("XOSO_CRAWL_BASE_URL") {
            config.crawl_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(ms) = std::env::var("XOSO_CRAWL_DELAY_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            config.crawl_delay = Duration::from_millis(ms);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.addr, "0.0.0.0:8080");
        assert_eq!(config.crawl_delay, Duration::from_millis(500));
        assert!(config.crawl_base_url.starts_with("https://"));
    }
}
