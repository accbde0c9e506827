pub mod domain;
pub mod ingest;
pub mod scoring;

pub mod config {
    use anyhow::Context;

    pub const DEFAULT_EODHD_BASE_URL: &str = "https://eodhd.com";
    pub const DEFAULT_FINNHUB_BASE_URL: &str = "https://finnhub.io";

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub eodhd_api_key: Option<String>,
        pub finnhub_api_key: Option<String>,
        pub eodhd_base_url: String,
        pub finnhub_base_url: String,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                eodhd_api_key: env_with_fallback("EODHD_API_KEY", "VITE_EODHD_API_KEY"),
                finnhub_api_key: env_with_fallback("FINNHUB_API_KEY", "VITE_FINNHUB_API_KEY"),
                eodhd_base_url: std::env::var("EODHD_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_EODHD_BASE_URL.to_string()),
                finnhub_base_url: std::env::var("FINNHUB_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_FINNHUB_BASE_URL.to_string()),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            })
        }

        pub fn require_eodhd_api_key(&self) -> anyhow::Result<&str> {
            self.eodhd_api_key
                .as_deref()
                .context("EODHD_API_KEY is required")
        }

        pub fn require_finnhub_api_key(&self) -> anyhow::Result<&str> {
            self.finnhub_api_key
                .as_deref()
                .context("FINNHUB_API_KEY is required")
        }

        pub fn has_provider_credentials(&self) -> bool {
            self.eodhd_api_key.is_some() && self.finnhub_api_key.is_some()
        }
    }

    // The dashboard deployment exposed keys under VITE_-prefixed names; accept both.
    fn env_with_fallback(key: &str, fallback: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .or_else(|| std::env::var(fallback).ok())
            .filter(|s| !s.trim().is_empty())
    }
}
