use crate::config::Settings;
use crate::ingest::eodhd::EodhdClient;
use crate::ingest::finnhub::FinnhubClient;
use crate::ingest::merge::merge_fundamentals;
use crate::ingest::provider::{FundamentalsSource, JsonHttp, PeerSource};
use crate::ingest::types::{PartialFundamentals, StockListItem};
use anyhow::{Context, Result};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_TICKERS: [&str; 10] = [
    "AAPL", "MSFT", "GOOGL", "AMZN", "NVDA", "TSLA", "META", "JPM", "JNJ", "V",
];

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub tickers: Vec<String>,

    /// Average the PE of industry peers into `industryAvgPE`.
    pub peer_averaging: bool,

    pub logo_resolution: bool,

    /// Drop tickers without a price/book ratio. With this off only PE is required.
    pub require_pb: bool,

    /// Maximum number of peers queried per ticker.
    pub peer_limit: usize,

    pub ticker_timeout: Duration,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            tickers: DEFAULT_TICKERS.iter().map(|t| t.to_string()).collect(),
            peer_averaging: true,
            logo_resolution: true,
            require_pb: true,
            peer_limit: 5,
            ticker_timeout: Duration::from_secs(10),
        }
    }
}

impl PipelineOptions {
    pub fn from_env() -> Self {
        let mut out = Self::default();

        if let Ok(s) = std::env::var("STOCK_TICKERS") {
            let tickers = parse_tickers(&s);
            if !tickers.is_empty() {
                out.tickers = tickers;
            }
        }

        if let Some(b) = env_bool("PIPELINE_PEER_AVERAGING") {
            out.peer_averaging = b;
        }

        if let Some(b) = env_bool("PIPELINE_LOGOS") {
            out.logo_resolution = b;
        }

        if let Some(b) = env_bool("PIPELINE_REQUIRE_PB") {
            out.require_pb = b;
        }

        if let Ok(s) = std::env::var("PIPELINE_PEER_LIMIT") {
            if let Ok(n) = s.parse::<usize>() {
                out.peer_limit = n;
            }
        }

        if let Ok(s) = std::env::var("TICKER_TIMEOUT_SECS") {
            if let Ok(n) = s.parse::<u64>() {
                out.ticker_timeout = Duration::from_secs(n);
            }
        }

        out
    }
}

/// Normalizes a comma-separated ticker list: trimmed, upper-cased, blanks and
/// repeats removed.
pub fn parse_tickers(s: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for part in s.split(',') {
        let t = part.trim().to_ascii_uppercase();
        if !t.is_empty() && !out.contains(&t) {
            out.push(t);
        }
    }
    out
}

fn env_bool(key: &str) -> Option<bool> {
    let v = std::env::var(key).ok()?;
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Fetches, merges and filters fundamentals for a list of tickers.
pub struct StockListPipeline {
    primary: Arc<dyn FundamentalsSource>,
    secondaries: Vec<Arc<dyn FundamentalsSource>>,
    peers: Option<Arc<dyn PeerSource>>,
    options: PipelineOptions,
}

impl StockListPipeline {
    pub fn new(primary: Arc<dyn FundamentalsSource>, options: PipelineOptions) -> Self {
        Self {
            primary,
            secondaries: Vec::new(),
            peers: None,
            options,
        }
    }

    pub fn with_secondary(mut self, source: Arc<dyn FundamentalsSource>) -> Self {
        self.secondaries.push(source);
        self
    }

    pub fn with_peer_source(mut self, peers: Arc<dyn PeerSource>) -> Self {
        self.peers = Some(peers);
        self
    }

    /// EODHD as primary, Finnhub as secondary and peer source. Both API keys are required.
    pub fn from_settings(settings: &Settings, options: PipelineOptions) -> Result<Self> {
        let eodhd_key = settings.require_eodhd_api_key()?;
        let finnhub_key = settings.require_finnhub_api_key()?;
        let http = JsonHttp::from_env()?;

        let eodhd = EodhdClient::new(http.clone(), settings.eodhd_base_url.clone(), eodhd_key);
        let finnhub = Arc::new(FinnhubClient::new(
            http,
            settings.finnhub_base_url.clone(),
            finnhub_key,
        ));

        Ok(Self::new(Arc::new(eodhd), options)
            .with_secondary(finnhub.clone())
            .with_peer_source(finnhub))
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Runs the configured ticker list.
    pub async fn run(&self) -> Vec<StockListItem> {
        self.fetch_list(&self.options.tickers).await
    }

    /// Fetches all tickers concurrently. Tickers that fail, time out or lack PE/PB
    /// are logged and left out; the rest keep their input order.
    pub async fn fetch_list(&self, tickers: &[String]) -> Vec<StockListItem> {
        let results = join_all(tickers.iter().map(|t| self.fetch_ticker(t))).await;

        let mut items = Vec::with_capacity(results.len());
        let mut skipped: usize = 0;
        for (ticker, res) in tickers.iter().zip(results) {
            match res {
                Ok(item) => items.push(item),
                Err(err) => {
                    skipped += 1;
                    tracing::warn!(%ticker, error = %format!("{err:#}"), "skipping ticker");
                }
            }
        }

        tracing::info!(requested = tickers.len(), items = items.len(), skipped, "stock list fetched");
        items
    }

    pub async fn fetch_ticker(&self, ticker: &str) -> Result<StockListItem> {
        let ticker = ticker.trim().to_ascii_uppercase();
        anyhow::ensure!(!ticker.is_empty(), "ticker must be non-empty");
        // Goes into provider URL paths verbatim.
        anyhow::ensure!(
            ticker
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'.' || b == b'-'),
            "invalid ticker {ticker:?}"
        );

        match tokio::time::timeout(self.options.ticker_timeout, self.resolve(&ticker)).await {
            Ok(res) => res,
            Err(_) => anyhow::bail!(
                "timed out after {:?} resolving {ticker}",
                self.options.ticker_timeout
            ),
        }
    }

    async fn resolve(&self, ticker: &str) -> Result<StockListItem> {
        let primary = self
            .primary
            .fetch_fundamentals(ticker)
            .await
            .with_context(|| format!("{} fetch failed for {ticker}", self.primary.source_name()))?;

        let secondaries = join_all(self.secondaries.iter().map(|source| async move {
            source.fetch_fundamentals(ticker).await.unwrap_or_else(|err| {
                tracing::warn!(%ticker, source = source.source_name(), error = %err, "secondary source failed");
                PartialFundamentals::empty(source.source_name())
            })
        }))
        .await;

        let merged = merge_fundamentals(&primary, &secondaries);

        let Some(pe) = merged.pe.value() else {
            anyhow::bail!("incomplete data for {ticker}: PE unresolved");
        };
        let pb = merged.pb.value();
        if self.options.require_pb && pb.is_none() {
            anyhow::bail!("incomplete data for {ticker}: PB unresolved");
        }

        let (industry_avg_pe, peer_count) = match &self.peers {
            Some(peers) if self.options.peer_averaging => {
                self.industry_average_pe(peers.as_ref(), ticker, pe).await
            }
            _ => (None, 0),
        };

        let logo = if self.options.logo_resolution {
            merged.logo.value()
        } else {
            None
        };

        Ok(StockListItem {
            ticker: ticker.to_string(),
            name: merged.name.value().unwrap_or_else(|| ticker.to_string()),
            logo,
            pe,
            pb,
            dividend_yield: merged.dividend_yield.value(),
            industry_avg_pe,
            peer_count,
        })
    }

    /// Mean PE of up to `peer_limit` peers with a positive PE, rounded to cents.
    /// Falls back to the stock's own PE when no peer qualifies.
    async fn industry_average_pe(
        &self,
        peers: &dyn PeerSource,
        ticker: &str,
        own_pe: f64,
    ) -> (Option<f64>, usize) {
        let list = peers.fetch_peers(ticker).await.unwrap_or_else(|err| {
            tracing::warn!(%ticker, error = %err, "peer list unavailable");
            Vec::new()
        });

        let candidates: Vec<&String> = list
            .iter()
            .filter(|p| !p.eq_ignore_ascii_case(ticker))
            .take(self.options.peer_limit)
            .collect();

        let results = join_all(candidates.iter().map(|p| peers.fetch_peer_pe(p))).await;

        let mut pes = Vec::with_capacity(results.len());
        for (peer, res) in candidates.iter().zip(results) {
            match res {
                Ok(Some(pe)) if pe > 0.0 => pes.push(pe),
                Ok(_) => {}
                Err(err) => tracing::debug!(%ticker, %peer, error = %err, "peer PE unavailable"),
            }
        }

        if pes.is_empty() {
            tracing::info!(%ticker, "no usable peer PE; using own PE as industry average");
            return (Some(round_cents(own_pe)), 0);
        }

        let n = pes.len() as f64;
        let avg = pes.iter().map(|pe| pe / n).sum::<f64>();
        (Some(round_cents(avg)), pes.len())
    }
}

fn round_cents(v: f64) -> f64 {
    let cents = v * 100.0;
    if cents.is_finite() {
        cents.round() / 100.0
    } else {
        v
    }
}
