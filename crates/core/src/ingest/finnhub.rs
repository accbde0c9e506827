use crate::ingest::provider::{non_empty, parse_num, FundamentalsSource, JsonHttp, PeerSource};
use crate::ingest::types::PartialFundamentals;
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

/// Secondary fundamentals source; also supplies industry peers.
#[derive(Debug, Clone)]
pub struct FinnhubClient {
    http: JsonHttp,
    base_url: String,
    api_key: String,
}

impl FinnhubClient {
    pub fn new(http: JsonHttp, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn metric(&self, ticker: &str) -> Result<FinnhubMetric> {
        let raw = self
            .http
            .get_json(
                &self.url("/stock/metric"),
                &[
                    ("symbol", ticker),
                    ("metric", "all"),
                    ("token", self.api_key.as_str()),
                ],
                "finnhub metric",
            )
            .await?;
        let body = serde_json::from_value::<FinnhubMetricResponse>(raw)
            .context("failed to parse finnhub metric response")?;
        Ok(body.metric.unwrap_or_default())
    }

    async fn profile(&self, ticker: &str) -> Result<FinnhubProfile> {
        let raw = self
            .http
            .get_json(
                &self.url("/stock/profile2"),
                &[("symbol", ticker), ("token", self.api_key.as_str())],
                "finnhub profile",
            )
            .await?;
        serde_json::from_value::<FinnhubProfile>(raw).context("failed to parse finnhub profile response")
    }
}

#[async_trait::async_trait]
impl FundamentalsSource for FinnhubClient {
    fn source_name(&self) -> &'static str {
        "finnhub"
    }

    async fn fetch_fundamentals(&self, ticker: &str) -> Result<PartialFundamentals> {
        let (metric, profile) = tokio::join!(self.metric(ticker), self.profile(ticker));

        let metric = metric.unwrap_or_else(|err| {
            tracing::warn!(%ticker, error = %err, "finnhub metric unavailable");
            FinnhubMetric::default()
        });
        let profile = profile.unwrap_or_else(|err| {
            tracing::warn!(%ticker, error = %err, "finnhub profile unavailable");
            FinnhubProfile::default()
        });

        Ok(into_partial(metric, profile))
    }
}

#[async_trait::async_trait]
impl PeerSource for FinnhubClient {
    async fn fetch_peers(&self, ticker: &str) -> Result<Vec<String>> {
        let raw = self
            .http
            .get_json(
                &self.url("/stock/peers"),
                &[("symbol", ticker), ("token", self.api_key.as_str())],
                "finnhub peers",
            )
            .await?;
        parse_peers(raw)
    }

    async fn fetch_peer_pe(&self, ticker: &str) -> Result<Option<f64>> {
        let metric = self.metric(ticker).await?;
        Ok(parse_num(metric.pe_normalized_annual.as_ref()))
    }
}

#[derive(Debug, Default, Deserialize)]
struct FinnhubMetricResponse {
    #[serde(default)]
    metric: Option<FinnhubMetric>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinnhubMetric {
    #[serde(default)]
    pe_normalized_annual: Option<Value>,
    #[serde(default)]
    pb_annual: Option<Value>,
    #[serde(default)]
    dividend_yield_indicated_annual: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct FinnhubProfile {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    logo: Option<String>,
}

fn into_partial(metric: FinnhubMetric, profile: FinnhubProfile) -> PartialFundamentals {
    PartialFundamentals {
        source: "finnhub",
        name: non_empty(profile.name),
        logo: non_empty(profile.logo),
        pe: parse_num(metric.pe_normalized_annual.as_ref()),
        pb: parse_num(metric.pb_annual.as_ref()),
        dividend_yield: parse_num(metric.dividend_yield_indicated_annual.as_ref()),
    }
}

fn parse_peers(raw: Value) -> Result<Vec<String>> {
    let peers = serde_json::from_value::<Vec<String>>(raw)
        .context("finnhub peers response is not a list of tickers")?;
    Ok(peers
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect())
}
