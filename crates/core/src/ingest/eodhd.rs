use crate::ingest::provider::{non_empty, parse_num, FundamentalsSource, JsonHttp};
use crate::ingest::types::PartialFundamentals;
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

/// Primary fundamentals source.
#[derive(Debug, Clone)]
pub struct EodhdClient {
    http: JsonHttp,
    base_url: String,
    api_key: String,
}

impl EodhdClient {
    pub fn new(http: JsonHttp, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    fn fundamentals_url(&self, ticker: &str) -> String {
        format!("{}/api/fundamentals/{}.US", self.base(), ticker)
    }
}

#[async_trait::async_trait]
impl FundamentalsSource for EodhdClient {
    fn source_name(&self) -> &'static str {
        "eodhd"
    }

    async fn fetch_fundamentals(&self, ticker: &str) -> Result<PartialFundamentals> {
        let raw = self
            .http
            .get_json(
                &self.fundamentals_url(ticker),
                &[("api_token", self.api_key.as_str()), ("fmt", "json")],
                "eodhd fundamentals",
            )
            .await?;

        let body = serde_json::from_value::<EodhdFundamentals>(raw)
            .context("failed to parse eodhd fundamentals response")?;
        Ok(body.into_partial(self.base()))
    }
}

#[derive(Debug, Default, Deserialize)]
struct EodhdFundamentals {
    #[serde(rename = "General", default)]
    general: Option<EodhdGeneral>,
    #[serde(rename = "Highlights", default)]
    highlights: Option<EodhdHighlights>,
    #[serde(rename = "Valuation", default)]
    valuation: Option<EodhdValuation>,
}

#[derive(Debug, Default, Deserialize)]
struct EodhdGeneral {
    #[serde(rename = "Name", default)]
    name: Option<String>,
    #[serde(rename = "LogoURL", default)]
    logo_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct EodhdHighlights {
    #[serde(rename = "PERatio", default)]
    pe_ratio: Option<Value>,
    #[serde(rename = "PBRatio", default)]
    pb_ratio: Option<Value>,
    #[serde(rename = "DividendYield", default)]
    dividend_yield: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct EodhdValuation {
    #[serde(rename = "TrailingPE", default)]
    trailing_pe: Option<Value>,
    #[serde(rename = "PriceBookMRQ", default)]
    price_book_mrq: Option<Value>,
}

impl EodhdFundamentals {
    fn into_partial(self, host: &str) -> PartialFundamentals {
        let general = self.general.unwrap_or_default();
        let highlights = self.highlights.unwrap_or_default();
        let valuation = self.valuation.unwrap_or_default();

        // LogoURL is a path on the EODHD host.
        let logo = non_empty(general.logo_url).map(|path| {
            if path.starts_with("http://") || path.starts_with("https://") {
                path
            } else {
                format!("{host}/{}", path.trim_start_matches('/'))
            }
        });

        PartialFundamentals {
            source: "eodhd",
            name: non_empty(general.name),
            logo,
            pe: parse_num(highlights.pe_ratio.as_ref())
                .or_else(|| parse_num(valuation.trailing_pe.as_ref())),
            pb: parse_num(highlights.pb_ratio.as_ref())
                .or_else(|| parse_num(valuation.price_book_mrq.as_ref())),
            dividend_yield: parse_num(highlights.dividend_yield.as_ref()),
        }
    }
}
