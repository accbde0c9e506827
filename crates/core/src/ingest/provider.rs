use crate::ingest::types::PartialFundamentals;
use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 15;
const DEFAULT_RETRIES: u32 = 2;

#[async_trait::async_trait]
pub trait FundamentalsSource: Send + Sync {
    fn source_name(&self) -> &'static str;

    async fn fetch_fundamentals(&self, ticker: &str) -> Result<PartialFundamentals>;
}

#[async_trait::async_trait]
pub trait PeerSource: Send + Sync {
    /// Tickers in the same industry. Providers usually list the ticker itself first.
    async fn fetch_peers(&self, ticker: &str) -> Result<Vec<String>>;

    async fn fetch_peer_pe(&self, ticker: &str) -> Result<Option<f64>>;
}

/// Shared JSON-over-HTTP GET with bounded retries on transient failures.
#[derive(Debug, Clone)]
pub struct JsonHttp {
    http: reqwest::Client,
    retries: u32,
}

impl JsonHttp {
    pub fn from_env() -> Result<Self> {
        let timeout_secs = std::env::var("HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let retries = std::env::var("FETCH_RETRIES")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DEFAULT_RETRIES);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build provider http client")?;

        Ok(Self::new(http, retries))
    }

    pub fn new(http: reqwest::Client, retries: u32) -> Self {
        Self {
            http,
            retries: retries.max(1),
        }
    }

    /// GETs `url` and parses the body as JSON. `label` names the call in logs and
    /// errors; URLs are never logged since they carry API tokens.
    pub async fn get_json(&self, url: &str, query: &[(&str, &str)], label: &str) -> Result<Value> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;

            let res = match self.http.get(url).query(query).send().await {
                Ok(r) => r,
                Err(err) => {
                    let err = err.without_url();
                    if attempt >= self.retries {
                        return Err(err).with_context(|| format!("{label} request failed"));
                    }
                    let backoff = Duration::from_secs(1 << (attempt - 1));
                    tracing::warn!(attempt, ?backoff, call = label, error = %err, "request failed; retrying");
                    tokio::time::sleep(backoff).await;
                    continue;
                }
            };

            let status = res.status();
            if !status.is_success() {
                let retryable = status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error();
                if retryable && attempt < self.retries {
                    let backoff = Duration::from_secs(1 << (attempt - 1));
                    tracing::warn!(attempt, ?backoff, call = label, http_status = %status, "HTTP error; retrying");
                    tokio::time::sleep(backoff).await;
                    continue;
                }
                anyhow::bail!("{label} HTTP {status}");
            }

            let text = res
                .text()
                .await
                .map_err(reqwest::Error::without_url)
                .with_context(|| format!("failed to read {label} response"))?;
            return serde_json::from_str::<Value>(&text)
                .with_context(|| format!("{label} response is not valid JSON"));
        }
    }
}

/// Reads a numeric field that providers send either as a number or as a string.
pub(crate) fn parse_num(v: Option<&Value>) -> Option<f64> {
    let n = match v? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

pub(crate) fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn parses_numbers_and_numeric_strings() {
        assert_eq!(parse_num(Some(&json!(28.5))), Some(28.5));
        assert_eq!(parse_num(Some(&json!(0))), Some(0.0));
        assert_eq!(parse_num(Some(&json!(" 4.8 "))), Some(4.8));
        assert_eq!(parse_num(Some(&json!("NA"))), None);
        assert_eq!(parse_num(Some(&json!("NaN"))), None);
        assert_eq!(parse_num(Some(&json!(null))), None);
        assert_eq!(parse_num(Some(&json!({"v": 1}))), None);
        assert_eq!(parse_num(None), None);
    }

    #[test]
    fn blank_strings_are_absent() {
        assert_eq!(non_empty(Some("  ".to_string())), None);
        assert_eq!(non_empty(Some(" Apple ".to_string())), Some("Apple".to_string()));
        assert_eq!(non_empty(None), None);
    }

    #[test]
    fn retries_are_at_least_one_attempt() {
        let http = JsonHttp::new(reqwest::Client::new(), 0);
        assert_eq!(http.retries, 1);
    }

    /// Serves one canned status line per connection, repeating the last one.
    /// Returns the base URL and a counter of requests seen.
    async fn stub_server(statuses: Vec<&'static str>) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                let status = statuses.get(n).or(statuses.last()).copied().unwrap_or("200 OK");

                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;

                let body = r#"{"ok":true}"#;
                let reply = format!(
                    "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(reply.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (format!("http://{addr}/api"), hits)
    }

    const TOKEN_QUERY: [(&str, &str); 1] = [("api_token", "SECRET-TOKEN")];

    #[tokio::test]
    async fn retries_server_errors_then_succeeds() {
        let (url, hits) = stub_server(vec!["503 Service Unavailable", "200 OK"]).await;
        let http = JsonHttp::new(reqwest::Client::new(), 3);

        let body = http.get_json(&url, &TOKEN_QUERY, "stub").await.unwrap();
        assert_eq!(body, json!({"ok": true}));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn retries_stop_at_the_configured_attempts() {
        let (url, hits) = stub_server(vec!["429 Too Many Requests"]).await;
        let http = JsonHttp::new(reqwest::Client::new(), 2);

        let err = http.get_json(&url, &TOKEN_QUERY, "stub").await.unwrap_err();
        assert!(err.to_string().contains("429"), "{err}");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn client_errors_fail_without_retry() {
        let (url, hits) = stub_server(vec!["404 Not Found", "200 OK"]).await;
        let http = JsonHttp::new(reqwest::Client::new(), 3);

        let err = http.get_json(&url, &TOKEN_QUERY, "stub").await.unwrap_err();
        let msg = format!("{err:#}");
        assert_eq!(msg, "stub HTTP 404 Not Found");
        assert!(!msg.contains("SECRET"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn transport_errors_do_not_leak_the_token() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let http = JsonHttp::new(reqwest::Client::new(), 1);
        let err = http
            .get_json(&format!("http://{addr}/api"), &TOKEN_QUERY, "stub")
            .await
            .unwrap_err();
        let msg = format!("{err:#} {err:?}");
        assert!(msg.starts_with("stub request failed"), "{msg}");
        assert!(!msg.contains("SECRET"), "{msg}");
    }
}
