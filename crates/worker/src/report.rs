use serde::Serialize;
use valgauge_core::domain::snapshot::ScoredSnapshot;
use valgauge_core::ingest::types::StockListItem;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerReport {
    pub item: StockListItem,
    /// Missing when the item has no industry benchmark to score against.
    pub analysis: Option<ScoredSnapshot>,
}

pub fn build_reports(items: Vec<StockListItem>) -> Vec<TickerReport> {
    items
        .into_iter()
        .map(|item| {
            let analysis = item.to_snapshot().and_then(|raw| match raw.analyze() {
                Ok(scored) => Some(scored),
                Err(err) => {
                    tracing::warn!(ticker = %item.ticker, error = %err, "analysis failed");
                    None
                }
            });
            TickerReport { item, analysis }
        })
        .collect()
}

pub fn summary_line(snapshot: &ScoredSnapshot) -> String {
    format!(
        "{} overall {:.0} ({}): {}",
        snapshot.ticker(),
        snapshot.overall_risk_value(),
        snapshot.overall().bucket.display_name(),
        snapshot.bucket_counts().describe()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use valgauge_core::domain::sample::sample_snapshot;

    fn item(ticker: &str, pe: f64, industry_avg_pe: Option<f64>) -> StockListItem {
        StockListItem {
            ticker: ticker.to_string(),
            name: ticker.to_string(),
            logo: None,
            pe,
            pb: Some(3.0),
            dividend_yield: None,
            industry_avg_pe,
            peer_count: usize::from(industry_avg_pe.is_some()),
        }
    }

    #[test]
    fn analyzes_items_with_a_benchmark() {
        let reports = build_reports(vec![
            item("AAPL", 28.5, Some(25.0)),
            item("TSLA", 70.0, None),
        ]);

        assert_eq!(reports.len(), 2);
        let aapl = reports[0].analysis.as_ref().unwrap();
        assert_eq!(summary_line(aapl), "AAPL overall 57 (Fair value): 1 fair value");
        assert!(reports[1].analysis.is_none());

        let v = serde_json::to_value(&reports[1]).unwrap();
        assert_eq!(v["item"]["ticker"], "TSLA");
        assert_eq!(v["analysis"], serde_json::Value::Null);
    }

    #[test]
    fn summarizes_the_sample() {
        let scored = sample_snapshot().analyze().unwrap();
        let line = summary_line(&scored);
        assert!(line.starts_with("AAPL overall "));
        assert!(line.ends_with("3 undervalued, 4 fair value, 2 overvalued, 1 high risk"));
    }
}
