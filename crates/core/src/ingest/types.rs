use crate::domain::snapshot::{Direction, Metric, StockSnapshot};
use serde::{Deserialize, Serialize};

/// What one source could tell us about a ticker. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialFundamentals {
    pub source: &'static str,
    pub name: Option<String>,
    pub logo: Option<String>,
    pub pe: Option<f64>,
    pub pb: Option<f64>,
    pub dividend_yield: Option<f64>,
}

impl PartialFundamentals {
    pub fn empty(source: &'static str) -> Self {
        Self {
            source,
            ..Default::default()
        }
    }
}

/// One entry of the stock list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockListItem {
    pub ticker: String,
    pub name: String,
    pub logo: Option<String>,
    pub pe: f64,
    pub pb: Option<f64>,
    pub dividend_yield: Option<f64>,
    #[serde(rename = "industryAvgPE")]
    pub industry_avg_pe: Option<f64>,
    /// Peers that contributed to `industry_avg_pe`; 0 when the stock's own PE stands in.
    pub peer_count: usize,
}

impl StockListItem {
    /// PE against its industry average, ready for scoring. `None` without a benchmark.
    pub fn to_snapshot(&self) -> Option<StockSnapshot> {
        let industry_value = self.industry_avg_pe?;
        Some(StockSnapshot {
            ticker: self.ticker.clone(),
            company_name: self.name.clone(),
            current_price: None,
            metrics: vec![Metric {
                id: "pe".to_string(),
                name: "Price / earnings".to_string(),
                stock_value: self.pe,
                industry_value,
                unit: None,
                direction: Direction::LowerIsBetter,
            }],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::classifier::Bucket;
    use serde_json::json;

    fn item(industry_avg_pe: Option<f64>, peer_count: usize) -> StockListItem {
        StockListItem {
            ticker: "AAPL".to_string(),
            name: "Apple Inc".to_string(),
            logo: None,
            pe: 28.5,
            pb: Some(45.1),
            dividend_yield: Some(0.0044),
            industry_avg_pe,
            peer_count,
        }
    }

    #[test]
    fn serializes_with_list_field_names() {
        let v = serde_json::to_value(item(Some(25.0), 5)).unwrap();
        assert_eq!(
            v,
            json!({
                "ticker": "AAPL",
                "name": "Apple Inc",
                "logo": null,
                "pe": 28.5,
                "pb": 45.1,
                "dividendYield": 0.0044,
                "industryAvgPE": 25.0,
                "peerCount": 5
            })
        );
    }

    #[test]
    fn snapshot_scores_pe_against_industry() {
        let scored = item(Some(25.0), 5).to_snapshot().unwrap().analyze().unwrap();
        assert_eq!(scored.metrics().len(), 1);
        assert_eq!(scored.metrics()[0].bucket(), Bucket::Fair);
    }

    #[test]
    fn own_pe_benchmark_scores_neutral() {
        let scored = item(Some(28.5), 0).to_snapshot().unwrap().analyze().unwrap();
        assert_eq!(scored.overall_risk_value(), 50.0);
    }

    #[test]
    fn no_benchmark_no_snapshot() {
        assert!(item(None, 0).to_snapshot().is_none());
    }
}
