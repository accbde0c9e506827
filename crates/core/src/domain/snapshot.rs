use crate::scoring::aggregator::{BucketCounts, DisplayGroups};
use crate::scoring::classifier::{Bucket, Valuation};
use crate::scoring::normalizer::RiskAssessment;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
}

/// A named indicator compared against its industry benchmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    pub id: String,
    pub name: String,
    pub stock_value: f64,
    pub industry_value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub direction: Direction,
}

/// One company's raw metric set for a single analysis cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockSnapshot {
    pub ticker: String,
    pub company_name: String,
    #[serde(default)]
    pub current_price: Option<f64>,
    pub metrics: Vec<Metric>,
}

impl StockSnapshot {
    pub fn analyze(&self) -> crate::scoring::Result<ScoredSnapshot> {
        crate::scoring::analyze(self)
    }
}

/// A metric together with the values derived from it.
///
/// Only the scoring engine builds these, so the risk value always matches the
/// stock/industry pair it sits next to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredMetric {
    #[serde(flatten)]
    metric: Metric,
    risk_value: f64,
    ratio: Option<f64>,
    #[serde(flatten)]
    valuation: Valuation,
    degenerate_benchmark: bool,
}

impl ScoredMetric {
    pub(crate) fn new(metric: Metric, assessment: RiskAssessment, valuation: Valuation) -> Self {
        Self {
            metric,
            risk_value: assessment.risk_value,
            ratio: assessment.ratio,
            valuation,
            degenerate_benchmark: assessment.degenerate_benchmark,
        }
    }

    pub fn metric(&self) -> &Metric {
        &self.metric
    }

    pub fn id(&self) -> &str {
        &self.metric.id
    }

    pub fn direction(&self) -> Direction {
        self.metric.direction
    }

    pub fn risk_value(&self) -> f64 {
        self.risk_value
    }

    /// Stock value over industry value; `None` when the benchmark is zero.
    pub fn ratio(&self) -> Option<f64> {
        self.ratio
    }

    pub fn valuation(&self) -> Valuation {
        self.valuation
    }

    pub fn bucket(&self) -> Bucket {
        self.valuation.bucket
    }

    pub fn degenerate_benchmark(&self) -> bool {
        self.degenerate_benchmark
    }
}

/// Result of one analysis cycle. Produced fresh by [`crate::scoring::analyze`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredSnapshot {
    ticker: String,
    company_name: String,
    current_price: Option<f64>,
    metrics: Vec<ScoredMetric>,
    overall_risk_value: f64,
    overall: Valuation,
    bucket_counts: BucketCounts,
    groups: DisplayGroups,
}

impl ScoredSnapshot {
    pub(crate) fn new(
        snapshot: &StockSnapshot,
        metrics: Vec<ScoredMetric>,
        overall_risk_value: f64,
        overall: Valuation,
        bucket_counts: BucketCounts,
        groups: DisplayGroups,
    ) -> Self {
        Self {
            ticker: snapshot.ticker.clone(),
            company_name: snapshot.company_name.clone(),
            current_price: snapshot.current_price,
            metrics,
            overall_risk_value,
            overall,
            bucket_counts,
            groups,
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn company_name(&self) -> &str {
        &self.company_name
    }

    pub fn current_price(&self) -> Option<f64> {
        self.current_price
    }

    /// Scored metrics in input order.
    pub fn metrics(&self) -> &[ScoredMetric] {
        &self.metrics
    }

    pub fn overall_risk_value(&self) -> f64 {
        self.overall_risk_value
    }

    pub fn overall(&self) -> Valuation {
        self.overall
    }

    pub fn bucket_counts(&self) -> &BucketCounts {
        &self.bucket_counts
    }

    pub fn groups(&self) -> &DisplayGroups {
        &self.groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_dashboard_shape() {
        let v = json!({
            "ticker": "AAPL",
            "companyName": "Apple Inc.",
            "currentPrice": 172.5,
            "metrics": [
                {
                    "id": "roe",
                    "name": "Return on equity",
                    "stockValue": 147.3,
                    "industryValue": 18.0,
                    "unit": "%",
                    "direction": "higher-is-better"
                },
                {
                    "id": "pe",
                    "name": "P/E",
                    "stockValue": 28.5,
                    "industryValue": 25.0,
                    "direction": "lower-is-better"
                }
            ]
        });

        let parsed: StockSnapshot = serde_json::from_value(v).unwrap();
        assert_eq!(parsed.metrics.len(), 2);
        assert_eq!(parsed.metrics[0].direction, Direction::HigherIsBetter);
        assert_eq!(parsed.metrics[1].unit, None);
        assert_eq!(parsed.current_price, Some(172.5));
    }

    #[test]
    fn rejects_unknown_direction() {
        let v = json!({
            "ticker": "AAPL",
            "companyName": "Apple Inc.",
            "metrics": [
                {
                    "id": "pe",
                    "name": "P/E",
                    "stockValue": 28.5,
                    "industryValue": 25.0,
                    "direction": "sideways"
                }
            ]
        });

        assert!(serde_json::from_value::<StockSnapshot>(v).is_err());
    }

    #[test]
    fn scored_metric_serializes_flat() {
        let snapshot = StockSnapshot {
            ticker: "AAPL".to_string(),
            company_name: "Apple Inc.".to_string(),
            current_price: None,
            metrics: vec![Metric {
                id: "pe".to_string(),
                name: "P/E".to_string(),
                stock_value: 28.5,
                industry_value: 25.0,
                unit: None,
                direction: Direction::LowerIsBetter,
            }],
        };

        let scored = snapshot.analyze().unwrap();
        let v = serde_json::to_value(&scored).unwrap();
        let m = &v["metrics"][0];
        assert_eq!(m["id"], "pe");
        assert_eq!(m["direction"], "lower-is-better");
        assert_eq!(m["bucket"], "fair");
        assert_eq!(m["color"], "#67C23A");
        assert_eq!(m["degenerateBenchmark"], false);
        assert!(m.get("unit").is_none());
        assert_eq!(v["bucketCounts"]["fair"], 1);
        assert_eq!(v["groups"]["lowerIsBetter"][0]["id"], "pe");
    }
}
