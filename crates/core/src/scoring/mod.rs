//! Risk scoring: normalize each metric against its benchmark, bucket the
//! result, then aggregate the snapshot.

pub mod aggregator;
pub mod classifier;
pub mod error;
pub mod normalizer;

pub use error::{Result, ScoringError};

use crate::domain::snapshot::{ScoredMetric, ScoredSnapshot, StockSnapshot};
use std::collections::BTreeSet;

/// Runs one analysis cycle over a raw snapshot.
///
/// Pure and deterministic: the same input always yields the same output.
pub fn analyze(snapshot: &StockSnapshot) -> Result<ScoredSnapshot> {
    validate(snapshot)?;

    let mut metrics = Vec::with_capacity(snapshot.metrics.len());
    for metric in &snapshot.metrics {
        let assessment =
            normalizer::assess(metric.stock_value, metric.industry_value, metric.direction);
        if assessment.degenerate_benchmark {
            tracing::warn!(
                ticker = %snapshot.ticker,
                metric_id = %metric.id,
                "industry value is zero; using neutral risk value"
            );
        }
        let valuation = classifier::classify(assessment.risk_value)?;
        metrics.push(ScoredMetric::new(metric.clone(), assessment, valuation));
    }

    let overall_risk_value = aggregator::overall_risk_value(&metrics)?;
    let overall = classifier::classify(overall_risk_value)?;
    let bucket_counts = aggregator::summarize(&metrics)?;
    let groups = aggregator::partition_for_display(&metrics);

    Ok(ScoredSnapshot::new(
        snapshot,
        metrics,
        overall_risk_value,
        overall,
        bucket_counts,
        groups,
    ))
}

fn validate(snapshot: &StockSnapshot) -> Result<()> {
    if snapshot.metrics.is_empty() {
        return Err(ScoringError::InvalidInput(format!(
            "snapshot for {} has no metrics",
            snapshot.ticker
        )));
    }

    let mut seen_ids = BTreeSet::<&str>::new();
    for metric in &snapshot.metrics {
        if !seen_ids.insert(metric.id.as_str()) {
            return Err(ScoringError::InvalidInput(format!(
                "duplicate metric id: {}",
                metric.id
            )));
        }
        if !metric.stock_value.is_finite() || !metric.industry_value.is_finite() {
            return Err(ScoringError::InvalidInput(format!(
                "metric {} has a non-finite value",
                metric.id
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sample::sample_snapshot;
    use crate::domain::snapshot::{Direction, Metric};
    use crate::scoring::classifier::Bucket;

    fn metric(id: &str, stock_value: f64, industry_value: f64, direction: Direction) -> Metric {
        Metric {
            id: id.to_string(),
            name: id.to_string(),
            stock_value,
            industry_value,
            unit: None,
            direction,
        }
    }

    fn snapshot(metrics: Vec<Metric>) -> StockSnapshot {
        StockSnapshot {
            ticker: "TEST".to_string(),
            company_name: "Test Corp".to_string(),
            current_price: Some(10.0),
            metrics,
        }
    }

    #[test]
    fn pe_above_benchmark_is_fair() {
        let scored = analyze(&snapshot(vec![metric(
            "pe",
            28.5,
            25.0,
            Direction::LowerIsBetter,
        )]))
        .unwrap();

        let m = &scored.metrics()[0];
        assert!((m.risk_value() - 57.0).abs() < 1e-9);
        assert_eq!(m.bucket(), Bucket::Fair);
        assert!((scored.overall_risk_value() - 57.0).abs() < 1e-9);
        assert_eq!(scored.overall().bucket, Bucket::Fair);
    }

    #[test]
    fn strong_roe_is_undervalued() {
        let scored = analyze(&snapshot(vec![metric(
            "roe",
            147.3,
            18.0,
            Direction::HigherIsBetter,
        )]))
        .unwrap();

        let m = &scored.metrics()[0];
        assert!((m.ratio().unwrap() - 8.183).abs() < 1e-3);
        assert!((m.risk_value() - 6.11).abs() < 0.01);
        assert_eq!(m.bucket(), Bucket::Undervalued);
    }

    #[test]
    fn zero_benchmark_is_flagged_not_rejected() {
        let scored = analyze(&snapshot(vec![
            metric("pe", 12.0, 0.0, Direction::LowerIsBetter),
            metric("pb", 2.0, 4.0, Direction::LowerIsBetter),
        ]))
        .unwrap();

        assert!(scored.metrics()[0].degenerate_benchmark());
        assert_eq!(scored.metrics()[0].risk_value(), 50.0);
        assert!(!scored.metrics()[1].degenerate_benchmark());
        assert_eq!(scored.overall_risk_value(), 37.5);
    }

    #[test]
    fn rejects_invalid_snapshots() {
        assert!(matches!(
            analyze(&snapshot(vec![])),
            Err(ScoringError::InvalidInput(_))
        ));

        let dup = snapshot(vec![
            metric("pe", 1.0, 1.0, Direction::LowerIsBetter),
            metric("pe", 2.0, 1.0, Direction::LowerIsBetter),
        ]);
        assert!(matches!(analyze(&dup), Err(ScoringError::InvalidInput(_))));

        let nan = snapshot(vec![metric("pe", f64::NAN, 1.0, Direction::LowerIsBetter)]);
        assert!(matches!(analyze(&nan), Err(ScoringError::InvalidInput(_))));
    }

    #[test]
    fn counts_cover_every_metric() {
        let scored = analyze(&sample_snapshot()).unwrap();
        assert_eq!(scored.bucket_counts().total(), scored.metrics().len());
        assert_eq!(
            scored.groups().higher_is_better.len() + scored.groups().lower_is_better.len(),
            scored.metrics().len()
        );
    }

    #[test]
    fn analysis_is_idempotent() {
        let raw = sample_snapshot();
        let a = analyze(&raw).unwrap();
        let b = analyze(&raw).unwrap();

        assert_eq!(a, b);
        assert_eq!(
            a.overall_risk_value().to_bits(),
            b.overall_risk_value().to_bits()
        );
        for (x, y) in a.metrics().iter().zip(b.metrics()) {
            assert_eq!(x.risk_value().to_bits(), y.risk_value().to_bits());
        }
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn reanalysis_follows_updated_values() {
        let mut raw = snapshot(vec![metric("pe", 25.0, 25.0, Direction::LowerIsBetter)]);
        let before = analyze(&raw).unwrap();
        assert_eq!(before.overall_risk_value(), 50.0);

        raw.metrics[0].stock_value = 45.0;
        let after = analyze(&raw).unwrap();
        assert_eq!(after.overall_risk_value(), 90.0);
        assert_eq!(after.overall().bucket, Bucket::Risk);
        assert_eq!(before.overall_risk_value(), 50.0);
    }
}
