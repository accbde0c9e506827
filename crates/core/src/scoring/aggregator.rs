use crate::domain::snapshot::{Direction, ScoredMetric};
use crate::scoring::classifier::{classify, Bucket};
use crate::scoring::error::{Result, ScoringError};
use crate::scoring::normalizer::{MAX_RISK, MIN_RISK};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BucketCounts {
    pub undervalued: usize,
    pub fair: usize,
    pub overvalued: usize,
    pub risk: usize,
}

impl BucketCounts {
    pub fn get(&self, bucket: Bucket) -> usize {
        match bucket {
            Bucket::Undervalued => self.undervalued,
            Bucket::Fair => self.fair,
            Bucket::Overvalued => self.overvalued,
            Bucket::Risk => self.risk,
        }
    }

    fn increment(&mut self, bucket: Bucket) {
        match bucket {
            Bucket::Undervalued => self.undervalued += 1,
            Bucket::Fair => self.fair += 1,
            Bucket::Overvalued => self.overvalued += 1,
            Bucket::Risk => self.risk += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.undervalued + self.fair + self.overvalued + self.risk
    }

    pub fn iter(&self) -> impl Iterator<Item = (Bucket, usize)> + '_ {
        Bucket::ALL.into_iter().map(|b| (b, self.get(b)))
    }

    /// Human-readable summary, e.g. "3 undervalued, 4 fair value, 1 high risk".
    /// Empty buckets are left out.
    pub fn describe(&self) -> String {
        let parts: Vec<String> = self
            .iter()
            .filter(|(_, n)| *n > 0)
            .map(|(b, n)| format!("{n} {}", b.display_name().to_lowercase()))
            .collect();

        if parts.is_empty() {
            "no metrics".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Metrics split by direction, each group sorted by ascending risk value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayGroups {
    pub higher_is_better: Vec<ScoredMetric>,
    pub lower_is_better: Vec<ScoredMetric>,
}

pub fn overall_risk_value(metrics: &[ScoredMetric]) -> Result<f64> {
    if metrics.is_empty() {
        return Err(ScoringError::InvalidInput(
            "cannot average an empty metric set".to_string(),
        ));
    }

    let total: f64 = metrics.iter().map(ScoredMetric::risk_value).sum();
    Ok((total / metrics.len() as f64).clamp(MIN_RISK, MAX_RISK))
}

pub fn summarize(metrics: &[ScoredMetric]) -> Result<BucketCounts> {
    let mut counts = BucketCounts::default();
    for metric in metrics {
        counts.increment(classify(metric.risk_value())?.bucket);
    }
    Ok(counts)
}

pub fn partition_for_display(metrics: &[ScoredMetric]) -> DisplayGroups {
    let mut groups = DisplayGroups::default();
    for metric in metrics {
        match metric.direction() {
            Direction::HigherIsBetter => groups.higher_is_better.push(metric.clone()),
            Direction::LowerIsBetter => groups.lower_is_better.push(metric.clone()),
        }
    }

    // sort_by is stable, so equal risk values keep their input order.
    groups
        .higher_is_better
        .sort_by(|a, b| a.risk_value().total_cmp(&b.risk_value()));
    groups
        .lower_is_better
        .sort_by(|a, b| a.risk_value().total_cmp(&b.risk_value()));
    groups
}
