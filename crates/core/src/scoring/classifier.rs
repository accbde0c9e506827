use crate::scoring::error::{Result, ScoringError};
use crate::scoring::normalizer::{MAX_RISK, MIN_RISK};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Undervalued = 0,
    Fair = 1,
    Overvalued = 2,
    Risk = 3,
}

/// Gauge palette, indexed by bucket.
pub const PALETTE: [(Bucket, &str); 4] = [
    (Bucket::Undervalued, "#2E93fA"),
    (Bucket::Fair, "#67C23A"),
    (Bucket::Overvalued, "#FF9800"),
    (Bucket::Risk, "#F56C6C"),
];

impl Bucket {
    pub const ALL: [Bucket; 4] = [
        Bucket::Undervalued,
        Bucket::Fair,
        Bucket::Overvalued,
        Bucket::Risk,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            Bucket::Undervalued => "Undervalued",
            Bucket::Fair => "Fair value",
            Bucket::Overvalued => "Overvalued",
            Bucket::Risk => "High risk",
        }
    }

    pub fn color(self) -> &'static str {
        PALETTE[self as usize].1
    }

    /// Largest rounded risk value that still falls in this bucket.
    pub fn upper_bound(self) -> u8 {
        match self {
            Bucket::Undervalued => 35,
            Bucket::Fair => 65,
            Bucket::Overvalued => 85,
            Bucket::Risk => 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Valuation {
    pub bucket: Bucket,
    pub color: &'static str,
}

impl From<Bucket> for Valuation {
    fn from(bucket: Bucket) -> Self {
        Self {
            bucket,
            color: bucket.color(),
        }
    }
}

/// Buckets a risk value. The value is rounded first; each bucket includes its
/// upper bound.
pub fn classify(risk_value: f64) -> Result<Valuation> {
    if !(MIN_RISK..=MAX_RISK).contains(&risk_value) {
        return Err(ScoringError::InvalidInput(format!(
            "risk value must be within [0, 100] (got {risk_value})"
        )));
    }

    let rounded = risk_value.round() as u8;
    let bucket = Bucket::ALL
        .into_iter()
        .find(|b| rounded <= b.upper_bound())
        .unwrap_or(Bucket::Risk);

    Ok(bucket.into())
}

/// Gauge axis bands as (fraction of the axis, color), in ascending order.
pub fn gauge_bands() -> [(f64, &'static str); 4] {
    Bucket::ALL.map(|b| (f64::from(b.upper_bound()) / MAX_RISK, b.color()))
}
