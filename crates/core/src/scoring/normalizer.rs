use crate::domain::snapshot::Direction;

pub const MIN_RISK: f64 = 0.0;
pub const MAX_RISK: f64 = 100.0;
pub const NEUTRAL_RISK: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskAssessment {
    pub risk_value: f64,
    pub ratio: Option<f64>,
    /// Set when the industry value is zero and the neutral score was used.
    pub degenerate_benchmark: bool,
}

/// Maps a metric and its benchmark onto a 0-100 risk value.
///
/// Parity scores 50. Below 50 is favorable: a lower-is-better metric under its
/// benchmark, or a higher-is-better metric above it.
pub fn compute_risk_value(stock_value: f64, industry_value: f64, direction: Direction) -> f64 {
    assess(stock_value, industry_value, direction).risk_value
}

pub fn assess(stock_value: f64, industry_value: f64, direction: Direction) -> RiskAssessment {
    if industry_value == 0.0 {
        return RiskAssessment {
            risk_value: NEUTRAL_RISK,
            ratio: None,
            degenerate_benchmark: true,
        };
    }

    let ratio = stock_value / industry_value;
    let raw = match direction {
        Direction::LowerIsBetter => NEUTRAL_RISK * ratio,
        // A non-positive ratio means the stock has none of what the benchmark has.
        Direction::HigherIsBetter if ratio <= 0.0 => MAX_RISK,
        Direction::HigherIsBetter => NEUTRAL_RISK / ratio,
    };

    RiskAssessment {
        risk_value: raw.clamp(MIN_RISK, MAX_RISK),
        ratio: Some(ratio),
        degenerate_benchmark: false,
    }
}
