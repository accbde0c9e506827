use crate::domain::snapshot::{Direction, Metric, StockSnapshot};

/// Built-in dataset the dashboard renders before live data is available.
pub fn sample_snapshot() -> StockSnapshot {
    use Direction::{HigherIsBetter, LowerIsBetter};

    let metrics = [
        ("growth", "Revenue growth", 8.1, 10.0, Some("%"), HigherIsBetter),
        ("roe", "Return on equity", 147.3, 18.0, Some("%"), HigherIsBetter),
        ("eps", "Earnings per share", 5.89, 4.5, Some("$"), HigherIsBetter),
        ("dividend", "Dividend yield", 1.1, 1.5, Some("%"), HigherIsBetter),
        ("margin", "Net profit margin", 25.3, 12.0, Some("%"), HigherIsBetter),
        ("fcf", "Free cash flow / revenue", 28.1, 15.0, Some("%"), HigherIsBetter),
        ("pe", "Price / earnings", 28.5, 25.0, None, LowerIsBetter),
        ("pb", "Price / book", 4.8, 5.5, None, LowerIsBetter),
        ("ps", "Price / sales", 7.2, 4.0, None, LowerIsBetter),
        ("debt", "Debt ratio", 79.8, 60.0, Some("%"), LowerIsBetter),
    ]
    .into_iter()
    .map(|(id, name, stock_value, industry_value, unit, direction)| Metric {
        id: id.to_string(),
        name: name.to_string(),
        stock_value,
        industry_value,
        unit: unit.map(str::to_string),
        direction,
    })
    .collect();

    StockSnapshot {
        ticker: "AAPL".to_string(),
        company_name: "Apple Inc.".to_string(),
        current_price: Some(172.50),
        metrics,
    }
}
