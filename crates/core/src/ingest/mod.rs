pub mod eodhd;
pub mod finnhub;
pub mod merge;
pub mod pipeline;
pub mod provider;
pub mod types;
