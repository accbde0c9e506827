pub mod sample;
pub mod snapshot;
