pub mod config;
pub mod modeled;
mod stats;


pub use config::{CacheConfig, ReplacementPolicy};
pub use modeled::{AccessOutcome, ModeledCache};
pub use stats::CacheStats;
