//! Rollup, index and dedup recommendations
//!
//! [`CardinalityAnalyser`] measures value repetition for fields carrying a
//! unique-valued format, and [`suggest_config`] turns those measurements and
//! the dedup-format conflicts into dataset configuration suggestions.

mod cardinality;
mod suggestor;

pub use cardinality::{CardinalityAnalyser, RollupEntry};
pub use suggestor::{
    Configurations, DedupKey, IndexConfiguration, IndexDefaults, Processing, suggest_config,
};
