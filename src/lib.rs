//! Per-station min/mean/max over large `<station>;<temperature>` files.
//!
//! The input is split into record-aligned segments, each segment is scanned
//! into its own open-addressing table on a rayon pool, and the shard tables
//! are reduced into one result sorted by station name.

pub mod engine;
pub mod error;
pub mod format;
pub mod merge;
pub mod scanner;
pub mod segment;
pub mod stats;
pub mod table;

pub use engine::{Engine, EngineConfig};
pub use error::{AggregateError, Result};
pub use merge::MergedResult;
pub use stats::Statistic;
