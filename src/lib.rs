//! # querylog - Query statistics over large query logs
//!
//! querylog answers two questions about a big, append-only, loosely
//! time-sorted log of `<timestamp>\t<url-encoded query>` lines: how many
//! distinct queries were made during a time range, and which were the
//! most frequent.
//!
//! ## Architecture
//!
//! - [`records`] - Generic record engine: mapped file, framing contract,
//!   binary search and forward iteration
//! - [`request`] - The query-log record format
//! - [`stats`] - Range filtering, frequency counting and top-K selection
//! - [`output`] - Result formatting (text, colored, JSON)
//! - [`utils`] - Zero-copy keys and hashing, percent decoding, timing,
//!   configuration
//!
//! ## Quick Start
//!
//! ```no_run
//! use querylog::stats::{QueryLog, ScanConfig};
//! use std::path::Path;
//!
//! let log = QueryLog::open(Path::new("hn_logs.tsv")).unwrap();
//! let result = log.scan(&ScanConfig::default());
//!
//! println!("{}", result.distinct_count());
//! for top in result.top_queries(3) {
//!     println!("{} {}", top.decoded(), top.count);
//! }
//! ```
//!
//! ## Performance
//!
//! The log is memory-mapped and never copied: frequency-table keys are
//! borrowed slices of the mapping. When a start time is given, a binary
//! search over raw byte offsets (realigned on line starts) skips the
//! beginning of the file, and the scan stops once records are past the end
//! of the range by more than the tolerated disorder.

pub mod output;
pub mod records;
pub mod request;
pub mod stats;
pub mod utils;
