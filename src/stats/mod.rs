//! Query statistics over a mapped query log.
//!
//! - [`aggregate`] - Range filtering and frequency counting
//! - [`topk`] - Bounded min-heap selection of the most frequent queries
//!
//! ```no_run
//! use querylog::stats::{QueryLog, ScanConfig};
//! use std::path::Path;
//!
//! let log = QueryLog::open(Path::new("queries.tsv")).unwrap();
//! let config = ScanConfig::default().with_range(Some(1438387200), Some(1438473599));
//! let result = log.scan(&config);
//!
//! println!("{} distinct queries", result.distinct_count());
//! for top in result.top_queries(5) {
//!     println!("{}\t{}", top.query, top.count);
//! }
//! ```

pub mod aggregate;
pub mod topk;

pub use aggregate::{Aggregation, Aggregator, DEFAULT_JITTER, ScanConfig, ScanStats, TopQuery};
pub use topk::{TopKHeap, top_k};

use crate::records::RegionError;
use crate::request::QueryLogRecords;
use crate::utils::progress::ProgressBar;
use std::path::Path;

/// A query log file opened for analysis
pub struct QueryLog {
    records: QueryLogRecords,
}

impl QueryLog {
    /// Map the log at `path`
    pub fn open(path: &Path) -> Result<Self, RegionError> {
        Ok(Self {
            records: QueryLogRecords::open(path)?,
        })
    }

    /// The underlying record engine
    pub fn records(&self) -> &QueryLogRecords {
        &self.records
    }

    /// Scan the log once with `config`.
    ///
    /// The result borrows query bytes from the mapping, so it cannot
    /// outlive this log.
    pub fn scan(&self, config: &ScanConfig) -> Aggregation<'_> {
        Aggregator::new(&self.records, *config).run()
    }

    /// Same as [`scan`](Self::scan), reporting byte progress
    pub fn scan_with_progress(&self, config: &ScanConfig, progress: ProgressBar) -> Aggregation<'_> {
        Aggregator::new(&self.records, *config)
            .with_progress(progress)
            .run()
    }
}
