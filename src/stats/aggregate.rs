//! Time-range filtering and query counting.
//!
//! The log is only loosely sorted by timestamp: records may appear up to
//! `jitter` seconds out of order. Seeking and early termination are both
//! widened by that tolerance so no in-range record is missed.

use super::topk::top_k;
use crate::request::{QueryLogRecords, QueryRecord, Timestamp};
use crate::utils::progress::ProgressBar;
use crate::utils::{Chrono, RefStr, RefStrMap};
use std::cmp::Ordering;
use std::time::Duration;

/// Records between two progress updates
const PROGRESS_INTERVAL: u64 = 1 << 16;

/// Default disorder tolerance: 15 minutes
pub const DEFAULT_JITTER: u64 = 900;

/// Scan parameters, fixed before the scan starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    /// First timestamp of the range (inclusive)
    pub from: Timestamp,
    /// Last timestamp of the range (inclusive)
    pub to: Timestamp,
    /// Binary-search the start position and stop early past the range
    pub fast_seek: bool,
    /// Tolerated disorder, in seconds
    pub jitter: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            from: 0,
            to: Timestamp::MAX,
            fast_seek: true,
            jitter: DEFAULT_JITTER,
        }
    }
}

impl ScanConfig {
    pub fn with_range(mut self, from: Option<Timestamp>, to: Option<Timestamp>) -> Self {
        if let Some(from) = from {
            self.from = from;
        }
        if let Some(to) = to {
            self.to = to;
        }
        self
    }

    pub fn with_fast_seek(mut self, enabled: bool, jitter: u64) -> Self {
        self.fast_seek = enabled;
        self.jitter = jitter;
        self
    }

    #[inline]
    fn contains(&self, stamp: Timestamp) -> bool {
        stamp >= self.from && stamp <= self.to
    }

    /// Whether a record this far past the range ends the scan
    #[inline]
    fn is_past_end(&self, stamp: Timestamp) -> bool {
        self.fast_seek && stamp > self.to && stamp - self.to > self.jitter
    }

    /// Lower bound to seek to, if seeking is worthwhile
    fn seek_target(&self) -> Option<Timestamp> {
        (self.fast_seek && self.from > self.jitter).then(|| self.from - self.jitter)
    }
}

/// Counters collected while scanning
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// In-range records counted
    pub read: u64,
    /// Valid records outside the range
    pub skipped: u64,
    /// Malformed records
    pub invalid: u64,
    /// Largest observed backward deviation among in-range records, in seconds
    pub max_jitter: u64,
    /// Offset the scan started from, when a seek was performed
    pub seek_offset: Option<usize>,
    /// Time spent seeking, when a seek was performed
    pub seek_time: Option<Duration>,
    /// Time spent in the linear scan
    pub scan_time: Duration,
}

/// A query with its number of occurrences
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopQuery<'a> {
    pub query: RefStr<'a>,
    pub count: u64,
}

impl TopQuery<'_> {
    /// The URL-decoded query
    pub fn decoded(&self) -> String {
        crate::utils::percent_decode_lossy(self.query.as_bytes())
    }
}

/// Result of a scan: query frequencies borrowed from the mapped log
#[derive(Debug)]
pub struct Aggregation<'a> {
    frequencies: RefStrMap<'a, u64>,
    stats: ScanStats,
}

impl<'a> Aggregation<'a> {
    /// Number of distinct raw queries in range
    pub fn distinct_count(&self) -> usize {
        self.frequencies.len()
    }

    /// The `k` most frequent queries, most frequent first.
    /// Order among equal counts is unspecified.
    pub fn top_queries(&self, k: usize) -> Vec<TopQuery<'a>> {
        top_k(self.frequencies.iter().map(|(q, c)| (*q, *c)), k)
            .into_iter()
            .map(|(query, count)| TopQuery { query, count })
            .collect()
    }

    /// Occurrences of `query` in range
    pub fn count_of(&self, query: &[u8]) -> u64 {
        self.frequencies.get(&RefStr::new(query)).copied().unwrap_or(0)
    }

    pub fn frequencies(&self) -> &RefStrMap<'a, u64> {
        &self.frequencies
    }

    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }
}

/// One scan over a query log
pub struct Aggregator<'a> {
    records: &'a QueryLogRecords,
    config: ScanConfig,
    progress: Option<ProgressBar>,
}

impl<'a> Aggregator<'a> {
    pub fn new(records: &'a QueryLogRecords, config: ScanConfig) -> Self {
        Self {
            records,
            config,
            progress: None,
        }
    }

    /// Report scan progress (in bytes) on `progress`
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn run(self) -> Aggregation<'a> {
        let config = self.config;
        let mut chrono = Chrono::new();
        let mut stats = ScanStats::default();

        let location = match config.seek_target() {
            Some(target) => {
                // One-sided comparison: converge on the first record not
                // older than the jittered lower bound
                let location = self.records.locate_by(|record: &QueryRecord<'_>| {
                    if record.timestamp() < target {
                        Ordering::Less
                    } else {
                        Ordering::Greater
                    }
                });
                stats.seek_offset = Some(location.offset());
                stats.seek_time = Some(chrono.tick());
                tracing::debug!(target, offset = location.offset(), "seeked");
                location
            }
            None => self.records.begin(),
        };

        let mut frequencies: RefStrMap<'a, u64> = RefStrMap::default();
        let mut max_stamp: Timestamp = 0;
        let mut seen: u64 = 0;

        let mut iter = self.records.iterate(location);
        while let Some(record) = iter.next() {
            seen += 1;
            if let Some(progress) = &self.progress {
                if seen % PROGRESS_INTERVAL == 0 {
                    progress.set_position(iter.offset() as u64);
                }
            }

            let stamp = record.timestamp();
            if !record.is_valid() {
                stats.invalid += 1;
            } else if config.contains(stamp) {
                *frequencies.entry(record.raw_query()).or_insert(0) += 1;
                stats.read += 1;

                if stamp > max_stamp {
                    max_stamp = stamp;
                } else if max_stamp - stamp > stats.max_jitter {
                    stats.max_jitter = max_stamp - stamp;
                }
            } else if config.is_past_end(stamp) {
                tracing::debug!(stamp, offset = iter.offset(), "past range end, stopping");
                break;
            } else {
                stats.skipped += 1;
            }
        }

        stats.scan_time = chrono.tick();
        if let Some(progress) = &self.progress {
            progress.finish_and_clear();
        }

        tracing::debug!(
            read = stats.read,
            skipped = stats.skipped,
            invalid = stats.invalid,
            max_jitter = stats.max_jitter,
            distinct = frequencies.len(),
            "scan complete"
        );

        Aggregation { frequencies, stats }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn mapped(content: &[u8]) -> (tempfile::NamedTempFile, QueryLogRecords) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file.flush().unwrap();
        let records = QueryLogRecords::open(file.path()).unwrap();
        (file, records)
    }

    fn no_seek() -> ScanConfig {
        ScanConfig::default().with_fast_seek(false, 0)
    }

    #[test]
    fn test_counts_duplicates() {
        let (_file, records) = mapped(b"100 a\n200 b\n100 a\n");
        let result = Aggregator::new(&records, no_seek().with_range(Some(0), Some(1000))).run();

        assert_eq!(result.distinct_count(), 2);
        let top = result.top_queries(1);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].query.as_bytes(), b"a");
        assert_eq!(top[0].count, 2);
        assert_eq!(result.stats().read, 3);
        assert_eq!(result.stats().seek_offset, None);
    }

    #[test]
    fn test_range_bounds_inclusive() {
        let (_file, records) = mapped(b"10 a\n20 b\n30 c\n40 d\n");
        let result = Aggregator::new(&records, no_seek().with_range(Some(20), Some(30))).run();

        assert_eq!(result.distinct_count(), 2);
        assert_eq!(result.count_of(b"b"), 1);
        assert_eq!(result.count_of(b"c"), 1);
        assert_eq!(result.count_of(b"a"), 0);
        assert_eq!(result.stats().skipped, 2);
    }

    #[test]
    fn test_invalid_records_counted() {
        let (_file, records) = mapped(b"garbage\n100 a\n0 zero\n200\n\n300 b");
        let result = Aggregator::new(&records, no_seek()).run();

        assert_eq!(result.distinct_count(), 2);
        assert_eq!(result.stats().read, 2);
        assert_eq!(result.stats().invalid, 4);
    }

    #[test]
    fn test_raw_keys_not_merged() {
        let (_file, records) = mapped(b"1 a+b\n2 a%20b\n3 a+b\n");
        let result = Aggregator::new(&records, no_seek()).run();

        assert_eq!(result.distinct_count(), 2);
        let top = result.top_queries(2);
        assert_eq!(top[0].query.as_bytes(), b"a+b");
        assert_eq!(top[0].decoded(), "a b");
        assert_eq!(top[1].decoded(), "a b");
    }

    #[test]
    fn test_jitter_stop_and_late_record() {
        let (_file, records) = mapped(b"100 a\n50 b\n300 c\n");
        let config = ScanConfig::default()
            .with_fast_seek(true, 60)
            .with_range(None, Some(100));
        let result = Aggregator::new(&records, config).run();

        assert_eq!(result.count_of(b"a"), 1);
        assert_eq!(result.count_of(b"b"), 1);
        assert_eq!(result.count_of(b"c"), 0);
        assert_eq!(result.stats().read, 2);
        // Scan stopped on `c` instead of skipping it
        assert_eq!(result.stats().skipped, 0);
        assert_eq!(result.stats().max_jitter, 50);
    }

    #[test]
    fn test_within_jitter_past_end_is_skipped() {
        let (_file, records) = mapped(b"100 a\n130 b\n90 c\n500 d\n95 e\n");
        let config = ScanConfig::default()
            .with_fast_seek(true, 60)
            .with_range(None, Some(100));
        let result = Aggregator::new(&records, config).run();

        // `b` is past the end but within tolerance; `c` is still counted
        assert_eq!(result.count_of(b"c"), 1);
        assert_eq!(result.stats().skipped, 1);
        // `d` stops the scan, so `e` is never seen
        assert_eq!(result.count_of(b"e"), 0);
    }

    #[test]
    fn test_seek_skips_leading_records() {
        let mut content = String::new();
        for ts in (1_000..2_000).step_by(10) {
            content.push_str(&format!("{}\tq{}\n", ts, ts % 3));
        }
        let (_file, records) = mapped(content.as_bytes());

        let config = ScanConfig::default()
            .with_fast_seek(true, 100)
            .with_range(Some(1_500), Some(1_600));
        let result = Aggregator::new(&records, config).run();

        let offset = result.stats().seek_offset.unwrap();
        assert!(offset > 0);
        assert!(result.stats().seek_time.is_some());
        assert_eq!(result.stats().read, 11);
        // Only the jitter windows around the range are skipped
        assert_eq!(result.stats().skipped, 10 + 10);

        let unseeked = Aggregator::new(&records, no_seek().with_range(Some(1_500), Some(1_600))).run();
        assert_eq!(unseeked.frequencies(), result.frequencies());
    }

    #[test]
    fn test_seek_not_used_when_from_within_jitter() {
        let (_file, records) = mapped(b"100 a\n200 b\n");
        let config = ScanConfig::default()
            .with_fast_seek(true, 900)
            .with_range(Some(150), None);
        let result = Aggregator::new(&records, config).run();
        assert_eq!(result.stats().seek_offset, None);
        assert_eq!(result.distinct_count(), 1);
    }

    #[test]
    fn test_empty_log() {
        let (_file, records) = mapped(b"");
        let result = Aggregator::new(&records, ScanConfig::default().with_range(Some(5_000), None)).run();
        assert_eq!(result.distinct_count(), 0);
        assert!(result.top_queries(10).is_empty());
        assert_eq!(result.stats().seek_offset, Some(0));
    }

    #[test]
    fn test_rerun_is_identical() {
        let (_file, records) = mapped(b"5 x\n6 y\n7 x\n8 z\n9 x\n");
        let first = Aggregator::new(&records, no_seek()).run();
        let second = Aggregator::new(&records, no_seek()).run();
        assert_eq!(first.frequencies(), second.frequencies());
        assert_eq!(first.stats().read, second.stats().read);
    }
}
