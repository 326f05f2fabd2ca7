//! Query-log record format.
//!
//! One record per line: `<decimal timestamp><spaces or tabs><raw query>`.
//! The query is kept URL-encoded and borrowed from the mapped file; it is
//! only percent-decoded on demand for display. Two escapings of the same
//! logical query are therefore distinct keys.
//!
//! Timestamps are accumulated in a `u64` with wrapping arithmetic: digit
//! runs beyond `u64::MAX` silently wrap around.

use crate::records::{MappedRecords, RecordCodec};
use crate::utils::{percent_decode_lossy, RefStr};
use memchr::{memchr, memrchr};
use std::cmp::Ordering;
use std::fmt;

/// Seconds since the Unix epoch
pub type Timestamp = u64;

/// Query-log records mapped from a file
pub type QueryLogRecords = MappedRecords<QueryLogCodec>;

/// One decoded log line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryRecord<'a> {
    timestamp: Timestamp,
    query: RefStr<'a>,
    valid: bool,
}

impl QueryRecord<'static> {
    /// Query-less record, usable as a search reference
    pub fn at(timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            query: RefStr::default(),
            valid: false,
        }
    }
}

impl<'a> QueryRecord<'a> {
    #[inline]
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// The query as found in the file (not URL-decoded)
    #[inline]
    pub fn raw_query(&self) -> RefStr<'a> {
        self.query
    }

    /// A record is valid if it has a non-zero timestamp and a non-empty query
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// The URL-decoded query
    pub fn decoded_query(&self) -> String {
        percent_decode_lossy(self.query.as_bytes())
    }
}

impl fmt::Display for QueryRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.timestamp, self.decoded_query())
    }
}

#[inline]
fn is_space(c: u8) -> bool {
    c == b' ' || c == b'\t'
}

/// Codec for newline-delimited query-log lines
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryLogCodec;

impl RecordCodec for QueryLogCodec {
    type Record<'a> = QueryRecord<'a>;

    fn decode(data: &[u8], offset: usize) -> (QueryRecord<'_>, usize) {
        let size = data.len();
        assert!(offset <= size, "offset {} past end {}", offset, size);

        let mut pos = offset;

        // Hand-rolled: the digit run is not terminated by anything we can
        // hand to a parser without first scanning it
        let mut timestamp: Timestamp = 0;
        while pos < size && data[pos].is_ascii_digit() {
            timestamp = timestamp
                .wrapping_mul(10)
                .wrapping_add((data[pos] - b'0') as Timestamp);
            pos += 1;
        }

        while pos < size && is_space(data[pos]) {
            pos += 1;
        }

        let end = memchr(b'\n', &data[pos..]).map_or(size, |i| pos + i);
        let query = RefStr::new(&data[pos..end]);
        let next = if end < size { end + 1 } else { size };

        let record = QueryRecord {
            timestamp,
            query,
            valid: timestamp != 0 && !query.is_empty(),
        };
        (record, next)
    }

    fn frontier_before(data: &[u8], offset: usize) -> usize {
        assert!(offset <= data.len());
        memrchr(b'\n', &data[..offset]).map_or(0, |i| i + 1)
    }

    fn frontier_after(data: &[u8], offset: usize) -> usize {
        assert!(offset <= data.len());
        memchr(b'\n', &data[offset..]).map_or(data.len(), |i| offset + i + 1)
    }

    fn order(a: &QueryRecord<'_>, b: &QueryRecord<'_>) -> Ordering {
        a.timestamp.cmp(&b.timestamp)
    }
}
