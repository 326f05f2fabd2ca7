//! Record framing contract.
//!
//! A codec describes one variable-length, self-delimiting record format.
//! Records must be locatable from an arbitrary byte offset: given any
//! position inside a record, the codec can find where that record starts
//! and where the following one starts, in time proportional to the record
//! size. Line-delimited formats satisfy this trivially.

use std::cmp::Ordering;

/// Record format understood by [`MappedRecords`](super::MappedRecords)
pub trait RecordCodec {
    /// Decoded record, borrowing from the mapped bytes
    type Record<'a>;

    /// Decode the record starting exactly at `offset` (a record frontier).
    ///
    /// Returns the record and the offset of the next frontier. Malformed
    /// bytes yield an invalid record rather than an error, and the returned
    /// offset is always strictly greater than `offset` unless
    /// `offset == data.len()`.
    fn decode(data: &[u8], offset: usize) -> (Self::Record<'_>, usize);

    /// Start of the record containing `offset` (or 0)
    fn frontier_before(data: &[u8], offset: usize) -> usize;

    /// Start of the record following the one containing `offset`
    /// (or `data.len()`)
    fn frontier_after(data: &[u8], offset: usize) -> usize;

    /// Total order used by binary search; ties are permitted
    fn order(a: &Self::Record<'_>, b: &Self::Record<'_>) -> Ordering;
}
