//! Binary search and forward iteration over mapped records.

use super::codec::RecordCodec;
use super::region::{AccessPattern, ByteRegion, RegionError};
use std::cmp::Ordering;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::path::Path;

/// A loosely sorted set of variable-size records living in a mapped file
pub struct MappedRecords<C: RecordCodec> {
    region: ByteRegion,
    _codec: PhantomData<fn() -> C>,
}

impl<C: RecordCodec> MappedRecords<C> {
    /// Map `path` and expose it as a set of `C` records
    pub fn open(path: &Path) -> Result<Self, RegionError> {
        Ok(Self::from_region(ByteRegion::open(path)?))
    }

    pub fn from_region(region: ByteRegion) -> Self {
        Self {
            region,
            _codec: PhantomData,
        }
    }

    /// The underlying byte region
    pub fn region(&self) -> &ByteRegion {
        &self.region
    }

    /// Size of the mapped data in bytes
    pub fn len(&self) -> usize {
        self.region.len()
    }

    pub fn is_empty(&self) -> bool {
        self.region.is_empty()
    }

    /// Location of the first record
    pub fn begin(&self) -> RecordLocation<'_, C> {
        RecordLocation::new(self, 0)
    }

    /// Locate the frontier nearest to where `reference` would sit, using
    /// the codec ordering.
    pub fn locate(&self, reference: &C::Record<'_>) -> RecordLocation<'_, C> {
        self.locate_by(|record| C::order(record, reference))
    }

    /// Locate a position with an arbitrary comparator.
    ///
    /// `compare` tells how a probed record sits relative to the target:
    /// `Greater` means the target lies before it, `Less` after it, `Equal`
    /// stops the search on that record. A comparator that never answers
    /// `Equal` converges on the first record not ordered before the target.
    pub fn locate_by<F>(&self, compare: F) -> RecordLocation<'_, C>
    where
        F: FnMut(&C::Record<'_>) -> Ordering,
    {
        // Probes jump around the file: no read-ahead
        self.region.hint(0, AccessPattern::Random);

        let offset = self.search(compare, 0, self.len());
        RecordLocation::new(self, offset)
    }

    /// Iterate records forward from `location` to the end of the region
    pub fn iterate<'a>(&'a self, location: RecordLocation<'a, C>) -> RecordIter<'a, C> {
        debug_assert!(std::ptr::eq(location.records, self));
        RecordIter::new(self, location.offset)
    }

    /// Binary search over `[left, right)`, both record frontiers
    /// (`right` may equal the region size).
    fn search<F>(&self, mut compare: F, mut left: usize, mut right: usize) -> usize
    where
        F: FnMut(&C::Record<'_>) -> Ordering,
    {
        let data = self.region.as_bytes();
        let size = data.len();

        loop {
            if left == right {
                return left;
            }

            assert!(left < size, "left bound {} past end {}", left, size);
            assert!(right <= size, "right bound {} past end {}", right, size);
            assert!(left < right);

            // Realign on the enclosing record start; never the following
            // one, so that the probe cannot land on `right`
            let middle = C::frontier_before(data, left + (right - left) / 2);
            debug_assert!(middle >= left && middle < right);

            let (record, next) = C::decode(data, middle);

            match compare(&record) {
                Ordering::Greater => {
                    right = middle;
                }
                Ordering::Less => {
                    debug_assert!(next > middle);
                    left = next;
                }
                Ordering::Equal => return middle,
            }
        }
    }
}

/// A record frontier inside a [`MappedRecords`]
pub struct RecordLocation<'a, C: RecordCodec> {
    records: &'a MappedRecords<C>,
    offset: usize,
}

impl<'a, C: RecordCodec> RecordLocation<'a, C> {
    fn new(records: &'a MappedRecords<C>, offset: usize) -> Self {
        assert!(offset <= records.len());
        Self { records, offset }
    }

    /// Byte offset of this frontier
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Whether this location is the end of the region
    pub fn is_end(&self) -> bool {
        self.offset == self.records.len()
    }
}

impl<C: RecordCodec> Clone for RecordLocation<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: RecordCodec> Copy for RecordLocation<'_, C> {}

impl<C: RecordCodec> std::fmt::Debug for RecordLocation<'_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordLocation")
            .field("offset", &self.offset)
            .finish()
    }
}

impl<'a, C: RecordCodec> IntoIterator for RecordLocation<'a, C> {
    type Item = C::Record<'a>;
    type IntoIter = RecordIter<'a, C>;

    fn into_iter(self) -> Self::IntoIter {
        RecordIter::new(self.records, self.offset)
    }
}

/// Single-pass forward iterator over records
pub struct RecordIter<'a, C: RecordCodec> {
    data: &'a [u8],
    offset: usize,
    _codec: PhantomData<fn() -> C>,
}

impl<'a, C: RecordCodec> RecordIter<'a, C> {
    fn new(records: &'a MappedRecords<C>, offset: usize) -> Self {
        let region = records.region();
        assert!(offset <= region.len());
        if offset != region.len() {
            region.hint(offset, AccessPattern::Sequential);
        }

        Self {
            data: region.as_bytes(),
            offset,
            _codec: PhantomData,
        }
    }

    /// Offset of the next record to be decoded
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl<'a, C: RecordCodec> Iterator for RecordIter<'a, C> {
    type Item = C::Record<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.data.len() {
            return None;
        }

        let (record, next) = C::decode(self.data, self.offset);
        assert!(next > self.offset, "codec did not advance past {}", self.offset);
        self.offset = next;
        Some(record)
    }
}

impl<C: RecordCodec> FusedIterator for RecordIter<'_, C> {}
