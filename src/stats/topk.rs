//! Bounded top-K selection.
//!
//! Keeps the K highest counts seen so far in a min-heap, so selecting from
//! `n` entries costs O(n log k) instead of sorting the whole table. The
//! order of entries with equal counts depends on iteration order and is
//! not specified.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Entry held by the heap, ordered by count only
#[derive(Debug, Clone)]
struct TopKEntry<K> {
    key: K,
    count: u64,
}

impl<K> PartialEq for TopKEntry<K> {
    fn eq(&self, other: &Self) -> bool {
        self.count == other.count
    }
}

impl<K> Eq for TopKEntry<K> {}

impl<K> PartialOrd for TopKEntry<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K> Ord for TopKEntry<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap, we want the minimum on top
        other.count.cmp(&self.count)
    }
}

/// Min-heap of at most `k` entries
pub struct TopKHeap<K> {
    heap: BinaryHeap<TopKEntry<K>>,
    capacity: usize,
}

impl<K> TopKHeap<K> {
    pub fn new(k: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(k.saturating_add(1).min(4096)),
            capacity: k,
        }
    }

    /// Smallest count currently kept, once the heap is full
    #[inline]
    pub fn threshold(&self) -> Option<u64> {
        if self.is_full() {
            self.heap.peek().map(|e| e.count)
        } else {
            None
        }
    }

    /// Offer an entry; returns true if it was kept.
    ///
    /// Once full, an entry at least as frequent as the current minimum
    /// replaces it.
    pub fn try_insert(&mut self, key: K, count: u64) -> bool {
        if self.heap.len() < self.capacity {
            self.heap.push(TopKEntry { key, count });
            true
        } else if self.threshold().is_some_and(|min| count >= min) {
            self.heap.pop();
            self.heap.push(TopKEntry { key, count });
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.capacity > 0 && self.heap.len() >= self.capacity
    }

    /// Consume the heap, most frequent first
    pub fn into_sorted_vec(mut self) -> Vec<(K, u64)> {
        let mut entries = Vec::with_capacity(self.heap.len());
        while let Some(entry) = self.heap.pop() {
            entries.push((entry.key, entry.count));
        }
        entries.reverse();
        entries
    }
}

/// The `k` entries with the highest counts, in descending count order
pub fn top_k<K, I>(entries: I, k: usize) -> Vec<(K, u64)>
where
    I: IntoIterator<Item = (K, u64)>,
{
    if k == 0 {
        return Vec::new();
    }
    let mut heap = TopKHeap::new(k);
    for (key, count) in entries {
        heap.try_insert(key, count);
    }
    heap.into_sorted_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_k_descending() {
        let entries = vec![("a", 3), ("b", 10), ("c", 1), ("d", 7), ("e", 5)];
        let top = top_k(entries, 3);
        assert_eq!(top, vec![("b", 10), ("d", 7), ("e", 5)]);
    }

    #[test]
    fn test_top_k_larger_than_input() {
        let top = top_k(vec![("a", 1), ("b", 2)], 10);
        assert_eq!(top, vec![("b", 2), ("a", 1)]);
    }

    #[test]
    fn test_top_k_zero() {
        assert!(top_k(vec![("a", 1)], 0).is_empty());
        let mut heap = TopKHeap::new(0);
        assert!(!heap.try_insert("a", 5));
        assert!(heap.threshold().is_none());
    }

    #[test]
    fn test_top_k_empty_input() {
        let top: Vec<(&str, u64)> = top_k(Vec::new(), 5);
        assert!(top.is_empty());
    }

    #[test]
    fn test_ties_keep_correct_counts() {
        let entries = vec![("a", 2), ("b", 2), ("c", 2), ("d", 9)];
        let top = top_k(entries, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0], ("d", 9));
        // Which of the tied entries wins is unspecified
        assert_eq!(top[1].1, 2);
        assert!(["a", "b", "c"].contains(&top[1].0));
    }

    #[test]
    fn test_threshold_tracks_minimum() {
        let mut heap = TopKHeap::new(2);
        assert!(heap.try_insert("a", 4));
        assert_eq!(heap.threshold(), None);
        assert!(heap.try_insert("b", 8));
        assert_eq!(heap.threshold(), Some(4));
        assert!(!heap.try_insert("c", 3));
        assert!(heap.try_insert("d", 4));
        assert_eq!(heap.threshold(), Some(4));
        assert!(heap.try_insert("e", 6));
        assert_eq!(heap.threshold(), Some(6));
        assert_eq!(heap.len(), 2);
    }

    #[test]
    fn test_matches_full_sort() {
        // Distinct counts so the expected order is unambiguous
        let entries: Vec<(u32, u64)> = (0..500u32).map(|i| (i, ((i as u64) * 7919) % 1009)).collect();
        let mut sorted = entries.clone();
        sorted.sort_by(|a, b| b.1.cmp(&a.1));

        let top = top_k(entries, 25);
        assert_eq!(top, sorted[..25].to_vec());
    }
}
