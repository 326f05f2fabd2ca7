//! Zero-copy string keys over mapped memory.
//!
//! A [`RefStr`] is a borrowed byte span; hashing it never copies the bytes,
//! so a frequency table over millions of queries only stores
//! pointer/length pairs into the mapped file.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::hash::{BuildHasherDefault, Hash, Hasher};

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Plain FNV-1a over bytes
pub fn fnv1a_hash(bytes: &[u8]) -> u64 {
    fnv1a_update(FNV_OFFSET_BASIS, bytes)
}

fn fnv1a_update(mut hash: u64, bytes: &[u8]) -> u64 {
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// FNV-1a variant folding eight bytes per round.
///
/// Words are read as little-endian from the byte slice, so the result is
/// identical on every platform and alignment is irrelevant. The tail
/// (fewer than eight bytes) is hashed bytewise and folded in as one word.
/// Not compatible with [`fnv1a_hash`].
pub fn fnv1a_hash_fast(bytes: &[u8]) -> u64 {
    fnv1a_fast_update(FNV_OFFSET_BASIS, bytes)
}

fn fnv1a_fast_update(mut hash: u64, bytes: &[u8]) -> u64 {
    let mut words = bytes.chunks_exact(8);
    for word in &mut words {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(word);
        hash ^= u64::from_le_bytes(buf);
        hash = hash.wrapping_mul(FNV_PRIME);
    }

    let tail = words.remainder();
    if !tail.is_empty() {
        hash ^= fnv1a_hash(tail);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Streaming hasher built on [`fnv1a_hash_fast`]
#[derive(Debug, Clone, Copy)]
pub struct FnvHasher(u64);

impl Default for FnvHasher {
    fn default() -> Self {
        FnvHasher(FNV_OFFSET_BASIS)
    }
}

impl Hasher for FnvHasher {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        self.0 = fnv1a_fast_update(self.0, bytes);
    }

    #[inline]
    fn finish(&self) -> u64 {
        self.0
    }
}

pub type BuildFnvHasher = BuildHasherDefault<FnvHasher>;

/// Hash map keyed by zero-copy strings
pub type RefStrMap<'a, V> = HashMap<RefStr<'a>, V, BuildFnvHasher>;

/// A borrowed byte string; never outlives the buffer it points into
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct RefStr<'a>(&'a [u8]);

impl<'a> RefStr<'a> {
    #[inline]
    pub fn new(bytes: &'a [u8]) -> Self {
        RefStr(bytes)
    }

    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// UTF-8 view, replacing invalid sequences
    pub fn to_str_lossy(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.0)
    }
}

impl Hash for RefStr<'_> {
    // Content only: no length prefix, the hasher sees exactly the bytes
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write(self.0);
    }
}

impl<'a> From<&'a [u8]> for RefStr<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        RefStr(bytes)
    }
}

impl<'a> From<&'a str> for RefStr<'a> {
    fn from(s: &'a str) -> Self {
        RefStr(s.as_bytes())
    }
}

impl fmt::Display for RefStr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_str_lossy())
    }
}

impl fmt::Debug for RefStr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RefStr({:?})", self.to_str_lossy())
    }
}
