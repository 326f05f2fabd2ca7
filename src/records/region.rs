//! Read-only memory-mapped byte region.
//!
//! The region owns the file mapping for its whole lifetime; the mapping is
//! released exactly once when the region is dropped, including when setup
//! fails halfway (the file handle is closed by its own `Drop`).

use memmap2::Mmap;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while opening and mapping a file
#[derive(Debug, Error)]
pub enum RegionError {
    #[error("{}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: file too large to be mapped ({size} bytes)", path.display())]
    TooLarge { path: PathBuf, size: u64 },

    #[error("{}: {source}", path.display())]
    Map {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl RegionError {
    /// Operating system error code (`errno`) describing the failure
    pub fn os_error(&self) -> i32 {
        match self {
            RegionError::Open { source, .. } | RegionError::Map { source, .. } => {
                source.raw_os_error().unwrap_or(libc::EIO)
            }
            RegionError::TooLarge { .. } => libc::EOVERFLOW,
        }
    }
}

/// Expected access pattern over a part of the region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPattern {
    /// Linear forward read; the kernel may read ahead aggressively
    Sequential,
    /// Scattered probes (binary search); read-ahead is wasted
    Random,
}

/// Immutable view of a memory-mapped file
pub struct ByteRegion {
    path: PathBuf,
    /// `None` for empty files, which cannot be mapped
    mmap: Option<Mmap>,
}

impl ByteRegion {
    /// Open and map `path` read-only
    pub fn open(path: &Path) -> Result<Self, RegionError> {
        let file = File::open(path).map_err(|source| RegionError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let size = file
            .metadata()
            .map_err(|source| RegionError::Open {
                path: path.to_path_buf(),
                source,
            })?
            .len();

        if usize::try_from(size).is_err() || size > isize::MAX as u64 {
            return Err(RegionError::TooLarge {
                path: path.to_path_buf(),
                size,
            });
        }

        let mmap = if size == 0 {
            None
        } else {
            // SAFETY: the mapping is read-only and the file is not modified
            // by this process while mapped
            let mmap = unsafe { Mmap::map(&file) }.map_err(|source| RegionError::Map {
                path: path.to_path_buf(),
                source,
            })?;
            Some(mmap)
        };

        tracing::debug!(path = %path.display(), size, "mapped file");

        Ok(Self {
            path: path.to_path_buf(),
            mmap,
        })
    }

    /// Path of the mapped file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Region size in bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.mmap.as_ref().map_or(0, |m| m.len())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The mapped bytes
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or(&[])
    }

    /// Byte at `offset`; panics if `offset` is out of bounds
    #[inline]
    pub fn read_at(&self, offset: usize) -> u8 {
        self.as_bytes()[offset]
    }

    /// Hint the kernel about how `[offset, len)` is about to be read.
    ///
    /// Purely an optimization: failures are logged and otherwise ignored.
    pub fn hint(&self, offset: usize, pattern: AccessPattern) {
        assert!(offset <= self.len(), "hint offset {} past end {}", offset, self.len());

        #[cfg(unix)]
        if let Some(mmap) = &self.mmap {
            let len = mmap.len() - offset;
            if len == 0 {
                return;
            }
            let advice = match pattern {
                AccessPattern::Sequential => memmap2::Advice::Sequential,
                AccessPattern::Random => memmap2::Advice::Random,
            };
            if let Err(e) = mmap.advise_range(advice, offset, len) {
                tracing::debug!(?pattern, offset, error = %e, "madvise failed");
            }
        }

        #[cfg(not(unix))]
        let _ = pattern;
    }
}

impl std::fmt::Debug for ByteRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteRegion")
            .field("path", &self.path)
            .field("len", &self.len())
            .finish()
    }
}
