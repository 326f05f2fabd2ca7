//! Utility functions and data structures.
//!
//! ## Modules
//!
//! - [`app_data`] - User configuration file (XDG-compliant location)
//! - [`chrono`] - Lap timer and duration formatting for diagnostics
//! - [`encoding`] - Percent-decoding of URL-encoded queries
//! - [`progress`] - Progress bar, no-op without the `progress` feature
//! - [`refstr`] - Zero-copy string keys and FNV-1a hashing
//!
//! ```no_run
//! use querylog::utils::{percent_decode_lossy, RefStr, RefStrMap};
//!
//! let buffer = b"foo+bar";
//! let mut counts: RefStrMap<'_, u64> = RefStrMap::default();
//! *counts.entry(RefStr::new(buffer)).or_insert(0) += 1;
//!
//! assert_eq!(percent_decode_lossy(buffer), "foo bar");
//! ```

pub mod app_data;
pub mod chrono;
pub mod encoding;
pub mod progress;
pub mod refstr;

pub use app_data::*;
pub use chrono::*;
pub use encoding::*;
pub use refstr::*;
