//! Generic record engine over memory-mapped files.
//!
//! - [`region`] - Read-only file mapping with access-pattern hints
//! - [`codec`] - The framing contract a record format must satisfy
//! - [`engine`] - Binary search locator and forward iteration
//!
//! The engine knows nothing about record semantics beyond the codec's
//! ordering, so any self-delimiting format can be plugged in.

pub mod codec;
pub mod engine;
pub mod region;

pub use codec::RecordCodec;
pub use engine::{MappedRecords, RecordIter, RecordLocation};
pub use region::{AccessPattern, ByteRegion, RegionError};
