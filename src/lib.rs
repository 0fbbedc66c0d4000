//! A fixed-schema, open-addressing hash index used as the key-value
//! substrate of a deduplicating backup system.
//!
//! Keys and values are fixed-width opaque byte strings; the table itself
//! never hashes anything — callers are expected to supply keys that are
//! already hash-like (e.g. content hashes), and the first 4 bytes of each
//! key are used directly as the probe seed. See [`table::Table`] for the
//! main entry point.

/// Bucket layout and sentinel encoding.
pub mod bucket;
/// On-disk persistence format.
pub mod codec;
/// Construction-time table configuration.
pub mod config;
/// Crate-wide error type.
pub mod error;
/// Occupied-slot iteration.
pub mod iter;
/// The deterministic capacity ladder.
pub mod ladder;
/// Linear-probing lookup with tombstone compaction.
pub mod probe;
/// The `Index`/`Table` type.
pub mod table;

pub use error::{HashIndexError, Result};
pub use table::Table;
