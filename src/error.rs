use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by this crate.
///
/// `get` never fails — a missing key is a normal `None`. Only `set`/`delete`
/// (allocation only), `read` (I/O, format, allocation), and `write` (I/O)
/// can fail; see each method's docs for its exact error subset.
#[derive(Error, Debug)]
pub enum HashIndexError {
    /// Opening, reading, writing, or seeking the backing file failed.
    #[error("io error on `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The file does not look like a hash index, or its length is wrong.
    #[error("format error in `{path}`: {reason}")]
    Format { path: PathBuf, reason: String },
    /// The bucket store could not be allocated.
    #[error("failed to allocate {requested} buckets")]
    Allocation { requested: u32 },
}

pub type Result<T> = std::result::Result<T, HashIndexError>;
