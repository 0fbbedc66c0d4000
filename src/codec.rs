//! The on-disk format: an 8-byte magic, a packed 18-byte little-endian
//! header, and the bucket region verbatim — sentinels and all, so reading
//! back a file restores tombstones exactly as they were.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use log::{debug, trace};

use crate::bucket::BucketStore;
use crate::error::{HashIndexError, Result};
use crate::table::{Table, MAX_KEY_SIZE, MAX_VALUE_SIZE, MIN_KEY_SIZE, MIN_VALUE_SIZE};

const MAGIC: &[u8; 8] = b"BORG_IDX";
/// Size of the packed header: 8-byte magic + 2 x int32 + 2 x int8.
pub const HEADER_LEN: usize = 18;

fn io_err(path: &Path, source: std::io::Error) -> HashIndexError {
    HashIndexError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn format_err(path: &Path, reason: impl Into<String>) -> HashIndexError {
    HashIndexError::Format {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

/// Reads a table from `path`. Fails on I/O error, a bad magic, a file
/// length mismatch, or an out-of-range key/value size. Never returns a
/// partially constructed table.
pub fn read(path: &Path) -> Result<Table> {
    let file = File::open(path).map_err(|e| io_err(path, e))?;
    let length = file
        .metadata()
        .map_err(|e| io_err(path, e))?
        .len();
    let mut reader = BufReader::new(file);

    let mut header = [0u8; HEADER_LEN];
    reader
        .read_exact(&mut header)
        .map_err(|e| io_err(path, e))?;

    if &header[0..8] != MAGIC {
        return Err(format_err(path, "bad magic"));
    }
    let num_entries = i32::from_le_bytes(header[8..12].try_into().unwrap());
    let num_buckets = i32::from_le_bytes(header[12..16].try_into().unwrap());
    let key_size = header[16];
    let value_size = header[17];

    if num_entries < 0 || num_buckets < 0 {
        return Err(format_err(path, "negative entry or bucket count"));
    }
    if !(MIN_KEY_SIZE..=MAX_KEY_SIZE).contains(&key_size) {
        return Err(format_err(path, format!("key_size {key_size} out of [1,127]")));
    }
    if !(MIN_VALUE_SIZE..=MAX_VALUE_SIZE).contains(&value_size) {
        return Err(format_err(
            path,
            format!("value_size {value_size} out of [4,127]"),
        ));
    }

    let num_buckets = num_buckets as u32;
    let record_size = key_size as u64 + value_size as u64;
    let buckets_length = num_buckets as u64 * record_size;
    let expected_length = HEADER_LEN as u64 + buckets_length;
    if length != expected_length {
        return Err(format_err(
            path,
            format!("expected file length {expected_length}, got {length}"),
        ));
    }

    let mut buf = vec![0u8; buckets_length as usize];
    reader.read_exact(&mut buf).map_err(|e| io_err(path, e))?;

    let store = BucketStore::from_raw(buf, num_buckets, key_size, value_size);
    debug!(
        "read: {} buckets, {} entries from {}",
        num_buckets,
        num_entries,
        path.display()
    );
    Ok(Table::from_parts(store, num_entries as u32))
}

/// Writes `table` to `path`. The caller is responsible for atomicity
/// (write-to-tmp-then-rename) and for fsync'ing if that's required — this
/// function performs a single, non-atomic write.
pub fn write(table: &Table, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| io_err(path, e))?;
    let mut writer = BufWriter::new(file);

    let store: &BucketStore = table.store();
    let mut header = [0u8; HEADER_LEN];
    header[0..8].copy_from_slice(MAGIC);
    header[8..12].copy_from_slice(&(table.num_entries() as i32).to_le_bytes());
    header[12..16].copy_from_slice(&(store.num_buckets() as i32).to_le_bytes());
    header[16] = store.key_size();
    header[17] = store.value_size();

    writer.write_all(&header).map_err(|e| io_err(path, e))?;
    writer
        .write_all(store.as_bytes())
        .map_err(|e| io_err(path, e))?;
    writer.flush().map_err(|e| io_err(path, e))?;
    trace!(
        "write: {} buckets, {} entries to {}",
        store.num_buckets(),
        table.num_entries(),
        path.display()
    );
    Ok(())
}
