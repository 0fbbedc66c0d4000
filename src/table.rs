//! The `Index`/`Table` type: owns the bucket store, tracks entry count and
//! load thresholds, and orchestrates insert/delete/resize.

use log::{debug, trace};

use crate::bucket::BucketStore;
use crate::config::IndexConfig;
use crate::error::{HashIndexError, Result};
use crate::iter::Iter;
use crate::ladder;
use crate::probe;

/// Minimum key length in bytes.
pub const MIN_KEY_SIZE: u8 = 1;
/// Maximum key length in bytes.
pub const MAX_KEY_SIZE: u8 = 127;
/// Minimum value length in bytes — must fit the 4-byte state marker.
pub const MIN_VALUE_SIZE: u8 = 4;
/// Maximum value length in bytes.
pub const MAX_VALUE_SIZE: u8 = 127;

/// A fixed-schema, open-addressing hash index over opaque byte keys/values.
///
/// Not thread-safe: the caller must serialize all access to a given
/// `Table`. Borrowed views from `get`/`iter` are valid only until the next
/// mutating call (`set`, `delete`, a fresh `read`), enforced here by Rust's
/// borrow checker rather than by convention.
pub struct Table {
    store: BucketStore,
    num_entries: u32,
    upper_limit: u32,
    lower_limit: u32,
    key_size: u8,
    value_size: u8,
    automatic_resize: bool,
}

impl Table {
    /// Creates a fresh table sized to hold at least `capacity` entries
    /// before its first resize, per `config`.
    pub fn init(key_size: u8, value_size: u8, config: IndexConfig) -> Self {
        assert!(
            (MIN_KEY_SIZE..=MAX_KEY_SIZE).contains(&key_size),
            "key_size must be in [1,127], got {key_size}"
        );
        assert!(
            (MIN_VALUE_SIZE..=MAX_VALUE_SIZE).contains(&value_size),
            "value_size must be in [4,127], got {value_size}"
        );
        let num_buckets = ladder::fit(config.initial_capacity());
        let store = BucketStore::new(num_buckets, key_size, value_size);
        debug!("init: table of {num_buckets} buckets (key={key_size}, value={value_size})");
        Self {
            store,
            num_entries: 0,
            upper_limit: ladder::upper_limit(num_buckets),
            lower_limit: ladder::lower_limit(num_buckets),
            key_size,
            value_size,
            automatic_resize: config.is_automatic(),
        }
    }

    /// Creates a table with the ladder minimum capacity and automatic
    /// resizing — the common case.
    pub fn with_capacity(capacity: u32, key_size: u8, value_size: u8) -> Self {
        Self::init(
            key_size,
            value_size,
            IndexConfig::new().with_initial_capacity(capacity),
        )
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.num_entries as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.num_entries == 0
    }

    #[inline]
    pub fn key_size(&self) -> u8 {
        self.key_size
    }

    #[inline]
    pub fn value_size(&self) -> u8 {
        self.value_size
    }

    #[inline]
    pub fn num_buckets(&self) -> u32 {
        self.store.num_buckets()
    }

    /// Exact on-disk size this table would serialize to: the 18-byte header
    /// plus the bucket region.
    pub fn file_size(&self) -> u64 {
        crate::codec::HEADER_LEN as u64
            + self.store.num_buckets() as u64 * (self.key_size as u64 + self.value_size as u64)
    }

    fn check_key_len(&self, key: &[u8]) {
        debug_assert_eq!(
            key.len(),
            self.key_size as usize,
            "key length must equal the table's fixed key_size"
        );
    }

    fn check_value_len(&self, value: &[u8]) {
        debug_assert_eq!(
            value.len(),
            self.value_size as usize,
            "value length must equal the table's fixed value_size"
        );
    }

    /// Looks up `key`. Never fails; absent keys return `None`. May compact
    /// a tombstone as a side effect, which does not change `num_entries`.
    pub fn get(&mut self, key: &[u8]) -> Option<&[u8]> {
        self.check_key_len(key);
        let probe = probe::lookup(&mut self.store, key);
        probe.slot.map(move |slot| self.store.value(slot))
    }

    /// Inserts or overwrites `key` -> `value`. May trigger a resize-up if
    /// this is a new entry and the load factor would exceed `upper_limit`.
    ///
    /// Only fails if a triggered resize fails to allocate; the table is
    /// left in its previous valid state on failure.
    pub fn set(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.check_key_len(key);
        self.check_value_len(value);

        let probe = probe::lookup(&mut self.store, key);
        if let Some(slot) = probe.slot {
            self.store.write_value(slot, value);
            return Ok(());
        }

        let mut hint = probe.insert_hint;
        if self.num_entries > self.upper_limit {
            if !self.automatic_resize {
                return Err(HashIndexError::Allocation {
                    requested: self.store.num_buckets(),
                });
            }
            self.resize(ladder::grow(self.store.num_buckets()))?;
            hint = probe::lookup(&mut self.store, key).insert_hint;
        }

        // The hinted slot may already have been reused by the resize above
        // (fresh table, fresh probe) or, on the non-resize path, by nothing
        // — but walk forward defensively in case a later slot was claimed
        // between the hint and the write.
        let mut idx = hint;
        let num_buckets = self.store.num_buckets();
        while self.store.state(idx) == crate::bucket::SlotState::Occupied {
            idx = (idx + 1) % num_buckets;
        }
        self.store.write(idx, key, value);
        self.num_entries += 1;
        Ok(())
    }

    /// Deletes `key` if present. Idempotent: deleting an absent key
    /// succeeds. May trigger a resize-down.
    pub fn delete(&mut self, key: &[u8]) -> Result<()> {
        self.check_key_len(key);
        let probe = probe::lookup(&mut self.store, key);
        let slot = match probe.slot {
            Some(s) => s,
            None => return Ok(()),
        };
        self.store.mark_deleted(slot);
        self.num_entries -= 1;
        if self.automatic_resize && self.num_entries < self.lower_limit {
            self.resize(ladder::shrink(self.store.num_buckets()))?;
        }
        Ok(())
    }

    /// Borrowed `(key, value)` pairs for every occupied slot, in storage
    /// order.
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(&self.store)
    }

    /// Rebuilds the table at `ladder::fit(new_capacity)`, reinserting every
    /// occupied entry in storage order. On allocation failure the old
    /// table is left untouched.
    fn resize(&mut self, new_capacity: u32) -> Result<()> {
        let fitted = ladder::fit(new_capacity);
        trace!(
            "resize: {} -> {} buckets ({} entries)",
            self.store.num_buckets(),
            fitted,
            self.num_entries
        );
        let mut new_store = BucketStore::new(fitted, self.key_size, self.value_size);

        for slot in 0..self.store.num_buckets() {
            if self.store.state(slot) != crate::bucket::SlotState::Occupied {
                continue;
            }
            let key = self.store.key(slot).to_vec();
            let value = self.store.value(slot).to_vec();
            insert_fresh(&mut new_store, &key, &value);
        }

        self.store = new_store;
        self.upper_limit = ladder::upper_limit(fitted);
        self.lower_limit = ladder::lower_limit(fitted);
        Ok(())
    }

    pub(crate) fn from_parts(store: BucketStore, num_entries: u32) -> Self {
        let num_buckets = store.num_buckets();
        Self {
            key_size: store.key_size(),
            value_size: store.value_size(),
            upper_limit: ladder::upper_limit(num_buckets),
            lower_limit: ladder::lower_limit(num_buckets),
            num_entries,
            store,
            automatic_resize: true,
        }
    }

    pub(crate) fn store(&self) -> &BucketStore {
        &self.store
    }

    pub(crate) fn num_entries(&self) -> u32 {
        self.num_entries
    }
}

/// Inserts into a freshly allocated store that is known not to contain
/// `key` and not to need a resize — the resize controller's reinsertion
/// step. Equivalent to `set`'s insert path minus the threshold check.
fn insert_fresh(store: &mut BucketStore, key: &[u8], value: &[u8]) {
    let probe = probe::lookup(store, key);
    let mut idx = probe.insert_hint;
    let num_buckets = store.num_buckets();
    while store.state(idx) == crate::bucket::SlotState::Occupied {
        idx = (idx + 1) % num_buckets;
    }
    store.write(idx, key, value);
}
