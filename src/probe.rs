//! Linear probing with opportunistic tombstone compaction.
//!
//! This is the algorithmic core of the index: home slot by `key[0..4]`,
//! walk forward on collision, skip tombstones, and when a match is found
//! past a tombstone, slide it into the tombstone's slot so future lookups
//! for that key take a shorter path.

use crate::bucket::{BucketStore, SlotState};

/// The result of a lookup.
pub struct Probe {
    /// The slot holding the key, if present (post-compaction).
    pub slot: Option<u32>,
    /// Where to insert this key if absent: the first tombstone seen, or
    /// the terminating `EMPTY` slot.
    pub insert_hint: u32,
}

#[inline]
fn home_slot(key: &[u8], num_buckets: u32) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&key[0..4]);
    u32::from_le_bytes(raw) % num_buckets
}

/// Looks up `key`, compacting a tombstone along the way if the key is
/// found past one. Returns the slot the key now lives in (if any) and an
/// insertion hint valid when `slot` is `None`.
pub fn lookup(store: &mut BucketStore, key: &[u8]) -> Probe {
    let num_buckets = store.num_buckets();
    let home = home_slot(key, num_buckets);
    let mut idx = home;
    let mut first_tombstone: Option<u32> = None;

    for _ in 0..num_buckets {
        match store.state(idx) {
            SlotState::Empty => {
                let hint = first_tombstone.unwrap_or(idx);
                return Probe {
                    slot: None,
                    insert_hint: hint,
                };
            }
            SlotState::Deleted => {
                if first_tombstone.is_none() {
                    first_tombstone = Some(idx);
                }
            }
            SlotState::Occupied => {
                if store.key(idx) == key {
                    if let Some(tomb) = first_tombstone {
                        store.relocate(idx, tomb);
                        return Probe {
                            slot: Some(tomb),
                            insert_hint: tomb,
                        };
                    }
                    return Probe {
                        slot: Some(idx),
                        insert_hint: idx,
                    };
                }
            }
        }
        idx = (idx + 1) % num_buckets;
    }

    // Wrapped all the way around without hitting EMPTY: pathologically full
    // table. Can't happen while load <= MAX_LOAD, but must terminate.
    Probe {
        slot: None,
        insert_hint: first_tombstone.unwrap_or(home),
    }
}
