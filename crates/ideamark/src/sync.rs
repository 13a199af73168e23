//! Keyed locking.
//!
//! Serializes work per key (user id, subject id) while letting different
//! keys proceed in parallel.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A map of per-key mutexes guarding values of type `V`.
///
/// Entries are created lazily. Slots that hold data (profiles) live as
/// long as the map; pure mutual-exclusion slots are dropped with
/// [`KeyedLocks::evict_if_idle`] once no caller holds them.
pub struct KeyedLocks<K, V> {
    slots: Mutex<HashMap<K, Arc<Mutex<V>>>>,
}

impl<K, V> KeyedLocks<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Create an empty lock map.
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Return the slot for `key`, creating it with `init` on first use.
    pub fn slot(&self, key: &K, init: impl FnOnce() -> V) -> Arc<Mutex<V>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(init())))
            .clone()
    }

    /// Return the slot for `key` if one exists.
    pub fn existing(&self, key: &K) -> Option<Arc<Mutex<V>>> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.get(key).cloned()
    }

    /// Remove the slot for `key` if no caller holds a handle to it.
    ///
    /// Handles are only cloned under the map lock, so a strong count of one
    /// seen under that lock means nobody holds or waits on the slot.
    pub fn evict_if_idle(&self, key: &K) -> bool {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        match slots.get(key) {
            Some(slot) if Arc::strong_count(slot) == 1 => {
                slots.remove(key);
                true
            }
            _ => false,
        }
    }

    /// Number of live slots.
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no key has been seen yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> Default for KeyedLocks<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Lock a slot, recovering the data if a previous holder panicked.
pub fn lock_slot<V>(slot: &Mutex<V>) -> MutexGuard<'_, V> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}
