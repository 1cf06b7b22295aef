//! Time-to-live cache for fetched tables.
//!
//! The outer lock only guards the key → slot map. Each slot has its own lock,
//! held across check-expiry-and-refresh, so two loads of the same source never
//! fetch twice inside one TTL window and never see a half-written entry.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};
use std::time::{Duration, Instant};

struct Entry<V> {
    value: Arc<V>,
    stored_at: Instant,
}

type Slot<V> = Arc<Mutex<Option<Entry<V>>>>;

pub struct TtlCache<K, V> {
    ttl: Duration,
    slots: Mutex<HashMap<K, Slot<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached value for `key`, or run `load` and cache its result.
    ///
    /// Errors are never cached. The returned flag is `true` on a cache hit.
    pub fn get_or_try_load<E>(
        &self,
        key: &K,
        load: impl FnOnce() -> Result<V, E>,
    ) -> Result<(Arc<V>, bool), E> {
        self.get_or_try_load_at(key, Instant::now(), load)
    }

    /// Same as `get_or_try_load` with an explicit clock reading.
    pub fn get_or_try_load_at<E>(
        &self,
        key: &K,
        now: Instant,
        load: impl FnOnce() -> Result<V, E>,
    ) -> Result<(Arc<V>, bool), E> {
        let slot = self.slot(key, now);
        let mut entry = lock(&*slot);

        if let Some(cached) = entry.as_ref() {
            if now.saturating_duration_since(cached.stored_at) < self.ttl {
                return Ok((Arc::clone(&cached.value), true));
            }
        }

        let value = Arc::new(load()?);
        *entry = Some(Entry {
            value: Arc::clone(&value),
            stored_at: now,
        });
        Ok((value, false))
    }

    fn slot(&self, key: &K, now: Instant) -> Slot<V> {
        let mut slots = lock(&self.slots);
        self.prune(&mut slots, now);
        Arc::clone(slots.entry(key.clone()).or_default())
    }

    /// Drop expired or empty slots nobody else holds.
    ///
    /// A slot referenced only by the map cannot gain a new holder while the
    /// map lock is held.
    fn prune(&self, slots: &mut HashMap<K, Slot<V>>, now: Instant) {
        slots.retain(|_, slot| {
            if Arc::strong_count(slot) > 1 {
                return true;
            }
            let entry = match slot.try_lock() {
                Ok(guard) => guard,
                Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
                Err(TryLockError::WouldBlock) => return true,
            };
            entry
                .as_ref()
                .is_some_and(|e| now.saturating_duration_since(e.stored_at) < self.ttl)
        });
    }
}

// A panic inside a loader leaves at worst a stale entry, so poisoning is ignored.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
