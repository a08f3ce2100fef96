use std::{collections::HashMap, time::Duration};

use tokio::{sync::RwLock, time::Instant};

struct Slot<T> {
    value: T,
    deadline: Instant,
}

impl<T> Slot<T> {
    fn is_live(&self, now: Instant) -> bool {
        now < self.deadline
    }
}

/// Keyed values that expire a fixed time after they were stored.
///
/// Entries are replaced as a whole on `set`, so concurrent writers of the
/// same key race to the last write. Time is read from the tokio clock, which
/// lets tests drive expiry with `tokio::time::pause`/`advance`.
pub struct TimedCache<T> {
    slots: RwLock<HashMap<String, Slot<T>>>,
    ttl: Duration,
}

impl<T: Clone + Send + Sync> TimedCache<T> {
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
            ttl: Duration::from_secs(ttl_seconds),
        }
    }

    /// The stored value unless its TTL has run out.
    pub async fn get(&self, key: &str) -> Option<T> {
        let slots = self.slots.read().await;
        slots
            .get(key)
            .filter(|slot| slot.is_live(Instant::now()))
            .map(|slot| slot.value.clone())
    }

    pub async fn set(&self, key: &str, value: T) {
        let slot = Slot {
            value,
            deadline: Instant::now() + self.ttl,
        };
        self.slots.write().await.insert(key.to_owned(), slot);
    }

    /// Returns whether an entry, live or expired, was removed.
    pub async fn invalidate(&self, key: &str) -> bool {
        self.slots.write().await.remove(key).is_some()
    }

    /// Drops expired entries and returns how many went.
    pub async fn cleanup_expired(&self) -> usize {
        let now = Instant::now();
        let mut slots = self.slots.write().await;
        let before = slots.len();
        slots.retain(|_, slot| slot.is_live(now));
        before - slots.len()
    }

    pub async fn len(&self) -> usize {
        self.slots.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.slots.read().await.is_empty()
    }
}

impl<T> std::fmt::Debug for TimedCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimedCache")
            .field("ttl", &self.ttl)
            .finish()
    }
}
