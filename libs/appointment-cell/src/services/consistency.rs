// libs/appointment-cell/src/services/consistency.rs
//
// Serializes the check-then-act section of slot reservation. Concurrent
// reserve calls for the same (provider, date, time) key take turns; at most
// one can observe the slot as available and win it.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;
use uuid::Uuid;

pub struct BookingLockRegistry {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl BookingLockRegistry {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Acquire the reservation lock for one slot key, waiting behind any
    /// in-flight reservation for the same key. The guard must be held
    /// across the availability check, the conflict check, and the slot
    /// flip.
    pub async fn acquire(
        &self,
        provider_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
    ) -> OwnedMutexGuard<()> {
        let key = Self::lock_key(provider_id, date, time);

        let slot_lock = {
            let mut locks = self.locks.lock().await;
            // An entry with no holder or waiter is only referenced by the
            // map itself; evict those so the registry does not grow with
            // every slot key ever attempted.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(key.clone()).or_default())
        };

        debug!("Acquiring booking lock {}", key);
        slot_lock.lock_owned().await
    }

    fn lock_key(provider_id: Uuid, date: NaiveDate, time: NaiveTime) -> String {
        format!("slot_{}_{}_{}", provider_id, date, time)
    }
}

impl Default for BookingLockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn released_locks_are_evicted_from_the_registry() {
        let registry = BookingLockRegistry::new();
        let date = NaiveDate::from_ymd_opt(2027, 3, 1).unwrap();

        for minute in 0..5 {
            let time = NaiveTime::from_hms_opt(10, minute, 0).unwrap();
            let guard = registry.acquire(Uuid::new_v4(), date, time).await;
            drop(guard);
        }

        // Acquiring sweeps the released entries; only the live key stays.
        let time = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
        let _guard = registry.acquire(Uuid::new_v4(), date, time).await;
        assert_eq!(registry.locks.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn a_held_lock_survives_the_sweep() {
        let registry = BookingLockRegistry::new();
        let date = NaiveDate::from_ymd_opt(2027, 3, 1).unwrap();
        let time = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
        let provider_id = Uuid::new_v4();

        let _held = registry.acquire(provider_id, date, time).await;
        let other = NaiveTime::from_hms_opt(11, 0, 0).unwrap();
        let _other = registry.acquire(provider_id, date, other).await;

        assert_eq!(registry.locks.lock().await.len(), 2);
    }
}
