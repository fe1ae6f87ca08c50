//! Signal store - the live value of every signal, keyed by signal id.
//!
//! Values are kept in an `Arc<HashMap>` snapshot that is copied on write, so
//! readers (renderer, workflow engine) get a cheap consistent view without
//! holding the lock. Observers are notified after the lock is released.

use log::{debug, warn};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};

use ramme_types::SignalValue;

use crate::clock::SharedClock;

/// Immutable view of all signal values at one point in time
pub type SignalSnapshot = Arc<HashMap<String, SignalValue>>;

/// A single write to the store, delivered to observers
#[derive(Debug, Clone)]
pub struct SignalChange {
    pub id: String,
    pub value: SignalValue,
}

type Observer = Arc<dyn Fn(&SignalChange, &SignalSnapshot) + Send + Sync>;
type ObserverMap = RwLock<HashMap<u64, Observer>>;

/// Keyed map of live signal values
pub struct SignalStore {
    values: RwLock<SignalSnapshot>,
    observers: Arc<ObserverMap>,
    next_observer_id: AtomicU64,
    clock: SharedClock,
}

impl SignalStore {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            values: RwLock::new(Arc::new(HashMap::new())),
            observers: Arc::new(RwLock::new(HashMap::new())),
            next_observer_id: AtomicU64::new(1),
            clock,
        }
    }

    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    /// Overwrite a signal's value and timestamp (last write wins)
    pub fn update(&self, id: &str, value: Value) {
        let entry = SignalValue::new(value, self.clock.now_ms());
        self.write(id, entry);
    }

    /// Record a transport failure; the last known value is kept
    pub fn mark_error(&self, id: &str, message: impl Into<String>) {
        let message = message.into();
        warn!("Signal '{}' transport error: {}", id, message);
        let entry = match self.get(id) {
            Some(mut existing) => {
                existing.error = Some(message);
                existing
            }
            None => SignalValue {
                value: Value::Null,
                timestamp: self.clock.now_ms(),
                error: Some(message),
            },
        };
        self.write(id, entry);
    }

    fn write(&self, id: &str, entry: SignalValue) {
        let snapshot = {
            let Ok(mut values) = self.values.write() else {
                warn!("Signal store lock poisoned, dropping update for '{}'", id);
                return;
            };
            Arc::make_mut(&mut values).insert(id.to_string(), entry.clone());
            Arc::clone(&values)
        };

        let change = SignalChange {
            id: id.to_string(),
            value: entry,
        };
        self.notify(&change, &snapshot);
    }

    fn notify(&self, change: &SignalChange, snapshot: &SignalSnapshot) {
        // Clone the handles so observers may subscribe or unsubscribe re-entrantly
        let observers: Vec<Observer> = match self.observers.read() {
            Ok(map) => map.values().cloned().collect(),
            Err(_) => return,
        };
        for observer in observers {
            observer(change, snapshot);
        }
    }

    pub fn get(&self, id: &str) -> Option<SignalValue> {
        self.values.read().ok()?.get(id).cloned()
    }

    /// Cheap snapshot of every value
    pub fn snapshot(&self) -> SignalSnapshot {
        match self.values.read() {
            Ok(values) => Arc::clone(&values),
            Err(_) => Arc::new(HashMap::new()),
        }
    }

    /// Register an observer called after every write.
    ///
    /// The observer stays attached until the returned [`Subscription`] is dropped.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&SignalChange, &SignalSnapshot) + Send + Sync + 'static,
    {
        let id = self.next_observer_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut map) = self.observers.write() {
            map.insert(id, Arc::new(observer));
        }
        debug!("Signal store observer {} attached", id);
        Subscription {
            id,
            observers: Arc::downgrade(&self.observers),
        }
    }

    pub fn observer_count(&self) -> usize {
        self.observers.read().map(|m| m.len()).unwrap_or(0)
    }
}

/// Handle that detaches its observer when dropped
#[must_use = "dropping a Subscription detaches the observer immediately"]
pub struct Subscription {
    id: u64,
    observers: Weak<ObserverMap>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(observers) = self.observers.upgrade() {
            if let Ok(mut map) = observers.write() {
                map.remove(&self.id);
                debug!("Signal store observer {} detached", self.id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::sync::Mutex;

    fn store() -> (Arc<ManualClock>, SignalStore) {
        let clock = Arc::new(ManualClock::new(1_000));
        let store = SignalStore::new(clock.clone());
        (clock, store)
    }

    #[test]
    fn test_update_is_last_write_wins() {
        let (clock, store) = store();
        store.update("temp", Value::from(20.0));
        clock.set(2_000);
        store.update("temp", Value::from(21.5));

        let value = store.get("temp").unwrap();
        assert_eq!(value.value, Value::from(21.5));
        assert_eq!(value.timestamp, 2_000);
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_writes() {
        let (_, store) = store();
        store.update("a", Value::from(1));
        let before = store.snapshot();
        store.update("a", Value::from(2));
        assert_eq!(before.get("a").unwrap().value, Value::from(1));
        assert_eq!(store.snapshot().get("a").unwrap().value, Value::from(2));
    }

    #[test]
    fn test_mark_error_keeps_last_value() {
        let (clock, store) = store();
        store.update("mrr", Value::from(1200));
        clock.set(9_000);
        store.mark_error("mrr", "connection refused");

        let value = store.get("mrr").unwrap();
        assert_eq!(value.value, Value::from(1200));
        assert_eq!(value.timestamp, 1_000);
        assert_eq!(value.error.as_deref(), Some("connection refused"));

        store.update("mrr", Value::from(1300));
        assert!(store.get("mrr").unwrap().error.is_none());
    }

    #[test]
    fn test_subscription_drop_detaches() {
        let (_, store) = store();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let subscription = store.subscribe(move |change, snapshot| {
            assert!(snapshot.contains_key(&change.id));
            sink.lock().unwrap().push(change.id.clone());
        });

        store.update("a", Value::from(1));
        assert_eq!(store.observer_count(), 1);
        drop(subscription);
        store.update("b", Value::from(2));

        assert_eq!(*seen.lock().unwrap(), vec!["a".to_string()]);
        assert_eq!(store.observer_count(), 0);
    }
}
