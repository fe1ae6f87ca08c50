//! Update manager for scheduling signal sources

use log::{debug, error, info, trace, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ramme_core::{BoxedSignalSource, SignalStore};

/// Tracks update timing for a source
struct SourceUpdateState {
    source: BoxedSignalSource,
    /// Clock time (ms) of the last poll, `None` until the first one
    last_update: Option<u64>,
    interval: Duration,
}

/// Drives every registered source at its own interval.
///
/// Time comes from the store's clock, so `tick_due` is fully deterministic
/// under a `ManualClock`; `run` only decides how often to check.
pub struct UpdateManager {
    store: Arc<SignalStore>,
    sources: Mutex<Vec<SourceUpdateState>>,
    running: AtomicBool,
    stop_requested: AtomicBool,
}

impl UpdateManager {
    pub fn new(store: Arc<SignalStore>) -> Self {
        Self {
            store,
            sources: Mutex::new(Vec::new()),
            running: AtomicBool::new(false),
            stop_requested: AtomicBool::new(false),
        }
    }

    /// Add a source polled at its default interval
    pub fn add_source(&self, source: BoxedSignalSource) {
        let interval = source.metadata().default_interval;
        self.add_source_with_interval(source, interval);
    }

    pub fn add_source_with_interval(&self, source: BoxedSignalSource, interval: Duration) {
        if !source.is_available() {
            warn!("Source '{}' is not available, skipping", source.metadata().id);
            return;
        }
        info!(
            "Scheduling source '{}' every {:?}",
            source.metadata().id,
            interval
        );
        if let Ok(mut sources) = self.sources.lock() {
            sources.push(SourceUpdateState {
                source,
                last_update: None,
                interval,
            });
        }
    }

    pub fn source_count(&self) -> usize {
        self.sources.lock().map(|s| s.len()).unwrap_or(0)
    }

    /// Poll every source whose interval has elapsed at `now_ms`; returns how many ran.
    ///
    /// A source that was never polled is due immediately. Sources are polled
    /// outside the lock, so a store observer may call back into `tick_due`;
    /// the nested call sees none of the sources currently being polled.
    pub fn tick_due(&self, now_ms: u64) -> usize {
        let mut taken = match self.sources.lock() {
            Ok(mut sources) => std::mem::take(&mut *sources),
            Err(_) => {
                error!("Update manager lock poisoned");
                return 0;
            }
        };

        let mut polled = 0;
        for state in taken.iter_mut() {
            let due = match state.last_update {
                None => true,
                Some(last) => now_ms.saturating_sub(last) >= state.interval.as_millis() as u64,
            };
            if !due {
                continue;
            }
            if let Err(e) = state.source.poll(&self.store) {
                error!("Error updating source {}: {:#}", state.source.metadata().id, e);
            }
            state.last_update = Some(now_ms);
            polled += 1;
        }

        match self.sources.lock() {
            Ok(mut sources) => {
                let added = std::mem::replace(&mut *sources, taken);
                sources.extend(added);
            }
            Err(_) => error!("Update manager lock poisoned, dropping {} sources", taken.len()),
        }
        polled
    }

    /// Run the update loop until [`stop`](Self::stop) is called.
    ///
    /// A stop requested before the loop starts makes it return immediately.
    pub async fn run(&self, base_interval: Duration) {
        if self.stop_requested.swap(false, Ordering::SeqCst) {
            debug!("Update loop stopped before it started");
            return;
        }
        self.running.store(true, Ordering::SeqCst);
        let mut interval = tokio::time::interval(base_interval);
        debug!("Update loop started ({:?} base interval)", base_interval);

        while !self.stop_requested.load(Ordering::SeqCst) {
            interval.tick().await;
            if self.stop_requested.load(Ordering::SeqCst) {
                break;
            }
            let start = std::time::Instant::now();
            let polled = self.tick_due(self.store.clock().now_ms());
            trace!("Update cycle polled {} sources in {:?}", polled, start.elapsed());
        }
        self.stop_requested.store(false, Ordering::SeqCst);
        self.running.store(false, Ordering::SeqCst);
        debug!("Update loop stopped");
    }

    pub fn stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use ramme_core::{ManualClock, SignalSource, SourceMetadata};
    use serde_json::json;

    struct Counter {
        metadata: SourceMetadata,
        count: u64,
        fail: bool,
    }

    impl Counter {
        fn new(id: &str, interval_ms: u64) -> Self {
            Self {
                metadata: SourceMetadata {
                    id: id.to_string(),
                    name: id.to_string(),
                    default_interval: Duration::from_millis(interval_ms),
                },
                count: 0,
                fail: false,
            }
        }
    }

    impl SignalSource for Counter {
        fn metadata(&self) -> &SourceMetadata {
            &self.metadata
        }

        fn poll(&mut self, store: &SignalStore) -> Result<()> {
            self.count += 1;
            store.update(&self.metadata.id, json!(self.count));
            if self.fail {
                return Err(anyhow!("boom"));
            }
            Ok(())
        }
    }

    #[test]
    fn test_tick_due_respects_intervals() {
        let clock = Arc::new(ManualClock::new(0));
        let store = Arc::new(SignalStore::new(clock.clone()));
        let manager = UpdateManager::new(store.clone());
        manager.add_source(Box::new(Counter::new("fast", 100)));
        manager.add_source(Box::new(Counter::new("slow", 1_000)));

        assert_eq!(manager.tick_due(0), 2);
        assert_eq!(manager.tick_due(50), 0);
        assert_eq!(manager.tick_due(100), 1);
        assert_eq!(manager.tick_due(1_000), 2);

        assert_eq!(store.get("fast").unwrap().value, json!(3));
        assert_eq!(store.get("slow").unwrap().value, json!(2));
    }

    #[test]
    fn test_failing_source_keeps_schedule() {
        let store = Arc::new(SignalStore::new(Arc::new(ManualClock::new(0))));
        let manager = UpdateManager::new(store.clone());
        let mut source = Counter::new("flaky", 10);
        source.fail = true;
        manager.add_source(Box::new(source));

        assert_eq!(manager.tick_due(0), 1);
        assert_eq!(manager.tick_due(10), 1);
        assert_eq!(store.get("flaky").unwrap().value, json!(2));
    }

    #[test]
    fn test_observer_can_tick_while_polling() {
        let store = Arc::new(SignalStore::new(Arc::new(ManualClock::new(0))));
        let manager = Arc::new(UpdateManager::new(store.clone()));
        manager.add_source(Box::new(Counter::new("outer", 1_000)));

        let nested = Arc::downgrade(&manager);
        let nested_polls = Arc::new(Mutex::new(Vec::new()));
        let seen = nested_polls.clone();
        let _subscription = store.subscribe(move |_, _| {
            if let Some(manager) = nested.upgrade() {
                seen.lock().unwrap().push(manager.tick_due(0));
            }
        });

        assert_eq!(manager.tick_due(0), 1);
        assert_eq!(*nested_polls.lock().unwrap(), vec![0]);
        assert_eq!(manager.source_count(), 1);
        assert_eq!(manager.tick_due(1_000), 1);
    }

    #[tokio::test]
    async fn test_stop_before_run_is_honoured() {
        let store = Arc::new(SignalStore::new(Arc::new(ManualClock::new(0))));
        let manager = UpdateManager::new(store.clone());
        manager.add_source(Box::new(Counter::new("never", 10)));

        manager.stop();
        tokio::time::timeout(Duration::from_secs(1), manager.run(Duration::from_millis(5)))
            .await
            .expect("run should return after an early stop");
        assert!(!manager.is_running());
        assert!(store.get("never").is_none());
    }

    #[tokio::test]
    async fn test_run_until_stopped() {
        let store = Arc::new(SignalStore::new(Arc::new(ManualClock::new(0))));
        let manager = Arc::new(UpdateManager::new(store.clone()));
        manager.add_source(Box::new(Counter::new("once", 60_000)));

        let runner = manager.clone();
        let handle = tokio::spawn(async move { runner.run(Duration::from_millis(5)).await });
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(manager.is_running());
        manager.stop();
        handle.await.unwrap();

        assert!(!manager.is_running());
        assert_eq!(store.get("once").unwrap().value, json!(1));
    }
}
