use meshview_core::GlobalFilter;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

pub type SubscriptionId = u64;

type Subscriber = Arc<dyn Fn(&GlobalFilter) + Send + Sync>;

/// Process-wide holder of the current [`GlobalFilter`]. Replacements are
/// whole-record with last-writer-wins semantics; every registered subscriber
/// is notified synchronously before `replace` returns.
///
/// Writers are serialized through a dedicated write gate, so two concurrent
/// `replace` calls can never interleave their write and notification phases.
/// Callbacks run outside the registry lock: a subscriber may call `get`,
/// `subscribe`, or `unsubscribe` while being notified, but must not call
/// `replace` from within its callback. A subscriber added during a
/// notification pass is first notified on the next replacement; one removed
/// during the pass may still receive the in-flight notification.
///
/// The store never touches the location collaborator: a writer that makes
/// query-string overrides stale is responsible for stripping them (see the
/// polling view controller).
#[derive(Clone)]
pub struct FilterStore {
    filter: Arc<Mutex<GlobalFilter>>,
    registry: Arc<Mutex<SubscriberRegistry>>,
    write_gate: Arc<Mutex<()>>,
}

#[derive(Default)]
struct SubscriberRegistry {
    entries: Vec<(SubscriptionId, Subscriber)>,
    next_id: SubscriptionId,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl FilterStore {
    pub fn new(initial: GlobalFilter) -> Self {
        Self {
            filter: Arc::new(Mutex::new(initial)),
            registry: Arc::new(Mutex::new(SubscriberRegistry::default())),
            write_gate: Arc::new(Mutex::new(())),
        }
    }

    pub fn get(&self) -> GlobalFilter {
        lock(&self.filter).clone()
    }

    pub fn replace(&self, next: GlobalFilter) {
        let _writer = lock(&self.write_gate);
        {
            let mut current = lock(&self.filter);
            *current = next.clone();
        }
        debug!(
            event = "filter_replaced",
            runtime = %next.runtime,
            namespace = %next.namespace,
            end_time = %next.end_time,
            refresh_interval_ms = next.refresh_interval_ms,
        );
        let subscribers: Vec<Subscriber> = lock(&self.registry)
            .entries
            .iter()
            .map(|(_, subscriber)| Arc::clone(subscriber))
            .collect();
        for subscriber in subscribers {
            subscriber(&next);
        }
    }

    pub fn subscribe(
        &self,
        callback: impl Fn(&GlobalFilter) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let mut registry = lock(&self.registry);
        let id = registry.next_id;
        registry.next_id += 1;
        registry.entries.push((id, Arc::new(callback)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut registry = lock(&self.registry);
        let before = registry.entries.len();
        registry.entries.retain(|(entry_id, _)| *entry_id != id);
        registry.entries.len() != before
    }
}

impl Default for FilterStore {
    fn default() -> Self {
        Self::new(GlobalFilter::default())
    }
}
