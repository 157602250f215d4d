use crate::scheduler::RefreshScheduler;
use crate::store::FilterStore;
use futures_util::future::BoxFuture;
use meshview_core::{
    allowed_namespaces, can_read, FilterError, FilterField, GlobalFilter, MetricsQuery,
    PermissionGrant,
};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("metrics fetch failed: {message}")]
pub struct FetchError {
    pub message: String,
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    Info,
    Warning,
    Error,
}

/// HTTP collaborator. Timeout and cancellation of the underlying call are
/// its concern; the controller only reacts to the resolved result.
pub trait MetricsFetcher: Send + Sync {
    fn fetch(&self, query: &MetricsQuery) -> BoxFuture<'static, Result<Vec<Value>, FetchError>>;
}

/// Toast/overlay collaborator. Only user-initiated refreshes may touch it.
pub trait Notifier: Send + Sync {
    fn show_busy(&self, label: &str);
    fn hide_busy(&self);
    fn notify(&self, message: &str, level: NotifyLevel);
}

/// Location collaborator used to strip stale query-string overrides after a
/// filter mutation makes them redundant.
pub trait LocationEditor: Send + Sync {
    fn strip_overrides(&self, fields: &[FilterField]);
}

/// The screen behind the controller: it decorates the query for its own
/// data dependency and consumes the fetched rows.
pub trait PollingView: Send + Sync {
    fn busy_label(&self) -> &str;
    fn build_query(&self, filter: &GlobalFilter) -> Result<MetricsQuery, FilterError>;
    fn apply_rows(&self, rows: Vec<Value>);
}

/// Drives one polling data view: reads and writes the shared filter store,
/// strips stale location overrides on behalf of the store, and owns the
/// refresh scheduler for its view.
///
/// Every filter mutation runs the same sequence: write the store, strip the
/// changed fields' overrides, stop the timer, refresh once as a user action,
/// then rearm against the new filter. Eligibility is recomputed from the
/// store on every rearm, never cached.
pub struct PollingViewController {
    inner: Arc<ControllerInner>,
    scheduler: RefreshScheduler,
}

struct ControllerInner {
    store: FilterStore,
    grants: Vec<PermissionGrant>,
    view: Arc<dyn PollingView>,
    fetcher: Arc<dyn MetricsFetcher>,
    notifier: Arc<dyn Notifier>,
    location: Arc<dyn LocationEditor>,
    attached: AtomicBool,
}

impl PollingViewController {
    pub fn new(
        store: FilterStore,
        grants: Vec<PermissionGrant>,
        view: Arc<dyn PollingView>,
        fetcher: Arc<dyn MetricsFetcher>,
        notifier: Arc<dyn Notifier>,
        location: Arc<dyn LocationEditor>,
    ) -> Self {
        Self {
            inner: Arc::new(ControllerInner {
                store,
                grants,
                view,
                fetcher,
                notifier,
                location,
                attached: AtomicBool::new(true),
            }),
            scheduler: RefreshScheduler::new(),
        }
    }

    pub fn store(&self) -> &FilterStore {
        &self.inner.store
    }

    pub fn is_polling(&self) -> bool {
        self.scheduler.is_scheduled()
    }

    /// One forced refresh, then arm the timer per the current filter.
    pub async fn on_attach(&mut self) {
        self.inner.attached.store(true, Ordering::SeqCst);
        self.inner.refresh(true).await;
        self.rearm();
    }

    /// Stops polling and discards any still-in-flight fetch results.
    pub fn on_detach(&mut self) {
        self.inner.attached.store(false, Ordering::SeqCst);
        self.scheduler.stop();
        info!(event = "view_detached");
    }

    /// Select a runtime. If the current namespace is not readable under the
    /// new runtime it is reset to the first allowed namespace (or empty)
    /// within the same mutation, so an invalid pair is never observable.
    pub async fn set_runtime(&mut self, runtime: impl Into<String>) {
        let runtime = runtime.into();
        let mut next = self.inner.store.get();
        next.runtime = runtime.clone();

        let mut changed = vec![FilterField::Runtime];
        let namespaces = allowed_namespaces(&self.inner.grants, &runtime);
        if !namespaces.contains(&next.namespace) {
            let fallback = namespaces.iter().next().cloned().unwrap_or_default();
            debug!(
                event = "namespace_reset",
                runtime = %runtime,
                from = %next.namespace,
                to = %fallback,
            );
            next.namespace = fallback;
            changed.push(FilterField::Namespace);
        }
        self.apply_filter_change(next, changed).await;
    }

    /// Select a namespace. Selections outside the permitted set for the
    /// current runtime are dropped rather than written to the store.
    pub async fn set_namespace(&mut self, namespace: impl Into<String>) {
        let namespace = namespace.into();
        let mut next = self.inner.store.get();
        if !can_read(&self.inner.grants, &next.runtime, &namespace) {
            warn!(
                event = "namespace_not_permitted",
                runtime = %next.runtime,
                namespace = %namespace,
            );
            return;
        }
        next.namespace = namespace;
        self.apply_filter_change(next, vec![FilterField::Namespace])
            .await;
    }

    pub async fn set_time_period(
        &mut self,
        start_time: impl Into<String>,
        end_time: impl Into<String>,
        date_range_nickname: impl Into<String>,
    ) {
        let mut next = self.inner.store.get();
        next.start_time = start_time.into();
        next.end_time = end_time.into();
        next.date_range_nickname = date_range_nickname.into();
        self.apply_filter_change(next, vec![FilterField::StartTime, FilterField::EndTime])
            .await;
    }

    /// Change the polling cadence. Rearms the timer without an immediate
    /// refresh; the data on screen is still valid for the current window.
    pub fn set_refresh_interval(&mut self, interval_ms: i64) {
        let mut next = self.inner.store.get();
        next.refresh_interval_ms = interval_ms;
        self.inner.store.replace(next);
        self.scheduler.stop();
        self.rearm();
    }

    /// Manual "refresh now": same stop/refresh/rearm cycle as a mutation,
    /// without touching the filter.
    pub async fn refresh_now(&mut self) {
        self.scheduler.stop();
        self.inner.refresh(true).await;
        self.rearm();
    }

    async fn apply_filter_change(&mut self, next: GlobalFilter, changed: Vec<FilterField>) {
        self.inner.store.replace(next);
        self.inner.location.strip_overrides(&changed);
        self.scheduler.stop();
        self.inner.refresh(true).await;
        self.rearm();
    }

    fn rearm(&mut self) {
        let filter = self.inner.store.get();
        let inner = Arc::clone(&self.inner);
        self.scheduler.start(
            filter.refresh_interval_ms,
            filter.auto_refresh_eligible(),
            move || {
                let inner = Arc::clone(&inner);
                tokio::spawn(async move {
                    inner.refresh(false).await;
                });
            },
        );
    }
}

impl ControllerInner {
    async fn refresh(&self, user_action: bool) {
        let filter = self.store.get();
        let query = match self.view.build_query(&filter) {
            Ok(query) => query,
            Err(error) => {
                warn!(event = "window_unresolved", error = %error);
                if user_action {
                    self.notifier
                        .notify(&format!("Cannot resolve time window: {error}"), NotifyLevel::Error);
                }
                return;
            }
        };

        if user_action {
            self.notifier.show_busy(self.view.busy_label());
        }
        debug!(
            event = "refresh_started",
            user_action,
            query_start_time = query.query_start_time,
            query_end_time = query.query_end_time,
        );

        match self.fetcher.fetch(&query).await {
            Ok(rows) => {
                // Results are applied in completion order; a fetch that
                // outlives the view is discarded here.
                if self.attached.load(Ordering::SeqCst) {
                    self.view.apply_rows(rows);
                } else {
                    debug!(event = "late_result_discarded");
                }
                if user_action {
                    self.notifier.hide_busy();
                }
            }
            Err(error) => {
                if user_action {
                    self.notifier.hide_busy();
                    self.notifier
                        .notify("Failed to load component information", NotifyLevel::Error);
                } else {
                    warn!(event = "background_refresh_failed", error = %error);
                }
            }
        }
    }
}
