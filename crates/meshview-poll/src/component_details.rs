use crate::controller::PollingView;
use chrono::Utc;
use meshview_core::{
    aggregate, outcomes_from_rows, FilterError, GlobalFilter, HealthAggregate, MetricsQuery,
};
use serde_json::Value;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// The component detail panel: fetches the per-component request metrics
/// for the shared window and folds them into a health score.
pub struct ComponentDetailView {
    cell: String,
    component: String,
    health: Mutex<HealthAggregate>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ComponentDetailView {
    pub fn new(cell: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            cell: cell.into(),
            component: component.into(),
            health: Mutex::new(HealthAggregate::NO_DATA),
        }
    }

    pub fn cell(&self) -> &str {
        &self.cell
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    pub fn health(&self) -> HealthAggregate {
        *lock(&self.health)
    }
}

impl PollingView for ComponentDetailView {
    fn busy_label(&self) -> &str {
        "Loading Component Info"
    }

    fn build_query(&self, filter: &GlobalFilter) -> Result<MetricsQuery, FilterError> {
        Ok(MetricsQuery::from_filter(filter, Utc::now())?
            .for_component(self.cell.clone(), self.component.clone())
            .with_intra_cell(true))
    }

    fn apply_rows(&self, rows: Vec<Value>) {
        let next = aggregate(outcomes_from_rows(&rows));
        debug!(
            event = "component_health_updated",
            cell = %self.cell,
            component = %self.component,
            health = next.health,
            has_data = next.has_data,
        );
        *lock(&self.health) = next;
    }
}
