pub mod filter;
pub mod health;
pub mod permissions;
pub mod query;
pub mod timewindow;

pub use filter::{FilterField, GlobalFilter, REFRESH_OFF, REFRESH_PRESETS_MS};
pub use health::{aggregate, outcomes_from_rows, HealthAggregate, RequestOutcome};
pub use permissions::{
    allowed_namespaces, allowed_runtimes, can_read, PermissionGrant, ACTION_API_GET,
};
pub use query::{FilterError, MetricsQuery};
pub use timewindow::{is_live_window, resolve, TimeParseError};
