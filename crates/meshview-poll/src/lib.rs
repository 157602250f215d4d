pub mod component_details;
pub mod controller;
pub mod scheduler;
pub mod store;

pub use component_details::ComponentDetailView;
pub use controller::{
    FetchError, LocationEditor, MetricsFetcher, Notifier, NotifyLevel, PollingView,
    PollingViewController,
};
pub use scheduler::{RefreshScheduler, SchedulerState};
pub use store::{FilterStore, SubscriptionId};
