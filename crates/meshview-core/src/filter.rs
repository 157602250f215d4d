use crate::timewindow::is_live_window;
use serde::{Deserialize, Serialize};

/// Sentinel refresh interval meaning auto-refresh is switched off.
pub const REFRESH_OFF: i64 = -1;

/// Refresh cadences offered by the toolbar, in milliseconds.
pub const REFRESH_PRESETS_MS: [i64; 7] = [
    REFRESH_OFF,
    5_000,
    10_000,
    15_000,
    30_000,
    60_000,
    5 * 60_000,
];

/// The shared runtime/namespace/time-window selection applied across all
/// dashboard views. One instance per session; partial updates are expressed
/// by cloning the previous value with overrides.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GlobalFilter {
    pub runtime: String,
    pub namespace: String,
    pub start_time: String,
    pub end_time: String,
    /// Human label for a preset range ("Last 10 minutes"); empty for custom.
    pub date_range_nickname: String,
    #[serde(rename = "refreshInterval")]
    pub refresh_interval_ms: i64,
}

impl Default for GlobalFilter {
    fn default() -> Self {
        Self {
            runtime: String::new(),
            namespace: String::new(),
            start_time: "now - 10m".to_string(),
            end_time: "now".to_string(),
            date_range_nickname: "Last 10 minutes".to_string(),
            refresh_interval_ms: 30_000,
        }
    }
}

impl GlobalFilter {
    /// Derived on every evaluation, never stored: a view auto-refreshes iff
    /// its window end is anchored to "now".
    pub fn auto_refresh_eligible(&self) -> bool {
        is_live_window(&self.end_time)
    }
}

/// Filter fields whose query-string overrides a writer must strip after a
/// mutation makes them stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Runtime,
    Namespace,
    StartTime,
    EndTime,
}

impl FilterField {
    pub fn override_param(&self) -> &'static str {
        match self {
            FilterField::Runtime => "globalFilterRuntime",
            FilterField::Namespace => "globalFilterNamespace",
            FilterField::StartTime => "globalFilterStartTime",
            FilterField::EndTime => "globalFilterEndTime",
        }
    }
}
