use crate::filter::GlobalFilter;
use crate::timewindow::{resolve, TimeParseError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error(transparent)]
    Time(#[from] TimeParseError),
    #[error("window start '{start}' resolves after end '{end}'")]
    InvertedWindow { start: String, end: String },
}

/// The one wire shape this crate owns: the query object handed to the HTTP
/// collaborator. Field names must stay stable for routing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MetricsQuery {
    pub query_start_time: i64,
    pub query_end_time: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_cell: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_component: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_intra_cell: Option<bool>,
}

impl MetricsQuery {
    /// Resolve both window endpoints against a single `now` sample and
    /// convert them to epoch milliseconds. Parse failures propagate so a
    /// broken filter never queries an undefined window.
    pub fn from_filter(filter: &GlobalFilter, now: DateTime<Utc>) -> Result<Self, FilterError> {
        let start = resolve(&filter.start_time, now)?;
        let end = resolve(&filter.end_time, now)?;
        if start > end {
            return Err(FilterError::InvertedWindow {
                start: filter.start_time.clone(),
                end: filter.end_time.clone(),
            });
        }
        Ok(Self {
            query_start_time: start.timestamp_millis(),
            query_end_time: end.timestamp_millis(),
            destination_cell: None,
            destination_component: None,
            include_intra_cell: None,
        })
    }

    pub fn for_component(self, cell: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            destination_cell: Some(cell.into()),
            destination_component: Some(component.into()),
            ..self
        }
    }

    pub fn with_intra_cell(self, include: bool) -> Self {
        Self {
            include_intra_cell: Some(include),
            ..self
        }
    }
}
