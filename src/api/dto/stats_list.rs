//! DTOs for the paginated statistics endpoint.

use serde::Serialize;

use crate::application::services::{StatsEntry, StatsPage, StatsReport};

pub const NO_DATA_MESSAGE: &str = "No data available.";

/// Either a populated page or the empty-store message.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum StatsListResponse {
    Empty {
        message: String,
    },
    Page {
        total_records: i64,
        total_pages: i64,
        current_page: i64,
        records: Vec<StatsRecord>,
    },
}

/// Statistics for a single mapping.
#[derive(Debug, Serialize)]
pub struct StatsRecord {
    pub long_url: String,
    pub short_token: String,
    pub short_url: String,
    pub access_count: i64,
    pub last_accessed: Option<String>,
}

impl StatsListResponse {
    /// Renders a report, building short URLs with `short_url`.
    pub fn from_report(report: StatsReport, short_url: impl Fn(&str) -> String) -> Self {
        match report {
            StatsReport::Empty => Self::Empty {
                message: NO_DATA_MESSAGE.to_string(),
            },
            StatsReport::Page(StatsPage {
                total_records,
                total_pages,
                current_page,
                records,
            }) => Self::Page {
                total_records,
                total_pages,
                current_page,
                records: records
                    .into_iter()
                    .map(|entry| StatsRecord::from_entry(entry, &short_url))
                    .collect(),
            },
        }
    }
}

impl StatsRecord {
    fn from_entry(entry: StatsEntry, short_url: impl Fn(&str) -> String) -> Self {
        Self {
            short_url: short_url(&entry.short_token),
            long_url: entry.long_url,
            short_token: entry.short_token,
            access_count: entry.access_count,
            last_accessed: entry.last_accessed,
        }
    }
}
