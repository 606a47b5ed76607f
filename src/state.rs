//! Shared state injected into every handler.

use std::sync::Arc;

use crate::application::services::{LinkService, StatsService};
use crate::domain::clock::Clock;
use crate::domain::repositories::{MappingRepository, StatsRepository};

#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    pub stats_service: Arc<StatsService>,
    /// Prefix for rendered short URLs, always ending with `/`.
    pub base_url: String,
}

impl AppState {
    /// Wires both services over the given repositories and clock.
    pub fn new(
        mappings: Arc<dyn MappingRepository>,
        stats: Arc<dyn StatsRepository>,
        clock: Arc<dyn Clock>,
        base_url: impl Into<String>,
    ) -> Self {
        let link_service = Arc::new(LinkService::new(mappings, stats.clone(), clock.clone()));
        let stats_service = Arc::new(StatsService::new(stats, clock));

        Self {
            link_service,
            stats_service,
            base_url: normalize_base_url(base_url.into()),
        }
    }

    pub fn short_url(&self, token: &str) -> String {
        format!("{}{}", self.base_url, token)
    }
}

fn normalize_base_url(mut base_url: String) -> String {
    if !base_url.ends_with('/') {
        base_url.push('/');
    }
    base_url
}
