#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;
use tinylink::domain::clock::{ManualClock, offset_from_minutes};
use tinylink::infrastructure::memory::MemoryStore;
use tinylink::state::AppState;

pub const BASE_URL: &str = "http://localhost:3000/";

/// 2024-06-01 08:00:00 UTC, 13:30 at +05:30.
pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
}

pub fn manual_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        start_time(),
        offset_from_minutes(330).unwrap(),
    ))
}

pub struct TestContext {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub clock: Arc<ManualClock>,
}

/// State over a fresh in-memory store and a manual clock.
pub fn create_test_context() -> TestContext {
    let store = Arc::new(MemoryStore::new());
    let clock = manual_clock();
    let state = AppState::new(store.clone(), store.clone(), clock.clone(), BASE_URL);

    TestContext {
        state,
        store,
        clock,
    }
}

pub fn create_test_state() -> AppState {
    create_test_context().state
}

/// Shortens `count` distinct URLs, returning their tokens in creation order.
pub async fn seed_links(state: &AppState, count: usize) -> Vec<String> {
    let mut tokens = Vec::with_capacity(count);
    for i in 0..count {
        let shortened = state
            .link_service
            .shorten(&format!("https://example.com/page/{i}"))
            .await
            .unwrap();
        tokens.push(shortened.token().to_string());
    }
    tokens
}
