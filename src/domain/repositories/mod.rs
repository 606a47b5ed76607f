//! Repository trait definitions for the domain layer.
//!
//! Traits define the storage contract; implementations live in
//! `crate::infrastructure`. Mock implementations are generated via `mockall`
//! for unit tests.
//!
//! - [`MappingRepository`] - Mapping creation, lookup and renewal
//! - [`StatsRepository`] - Access counters and the joined statistics view

pub mod mapping_repository;
pub mod stats_repository;

pub use mapping_repository::{LONG_URL_UNIQUE, MappingRepository, SHORT_TOKEN_UNIQUE};
pub use stats_repository::{LinkStats, StatsFilter, StatsRepository};

#[cfg(test)]
pub use mapping_repository::MockMappingRepository;
#[cfg(test)]
pub use stats_repository::MockStatsRepository;
