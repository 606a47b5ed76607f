//! PostgreSQL repository implementations.
//!
//! Concrete implementations of the domain repository traits on top of SQLx.
//! The schema lives in `migrations/`.
//!
//! - [`PgMappingRepository`] - Mapping storage, lookup and renewal
//! - [`PgStatsRepository`] - Access counters and the joined statistics view

pub mod pg_mapping_repository;
pub mod pg_stats_repository;

pub use pg_mapping_repository::PgMappingRepository;
pub use pg_stats_repository::PgStatsRepository;
