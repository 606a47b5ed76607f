//! Application layer services implementing business logic.
//!
//! Services consume repository traits and the clock, and give the HTTP
//! handlers and the admin CLI a small API.
//!
//! - [`services::link_service::LinkService`] - Shortening, renewal and resolution
//! - [`services::stats_service::StatsService`] - Paginated access statistics

pub mod services;
