//! Core domain entities.
//!
//! - [`Mapping`] - A long URL and its short token
//! - [`Stats`] - Access counters owned 1:1 by a mapping
//!
//! `NewMapping` is the creation input; the store assigns ids.

pub mod mapping;
pub mod stats;

pub use mapping::{EXPIRATION_WINDOW, Mapping, NewMapping};
pub use stats::Stats;
