//! Infrastructure layer for storage backends.
//!
//! Implements the repository traits defined by the domain layer.
//!
//! # Modules
//!
//! - [`memory`] - In-process store backing both repositories
//! - [`persistence`] - PostgreSQL repository implementations

pub mod memory;
pub mod persistence;
