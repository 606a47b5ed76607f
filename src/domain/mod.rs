//! Domain layer containing business entities and storage contracts.
//!
//! - [`entities`] - Core data structures
//! - [`repositories`] - Storage trait definitions
//! - [`clock`] - Time source abstraction
//!
//! The domain layer has no dependency on infrastructure or presentation
//! layers; business rules live in [`crate::application::services`].

pub mod clock;
pub mod entities;
pub mod repositories;
