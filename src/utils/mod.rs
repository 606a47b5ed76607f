//! Helpers shared by the engine and the HTTP layer.
//!
//! - [`token_generator`] - Deterministic short token derivation
//! - [`url_validator`] - Long URL syntax checks

pub mod token_generator;
pub mod url_validator;
