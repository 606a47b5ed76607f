//! Data Transfer Objects for API requests and responses.

pub mod health;
pub mod pagination;
pub mod resolve;
pub mod shorten;
pub mod stats_list;
