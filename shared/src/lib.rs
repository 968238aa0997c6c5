//! Shared types for the ordering platform
//!
//! Error types, response structures and the order/catalog models used by
//! the server and its clients.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
