//! Shared types for the chit-fund platform
//!
//! Data models and small utilities used by chit-server and
//! (via the API) by the frontend clients.

pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
