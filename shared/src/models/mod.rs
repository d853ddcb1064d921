//! Data models
//!
//! Shared between chit-server and frontend (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY); manager and identity
//! principals are the TEXT ids issued by the identity service.

pub mod auction;
pub mod chit_fund;
pub mod member;
pub mod membership;
pub mod payment;

// Re-exports
pub use auction::*;
pub use chit_fund::*;
pub use member::*;
pub use membership::*;
pub use payment::*;
