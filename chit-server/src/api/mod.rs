//! API route modules
//!
//! # Structure
//!
//! - [`health`] - health check (public)
//! - [`chit_funds`] - fund lifecycle
//! - [`members`] - member registry
//! - [`memberships`] - fund roster management
//! - [`payments`] - contribution ledger
//! - [`auctions`] - auction history
//! - [`statistics`] - manager dashboard

pub mod auctions;
pub mod chit_funds;
pub mod health;
pub mod members;
pub mod memberships;
pub mod payments;
pub mod statistics;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};
