//! Authentication Module
//!
//! Verification of identity-service JWTs and the request middleware
//! that injects the current user.

pub mod jwt;
pub mod middleware;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::require_auth;
