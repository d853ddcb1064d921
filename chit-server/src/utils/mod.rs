//! Utility module - shared helpers and types
//!
//! - [`AppError`] / [`AppResponse`] - error type and response envelope
//! - [`AppResult`] - handler result alias
//! - Logging and validation helpers

pub mod error;
pub mod logger;
pub mod result;
pub mod validation;

pub use error::{ok, ok_with_message, AppError, AppResponse};
pub use result::AppResult;
