//! Chit Server - chit fund management backend
//!
//! Manages rotating savings groups (chit funds): the fund lifecycle,
//! member registry, fund rosters, the contribution ledger and auction
//! history, plus the derived dashboard numbers.
//!
//! # Module structure
//!
//! ```text
//! chit-server/src/
//! ├── core/     # configuration, state, server
//! ├── auth/     # identity-service JWT verification
//! ├── api/      # HTTP routes and handlers
//! ├── routes/   # router assembly and middleware stack
//! ├── db/       # SQLite pool, migrations, repositories
//! ├── ledger/   # money arithmetic and derivation rules
//! └── utils/    # errors, logging, validation
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod ledger;
pub mod routes;
pub mod utils;

// Re-export common types
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// Load .env and initialize logging from the environment
pub fn setup_environment() {
    dotenv::dotenv().ok();
    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());
}
