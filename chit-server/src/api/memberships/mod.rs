//! Membership API module

mod handler;

use axum::{
    routing::{get, post},
    Router,
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/memberships", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::add_member))
        .route("/join", post(handler::join_by_code))
        .route("/{id}", axum::routing::delete(handler::remove))
        .route("/by-chit/{chit_id}", get(handler::list_by_chit))
        .route("/by-member/{member_id}", get(handler::list_by_member))
}
