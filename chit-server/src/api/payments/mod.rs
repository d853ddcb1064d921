//! Payment API module

mod handler;

use axum::{routing::get, Router};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/payments", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::record))
        .route("/{id}", axum::routing::put(handler::update).delete(handler::delete))
        .route("/by-chit/{chit_id}", get(handler::list_by_chit))
        .route("/by-member/{member_id}", get(handler::list_by_member))
}
