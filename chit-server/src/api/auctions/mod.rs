//! Auction API module

mod handler;

use axum::{routing::get, Router};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/auctions", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::record))
        .route("/by-chit/{chit_id}", get(handler::list_by_chit))
        .route("/preview/{chit_id}/{month}", get(handler::preview))
}
