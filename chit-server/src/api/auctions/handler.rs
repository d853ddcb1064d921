//! Auction API Handlers

use axum::{
    extract::{Extension, Path, State},
    Json,
};

use crate::api::chit_funds;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::auction;
use crate::ledger::accounting::{self, AuctionReduction};
use crate::utils::validation::validate_optional_date;
use crate::utils::AppResult;
use shared::models::{Auction, AuctionCreate};

/// GET /api/auctions - all auctions under the current manager
pub async fn list(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<Auction>>> {
    let rows = auction::list_by_manager(&state.pool, &user.id).await?;
    Ok(Json(rows))
}

/// GET /api/auctions/by-chit/:chit_id - a fund's auction history
pub async fn list_by_chit(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(chit_id): Path<i64>,
) -> AppResult<Json<Vec<Auction>>> {
    chit_funds::owned_fund(&state, &user, chit_id).await?;
    let rows = auction::list_by_chit(&state.pool, chit_id).await?;
    Ok(Json(rows))
}

/// GET /api/auctions/preview/:chit_id/:month - discount for a month
///
/// Lets the manager quote the post-auction rate before recording.
pub async fn preview(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path((chit_id, month)): Path<(i64, i64)>,
) -> AppResult<Json<AuctionReduction>> {
    let fund = chit_funds::owned_fund(&state, &user, chit_id).await?;
    let reduction = accounting::auction_reduction(fund.monthly_amount, month);
    Ok(Json(reduction))
}

/// POST /api/auctions - record the month's winning bid
pub async fn record(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<AuctionCreate>,
) -> AppResult<Json<Auction>> {
    validate_optional_date(&payload.auction_date, "auction_date")?;
    chit_funds::owned_fund(&state, &user, payload.chit_id).await?;

    let auction = auction::record(&state.pool, payload).await?;
    tracing::info!(
        auction_id = auction.id,
        chit_id = auction.chit_id,
        month = auction.month,
        amount_taken = auction.amount_taken,
        "Auction recorded"
    );
    Ok(Json(auction))
}
