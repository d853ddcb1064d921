//! Chit Fund API Handlers

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde::Serialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{auction, chit_fund, membership, payment};
use crate::ledger::accounting::{self, FundProgress};
use crate::utils::validation::{
    validate_optional_date, validate_optional_text, validate_required_text, MAX_NAME_LEN,
    MAX_SHORT_TEXT_LEN,
};
use crate::utils::{AppError, AppResult};
use shared::models::{Auction, ChitFund, ChitFundCreate, ChitFundUpdate, Membership, Payment};

/// Fund detail response (fund + members + ledger rows + derived progress)
#[derive(Serialize)]
pub struct ChitFundDetail {
    #[serde(flatten)]
    pub fund: ChitFund,
    pub memberships: Vec<Membership>,
    pub payments: Vec<Payment>,
    pub auctions: Vec<Auction>,
    pub progress: FundProgress,
    pub total_collected: f64,
    /// Next member due to receive the pot for the current month
    pub next_receiver: Option<i64>,
}

/// GET /api/chit-funds - all funds run by the current manager
pub async fn list(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<ChitFund>>> {
    let funds = chit_fund::find_all_by_manager(&state.pool, &user.id).await?;
    Ok(Json(funds))
}

/// GET /api/chit-funds/:id - fund with members, ledger and derivations
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<ChitFundDetail>> {
    let fund = owned_fund(&state, &user, id).await?;

    let memberships = membership::find_by_chit(&state.pool, id).await?;
    let payments = payment::list_by_chit(&state.pool, id).await?;
    let auctions = auction::list_by_chit(&state.pool, id).await?;

    let progress = accounting::fund_progress(
        fund.start_date.as_deref(),
        fund.duration_months,
        chrono::Utc::now().date_naive(),
    );
    let total_collected = accounting::total_revenue(&payments);

    let paid: std::collections::HashSet<i64> = payments
        .iter()
        .filter(|p| p.month == fund.current_month)
        .map(|p| p.member_id)
        .collect();
    let receivers: std::collections::HashSet<i64> =
        auctions.iter().map(|a| a.member_id).collect();
    let next_receiver = accounting::next_receiver(&memberships, &paid, &receivers);

    Ok(Json(ChitFundDetail {
        fund,
        memberships,
        payments,
        auctions,
        progress,
        total_collected,
        next_receiver,
    }))
}

/// POST /api/chit-funds - create a fund
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<ChitFundCreate>,
) -> AppResult<Json<ChitFund>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.code, "code", MAX_SHORT_TEXT_LEN)?;
    validate_optional_date(&payload.start_date, "start_date")?;

    let fund = chit_fund::create(&state.pool, &user.id, payload).await?;
    tracing::info!(fund_id = fund.id, code = %fund.code, "Chit fund created");
    Ok(Json(fund))
}

/// PUT /api/chit-funds/:id - update a fund
pub async fn update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<ChitFundUpdate>,
) -> AppResult<Json<ChitFund>> {
    validate_optional_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_date(&payload.start_date, "start_date")?;
    owned_fund(&state, &user, id).await?;

    let fund = chit_fund::update(&state.pool, id, payload).await?;
    Ok(Json(fund))
}

/// POST /api/chit-funds/:id/advance-month - manual month advance
pub async fn advance_month(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<ChitFund>> {
    owned_fund(&state, &user, id).await?;
    let fund = chit_fund::advance_month(&state.pool, id).await?;
    Ok(Json(fund))
}

/// DELETE /api/chit-funds/:id - delete a fund and its ledger
pub async fn delete(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    owned_fund(&state, &user, id).await?;
    let deleted = chit_fund::delete(&state.pool, id).await?;
    if deleted {
        tracing::info!(fund_id = id, "Chit fund deleted");
    }
    Ok(Json(deleted))
}

/// Fetch a fund and check it belongs to the current manager.
///
/// Another manager's fund reports NotFound rather than Forbidden, so
/// fund IDs cannot be probed across accounts.
pub(crate) async fn owned_fund(
    state: &ServerState,
    user: &CurrentUser,
    id: i64,
) -> AppResult<ChitFund> {
    let fund = chit_fund::find_by_id(&state.pool, id)
        .await?
        .filter(|f| f.manager_id == user.id)
        .ok_or_else(|| AppError::not_found(format!("Chit fund {id}")))?;
    Ok(fund)
}
