//! Payment API Handlers

use axum::{
    extract::{Extension, Path, State},
    Json,
};

use crate::api::{chit_funds, members};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::payment;
use crate::utils::validation::validate_optional_date;
use crate::utils::{AppError, AppResult};
use shared::models::{Payment, PaymentCreate, PaymentUpdate};

/// GET /api/payments - all payments recorded by the current manager
pub async fn list(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<Payment>>> {
    let rows = payment::list_by_manager(&state.pool, &user.id).await?;
    Ok(Json(rows))
}

/// GET /api/payments/by-chit/:chit_id - a fund's payment ledger
pub async fn list_by_chit(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(chit_id): Path<i64>,
) -> AppResult<Json<Vec<Payment>>> {
    chit_funds::owned_fund(&state, &user, chit_id).await?;
    let rows = payment::list_by_chit(&state.pool, chit_id).await?;
    Ok(Json(rows))
}

/// GET /api/payments/by-member/:member_id - a member's payment history
pub async fn list_by_member(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(member_id): Path<i64>,
) -> AppResult<Json<Vec<Payment>>> {
    members::owned_member(&state, &user, member_id).await?;
    let rows = payment::list_by_member(&state.pool, member_id).await?;
    Ok(Json(rows))
}

/// POST /api/payments - record a contribution
pub async fn record(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<PaymentCreate>,
) -> AppResult<Json<Payment>> {
    validate_optional_date(&payload.payment_date, "payment_date")?;
    chit_funds::owned_fund(&state, &user, payload.chit_id).await?;

    let payment = payment::record(&state.pool, payload).await?;
    tracing::info!(
        payment_id = payment.id,
        chit_id = payment.chit_id,
        member_id = payment.member_id,
        month = payment.month,
        amount = payment.amount,
        "Payment recorded"
    );
    Ok(Json(payment))
}

/// PUT /api/payments/:id - edit a payment, reconciling totals
pub async fn update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<PaymentUpdate>,
) -> AppResult<Json<Payment>> {
    validate_optional_date(&payload.payment_date, "payment_date")?;
    owned_payment(&state, &user, id).await?;

    let payment = payment::update(&state.pool, id, payload).await?;
    tracing::info!(payment_id = id, amount = payment.amount, "Payment updated");
    Ok(Json(payment))
}

/// DELETE /api/payments/:id - delete a payment, reconciling totals
pub async fn delete(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    owned_payment(&state, &user, id).await?;
    payment::delete(&state.pool, id).await?;
    tracing::info!(payment_id = id, "Payment deleted");
    Ok(Json(true))
}

async fn owned_payment(state: &ServerState, user: &CurrentUser, id: i64) -> AppResult<Payment> {
    let payment = payment::find_by_id(&state.pool, id)
        .await?
        .filter(|p| p.manager_id == user.id)
        .ok_or_else(|| AppError::not_found(format!("Payment {id}")))?;
    Ok(payment)
}
