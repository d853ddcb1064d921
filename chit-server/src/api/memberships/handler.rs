//! Membership API Handlers

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde::Deserialize;

use crate::api::{chit_funds, members};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{member, membership};
use crate::utils::validation::{validate_required_text, MAX_SHORT_TEXT_LEN};
use crate::utils::{AppError, AppResult};
use shared::models::Membership;

/// Manager add payload
#[derive(Deserialize)]
pub struct AddMemberPayload {
    pub chit_id: i64,
    pub member_id: i64,
}

/// Member join payload
#[derive(Deserialize)]
pub struct JoinPayload {
    pub code: String,
}

/// POST /api/memberships - manager adds a member to a fund
pub async fn add_member(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<AddMemberPayload>,
) -> AppResult<Json<Membership>> {
    chit_funds::owned_fund(&state, &user, payload.chit_id).await?;
    members::owned_member(&state, &user, payload.member_id).await?;

    let ms = membership::add_member(&state.pool, payload.chit_id, payload.member_id).await?;
    tracing::info!(chit_id = ms.chit_id, member_id = ms.member_id, "Membership added");
    Ok(Json(ms))
}

/// POST /api/memberships/join - member joins a fund by its code
///
/// The caller must be an identity principal linked to a member record.
pub async fn join_by_code(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<JoinPayload>,
) -> AppResult<Json<Membership>> {
    validate_required_text(&payload.code, "code", MAX_SHORT_TEXT_LEN)?;

    let me = member::find_by_user_id(&state.pool, &user.id)
        .await?
        .ok_or_else(|| AppError::not_found("No member record linked to this account"))?;

    let ms = membership::join_by_code(&state.pool, &payload.code, me.id).await?;
    tracing::info!(chit_id = ms.chit_id, member_id = ms.member_id, "Member joined by code");
    Ok(Json(ms))
}

/// DELETE /api/memberships/:id - remove a member from a fund
pub async fn remove(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let ms = membership::find_by_id(&state.pool, id)
        .await?
        .filter(|m| m.manager_id == user.id)
        .ok_or_else(|| AppError::not_found(format!("Membership {id}")))?;

    membership::remove(&state.pool, ms.id).await?;
    tracing::info!(chit_id = ms.chit_id, member_id = ms.member_id, "Membership removed");
    Ok(Json(true))
}

/// GET /api/memberships/by-chit/:chit_id - fund roster in join order
pub async fn list_by_chit(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(chit_id): Path<i64>,
) -> AppResult<Json<Vec<Membership>>> {
    chit_funds::owned_fund(&state, &user, chit_id).await?;
    let rows = membership::find_by_chit(&state.pool, chit_id).await?;
    Ok(Json(rows))
}

/// GET /api/memberships/by-member/:member_id - a member's funds
pub async fn list_by_member(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(member_id): Path<i64>,
) -> AppResult<Json<Vec<Membership>>> {
    members::owned_member(&state, &user, member_id).await?;
    let rows = membership::find_by_member(&state.pool, member_id).await?;
    Ok(Json(rows))
}
