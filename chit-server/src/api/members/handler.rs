//! Member API Handlers

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde::Serialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{member, membership, payment};
use crate::utils::validation::{
    validate_optional_text, validate_required_text, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN,
};
use crate::utils::{AppError, AppResult};
use shared::models::{Member, MemberCreate, MemberUpdate, Membership, Payment};

/// Member detail response (member + memberships + payment history)
#[derive(Serialize)]
pub struct MemberDetail {
    #[serde(flatten)]
    pub member: Member,
    pub memberships: Vec<Membership>,
    pub payments: Vec<Payment>,
}

/// GET /api/members - all members managed by the current manager
pub async fn list(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<Member>>> {
    let members = member::find_all_by_manager(&state.pool, &user.id).await?;
    Ok(Json(members))
}

/// GET /api/members/:id - member with fund memberships and payments
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<MemberDetail>> {
    let member = owned_member(&state, &user, id).await?;
    let memberships = membership::find_by_member(&state.pool, id).await?;
    let payments = payment::list_by_member(&state.pool, id).await?;

    Ok(Json(MemberDetail {
        member,
        memberships,
        payments,
    }))
}

/// POST /api/members - register a member
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<MemberCreate>,
) -> AppResult<Json<Member>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;

    let member = member::create(&state.pool, &user.id, payload).await?;
    tracing::info!(member_id = member.id, "Member registered");
    Ok(Json(member))
}

/// PUT /api/members/:id - update a member
pub async fn update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<MemberUpdate>,
) -> AppResult<Json<Member>> {
    validate_optional_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    owned_member(&state, &user, id).await?;

    let member = member::update(&state.pool, id, payload).await?;
    Ok(Json(member))
}

/// DELETE /api/members/:id - delete a member and their memberships
pub async fn delete(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    owned_member(&state, &user, id).await?;
    let deleted = member::delete(&state.pool, id).await?;
    if deleted {
        tracing::info!(member_id = id, "Member deleted");
    }
    Ok(Json(deleted))
}

/// Fetch a member and check it belongs to the current manager.
pub(crate) async fn owned_member(
    state: &ServerState,
    user: &CurrentUser,
    id: i64,
) -> AppResult<Member> {
    let member = member::find_by_id(&state.pool, id)
        .await?
        .filter(|m| m.manager_id == user.id)
        .ok_or_else(|| AppError::not_found(format!("Member {id}")))?;
    Ok(member)
}
