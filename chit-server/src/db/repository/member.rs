//! Member Repository

use super::{RepoError, RepoResult};
use shared::models::{Member, MemberCreate, MemberUpdate};
use sqlx::SqlitePool;

const MEMBER_SELECT: &str = "SELECT id, user_id, name, phone, manager_id, active_chits, total_paid, status, created_at, updated_at FROM member";

pub async fn find_all_by_manager(pool: &SqlitePool, manager_id: &str) -> RepoResult<Vec<Member>> {
    let sql = format!("{MEMBER_SELECT} WHERE manager_id = ? ORDER BY created_at DESC");
    let rows = sqlx::query_as::<_, Member>(&sql)
        .bind(manager_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Member>> {
    let sql = format!("{MEMBER_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Member>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Look up the member row linked to an identity-service principal.
pub async fn find_by_user_id(pool: &SqlitePool, user_id: &str) -> RepoResult<Option<Member>> {
    let sql = format!("{MEMBER_SELECT} WHERE user_id = ?");
    let row = sqlx::query_as::<_, Member>(&sql)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, manager_id: &str, data: MemberCreate) -> RepoResult<Member> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO member (id, user_id, name, phone, manager_id, active_chits, total_paid, status, created_at, updated_at) VALUES (?, ?, ?, ?, ?, 0, 0, 'active', ?, ?)",
    )
    .bind(id)
    .bind(&data.user_id)
    .bind(&data.name)
    .bind(&data.phone)
    .bind(manager_id)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create member".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: MemberUpdate) -> RepoResult<Member> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE member SET name = COALESCE(?, name), phone = COALESCE(?, phone), status = COALESCE(?, status), updated_at = ? WHERE id = ?",
    )
    .bind(&data.name)
    .bind(&data.phone)
    .bind(data.status)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Member {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Member {id} not found")))
}

/// Delete a member and cascade.
///
/// The member's memberships and payments go with them, and every fund
/// they belonged to gives back one current_members.
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    sqlx::query(
        "UPDATE chit_fund SET current_members = MAX(current_members - 1, 0), updated_at = ? WHERE id IN (SELECT chit_id FROM membership WHERE member_id = ?)",
    )
    .bind(now)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM membership WHERE member_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM payment WHERE member_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let rows = sqlx::query("DELETE FROM member WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(rows.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::{memory_pool, seed_fund, seed_member};
    use crate::db::repository::{chit_fund, membership};

    #[tokio::test]
    async fn test_update_missing_member_is_not_found() {
        let pool = memory_pool().await;
        let result = update(
            &pool,
            404,
            MemberUpdate {
                name: Some("Ghost".to_string()),
                phone: None,
                status: None,
            },
        )
        .await;
        assert!(matches!(result, Err(RepoError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_cascades_and_decrements_fund_count() {
        let pool = memory_pool().await;
        let fund = seed_fund(&pool, 12000.0, 12).await;
        let alice = seed_member(&pool, "Alice").await;
        let bob = seed_member(&pool, "Bob").await;
        membership::add_member(&pool, fund.id, alice.id).await.unwrap();
        membership::add_member(&pool, fund.id, bob.id).await.unwrap();

        assert!(delete(&pool, alice.id).await.unwrap());

        let fund = chit_fund::find_by_id(&pool, fund.id).await.unwrap().unwrap();
        assert_eq!(fund.current_members, 1);
        assert!(find_by_id(&pool, alice.id).await.unwrap().is_none());
        let remaining = membership::find_by_chit(&pool, fund.id).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].member_id, bob.id);
    }
}
