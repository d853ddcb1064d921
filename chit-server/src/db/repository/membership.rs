//! Membership Repository
//!
//! State machine per (fund, member) pair: absent -> approved -> absent.
//! Joins auto-approve; every transition updates the membership row and
//! both count caches in one transaction.

use super::{RepoError, RepoResult};
use shared::models::{ChitFund, Member, Membership};
use sqlx::{Sqlite, SqlitePool, Transaction};

const MEMBERSHIP_SELECT: &str = "SELECT id, chit_id, member_id, chit_name, chit_code, member_name, manager_id, status, total_paid, joined_at FROM membership";

pub async fn find_by_chit(pool: &SqlitePool, chit_id: i64) -> RepoResult<Vec<Membership>> {
    let sql = format!("{MEMBERSHIP_SELECT} WHERE chit_id = ? ORDER BY joined_at ASC");
    let rows = sqlx::query_as::<_, Membership>(&sql)
        .bind(chit_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_by_member(pool: &SqlitePool, member_id: i64) -> RepoResult<Vec<Membership>> {
    let sql = format!("{MEMBERSHIP_SELECT} WHERE member_id = ? ORDER BY joined_at ASC");
    let rows = sqlx::query_as::<_, Membership>(&sql)
        .bind(member_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Membership>> {
    let sql = format!("{MEMBERSHIP_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Membership>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Member-initiated join by fund code.
pub async fn join_by_code(pool: &SqlitePool, code: &str, member_id: i64) -> RepoResult<Membership> {
    let mut tx = pool.begin().await?;

    let fund = sqlx::query_as::<_, ChitFund>(
        "SELECT id, name, code, fund_type, total_amount, duration_months, monthly_amount, start_date, manager_id, current_month, current_members, status, created_at, updated_at FROM chit_fund WHERE code = ?",
    )
    .bind(code.trim().to_uppercase())
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| RepoError::NotFound(format!("No chit fund with code {code}")))?;

    let id = insert_membership(&mut tx, &fund, member_id).await?;
    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create membership".into()))
}

/// Manager-initiated add of an existing member to a fund.
pub async fn add_member(pool: &SqlitePool, chit_id: i64, member_id: i64) -> RepoResult<Membership> {
    let mut tx = pool.begin().await?;

    let fund = sqlx::query_as::<_, ChitFund>(
        "SELECT id, name, code, fund_type, total_amount, duration_months, monthly_amount, start_date, manager_id, current_month, current_members, status, created_at, updated_at FROM chit_fund WHERE id = ?",
    )
    .bind(chit_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| RepoError::NotFound(format!("Chit fund {chit_id} not found")))?;

    let id = insert_membership(&mut tx, &fund, member_id).await?;
    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create membership".into()))
}

/// Shared join path: guards, membership insert, counter increments.
async fn insert_membership(
    tx: &mut Transaction<'_, Sqlite>,
    fund: &ChitFund,
    member_id: i64,
) -> RepoResult<i64> {
    if fund.status != shared::models::FundStatus::Active {
        return Err(RepoError::RuleViolation(format!(
            "Chit fund {} is not active",
            fund.code
        )));
    }

    let member = sqlx::query_as::<_, Member>(
        "SELECT id, user_id, name, phone, manager_id, active_chits, total_paid, status, created_at, updated_at FROM member WHERE id = ?",
    )
    .bind(member_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| RepoError::NotFound(format!("Member {member_id} not found")))?;

    let existing: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM membership WHERE chit_id = ? AND member_id = ?")
            .bind(fund.id)
            .bind(member_id)
            .fetch_optional(&mut **tx)
            .await?;
    if existing.is_some() {
        return Err(RepoError::Duplicate(format!(
            "{} is already a member of {}",
            member.name, fund.name
        )));
    }

    // Ledger rows survive a removal, so a re-join resumes from their sum
    let (prior_paid,): (f64,) = sqlx::query_as(
        "SELECT CAST(COALESCE(SUM(amount), 0) AS REAL) FROM payment WHERE chit_id = ? AND member_id = ?",
    )
    .bind(fund.id)
    .bind(member_id)
    .fetch_one(&mut **tx)
    .await?;

    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();

    sqlx::query(
        "INSERT INTO membership (id, chit_id, member_id, chit_name, chit_code, member_name, manager_id, status, total_paid, joined_at) VALUES (?, ?, ?, ?, ?, ?, ?, 'approved', ?, ?)",
    )
    .bind(id)
    .bind(fund.id)
    .bind(member_id)
    .bind(&fund.name)
    .bind(&fund.code)
    .bind(&member.name)
    .bind(&fund.manager_id)
    .bind(prior_paid)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    sqlx::query(
        "UPDATE chit_fund SET current_members = current_members + 1, updated_at = ? WHERE id = ?",
    )
    .bind(now)
    .bind(fund.id)
    .execute(&mut **tx)
    .await?;

    sqlx::query("UPDATE member SET active_chits = active_chits + 1, updated_at = ? WHERE id = ?")
        .bind(now)
        .bind(member_id)
        .execute(&mut **tx)
        .await?;

    Ok(id)
}

/// Remove a membership and give back both counters.
///
/// A second removal of the same id reports NotFound and leaves every
/// counter untouched; the decrements floor at zero regardless.
pub async fn remove(pool: &SqlitePool, membership_id: i64) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let sql = format!("{MEMBERSHIP_SELECT} WHERE id = ?");
    let membership = sqlx::query_as::<_, Membership>(&sql)
        .bind(membership_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Membership {membership_id} not found")))?;

    sqlx::query("DELETE FROM membership WHERE id = ?")
        .bind(membership_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        "UPDATE chit_fund SET current_members = MAX(current_members - 1, 0), updated_at = ? WHERE id = ?",
    )
    .bind(now)
    .bind(membership.chit_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "UPDATE member SET active_chits = MAX(active_chits - 1, 0), updated_at = ? WHERE id = ?",
    )
    .bind(now)
    .bind(membership.member_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::{memory_pool, seed_fund, seed_member};
    use crate::db::repository::{chit_fund, member, payment};
    use shared::models::{ChitFundUpdate, FundStatus, MembershipStatus, PaymentCreate};

    #[tokio::test]
    async fn test_join_and_counters() {
        let pool = memory_pool().await;
        let fund = seed_fund(&pool, 12000.0, 12).await;
        let alice = seed_member(&pool, "Alice").await;

        let ms = join_by_code(&pool, &fund.code, alice.id).await.unwrap();
        assert_eq!(ms.chit_id, fund.id);
        assert_eq!(ms.member_id, alice.id);
        assert_eq!(ms.status, MembershipStatus::Approved);
        assert_eq!(ms.chit_code, fund.code);

        let fund = chit_fund::find_by_id(&pool, fund.id).await.unwrap().unwrap();
        assert_eq!(fund.current_members, 1);
        let alice = member::find_by_id(&pool, alice.id).await.unwrap().unwrap();
        assert_eq!(alice.active_chits, 1);
    }

    #[tokio::test]
    async fn test_join_by_code_is_case_insensitive() {
        let pool = memory_pool().await;
        let fund = seed_fund(&pool, 12000.0, 12).await;
        let alice = seed_member(&pool, "Alice").await;

        let lower = fund.code.to_lowercase();
        let ms = join_by_code(&pool, &lower, alice.id).await.unwrap();
        assert_eq!(ms.chit_id, fund.id);
    }

    #[tokio::test]
    async fn test_duplicate_join_is_rejected() {
        let pool = memory_pool().await;
        let fund = seed_fund(&pool, 12000.0, 12).await;
        let alice = seed_member(&pool, "Alice").await;

        add_member(&pool, fund.id, alice.id).await.unwrap();
        let second = join_by_code(&pool, &fund.code, alice.id).await;
        assert!(matches!(second, Err(RepoError::Duplicate(_))));

        // The failed join must not bump counters
        let fund = chit_fund::find_by_id(&pool, fund.id).await.unwrap().unwrap();
        assert_eq!(fund.current_members, 1);
        let alice = member::find_by_id(&pool, alice.id).await.unwrap().unwrap();
        assert_eq!(alice.active_chits, 1);
    }

    #[tokio::test]
    async fn test_join_closed_fund_is_rejected() {
        let pool = memory_pool().await;
        let fund = seed_fund(&pool, 12000.0, 12).await;
        chit_fund::update(
            &pool,
            fund.id,
            ChitFundUpdate {
                name: None,
                fund_type: None,
                total_amount: None,
                duration_months: None,
                start_date: None,
                status: Some(FundStatus::Closed),
            },
        )
        .await
        .unwrap();
        let alice = seed_member(&pool, "Alice").await;

        let result = join_by_code(&pool, &fund.code, alice.id).await;
        assert!(matches!(result, Err(RepoError::RuleViolation(_))));
    }

    #[tokio::test]
    async fn test_join_unknown_code_is_not_found() {
        let pool = memory_pool().await;
        let alice = seed_member(&pool, "Alice").await;
        let result = join_by_code(&pool, "NOPE99", alice.id).await;
        assert!(matches!(result, Err(RepoError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_remove_twice_reports_not_found_and_keeps_counters() {
        let pool = memory_pool().await;
        let fund = seed_fund(&pool, 12000.0, 12).await;
        let alice = seed_member(&pool, "Alice").await;
        let bob = seed_member(&pool, "Bob").await;
        let ms = add_member(&pool, fund.id, alice.id).await.unwrap();
        add_member(&pool, fund.id, bob.id).await.unwrap();

        remove(&pool, ms.id).await.unwrap();
        let fund_after = chit_fund::find_by_id(&pool, fund.id).await.unwrap().unwrap();
        assert_eq!(fund_after.current_members, 1);

        let second = remove(&pool, ms.id).await;
        assert!(matches!(second, Err(RepoError::NotFound(_))));

        // Counters unchanged by the failed second removal
        let fund_after = chit_fund::find_by_id(&pool, fund.id).await.unwrap().unwrap();
        assert_eq!(fund_after.current_members, 1);
        let alice = member::find_by_id(&pool, alice.id).await.unwrap().unwrap();
        assert_eq!(alice.active_chits, 0);
    }

    #[tokio::test]
    async fn test_rejoin_resumes_total_from_ledger() {
        let pool = memory_pool().await;
        let fund = seed_fund(&pool, 12000.0, 12).await;
        let alice = seed_member(&pool, "Alice").await;
        let ms = add_member(&pool, fund.id, alice.id).await.unwrap();

        payment::record(
            &pool,
            PaymentCreate {
                member_id: alice.id,
                chit_id: fund.id,
                month: 1,
                amount: 1000.0,
                payment_date: None,
            },
        )
        .await
        .unwrap();

        // Removal keeps the ledger rows
        remove(&pool, ms.id).await.unwrap();

        // A fresh membership picks the surviving sum back up
        let again = add_member(&pool, fund.id, alice.id).await.unwrap();
        assert_ne!(again.id, ms.id);
        assert_eq!(again.total_paid, 1000.0);

        payment::record(
            &pool,
            PaymentCreate {
                member_id: alice.id,
                chit_id: fund.id,
                month: 2,
                amount: 500.0,
                payment_date: None,
            },
        )
        .await
        .unwrap();
        let refreshed = find_by_id(&pool, again.id).await.unwrap().unwrap();
        assert_eq!(refreshed.total_paid, 1500.0);
    }

    #[tokio::test]
    async fn test_counts_track_add_remove_sequences() {
        let pool = memory_pool().await;
        let fund = seed_fund(&pool, 12000.0, 12).await;
        let mut ids = Vec::new();
        for name in ["Alice", "Bob", "Carol"] {
            let m = seed_member(&pool, name).await;
            ids.push(add_member(&pool, fund.id, m.id).await.unwrap().id);
        }
        let fund_row = chit_fund::find_by_id(&pool, fund.id).await.unwrap().unwrap();
        assert_eq!(fund_row.current_members, 3);
        assert_eq!(find_by_chit(&pool, fund.id).await.unwrap().len(), 3);

        remove(&pool, ids[1]).await.unwrap();
        let fund_row = chit_fund::find_by_id(&pool, fund.id).await.unwrap().unwrap();
        assert_eq!(fund_row.current_members, 2);
        assert_eq!(find_by_chit(&pool, fund.id).await.unwrap().len(), 2);
    }
}
