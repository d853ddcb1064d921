//! Auction Repository
//!
//! Records the month's winning bid together with the discounted monthly
//! rate derived from the fund's schedule. Auction rows are history only;
//! they never touch member or fund caches.

use super::{RepoError, RepoResult};
use crate::ledger::accounting;
use crate::ledger::money;
use shared::models::{Auction, AuctionCreate, ChitFund, Membership};
use sqlx::SqlitePool;

const AUCTION_SELECT: &str = "SELECT id, chit_id, chit_name, member_id, member_name, month, amount_taken, monthly_amount, discount, manager_id, auction_date, created_at FROM auction";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Auction>> {
    let sql = format!("{AUCTION_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Auction>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn list_by_chit(pool: &SqlitePool, chit_id: i64) -> RepoResult<Vec<Auction>> {
    let sql = format!("{AUCTION_SELECT} WHERE chit_id = ? ORDER BY month ASC");
    let rows = sqlx::query_as::<_, Auction>(&sql)
        .bind(chit_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn list_by_manager(pool: &SqlitePool, manager_id: &str) -> RepoResult<Vec<Auction>> {
    let sql = format!("{AUCTION_SELECT} WHERE manager_id = ? ORDER BY created_at DESC");
    let rows = sqlx::query_as::<_, Auction>(&sql)
        .bind(manager_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Record an auction result for a month.
///
/// The winner must be a member of the fund, the fund must be an auction
/// fund, and a month can only be auctioned once. The discounted monthly
/// rate comes from the fixed 5%-per-month schedule.
pub async fn record(pool: &SqlitePool, data: AuctionCreate) -> RepoResult<Auction> {
    let mut tx = pool.begin().await?;

    let fund = sqlx::query_as::<_, ChitFund>(
        "SELECT id, name, code, fund_type, total_amount, duration_months, monthly_amount, start_date, manager_id, current_month, current_members, status, created_at, updated_at FROM chit_fund WHERE id = ?",
    )
    .bind(data.chit_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| RepoError::NotFound(format!("Chit fund {} not found", data.chit_id)))?;

    if fund.fund_type != shared::models::FundType::Auction {
        return Err(RepoError::RuleViolation(format!(
            "Chit fund {} is not an auction fund",
            fund.name
        )));
    }
    if data.month < 1 || data.month > fund.duration_months {
        return Err(RepoError::Validation(format!(
            "month must be between 1 and {}, got {}",
            fund.duration_months, data.month
        )));
    }
    if !data.amount_taken.is_finite()
        || data.amount_taken <= 0.0
        || data.amount_taken > money::MAX_AMOUNT
    {
        return Err(RepoError::Validation(format!(
            "amount_taken must be positive and at most {}, got {}",
            money::MAX_AMOUNT,
            data.amount_taken
        )));
    }

    let membership = sqlx::query_as::<_, Membership>(
        "SELECT id, chit_id, member_id, chit_name, chit_code, member_name, manager_id, status, total_paid, joined_at FROM membership WHERE chit_id = ? AND member_id = ?",
    )
    .bind(data.chit_id)
    .bind(data.member_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| {
        RepoError::RuleViolation(format!(
            "Member {} is not part of chit fund {}",
            data.member_id, fund.name
        ))
    })?;

    let taken: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM auction WHERE chit_id = ? AND month = ?")
            .bind(data.chit_id)
            .bind(data.month)
            .fetch_optional(&mut *tx)
            .await?;
    if taken.is_some() {
        return Err(RepoError::Duplicate(format!(
            "Month {} of {} has already been auctioned",
            data.month, fund.name
        )));
    }

    let reduction = accounting::auction_reduction(fund.monthly_amount, data.month);
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    let auction_date = data
        .auction_date
        .clone()
        .unwrap_or_else(|| chrono::Utc::now().format("%Y-%m-%d").to_string());

    sqlx::query(
        "INSERT INTO auction (id, chit_id, chit_name, member_id, member_name, month, amount_taken, monthly_amount, discount, manager_id, auction_date, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(data.chit_id)
    .bind(&fund.name)
    .bind(data.member_id)
    .bind(&membership.member_name)
    .bind(data.month)
    .bind(data.amount_taken)
    .bind(reduction.reduced_monthly)
    .bind(reduction.discount)
    .bind(&fund.manager_id)
    .bind(&auction_date)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to record auction".into()))
}
