//! Chit Fund Repository

use super::{RepoError, RepoResult};
use crate::ledger::money;
use shared::models::{ChitFund, ChitFundCreate, ChitFundUpdate};
use sqlx::{SqliteConnection, SqlitePool};

const CHIT_FUND_SELECT: &str = "SELECT id, name, code, fund_type, total_amount, duration_months, monthly_amount, start_date, manager_id, current_month, current_members, status, created_at, updated_at FROM chit_fund";

pub async fn find_all_by_manager(pool: &SqlitePool, manager_id: &str) -> RepoResult<Vec<ChitFund>> {
    let sql = format!("{CHIT_FUND_SELECT} WHERE manager_id = ? ORDER BY created_at DESC");
    let rows = sqlx::query_as::<_, ChitFund>(&sql)
        .bind(manager_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<ChitFund>> {
    let sql = format!("{CHIT_FUND_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, ChitFund>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_code(pool: &SqlitePool, code: &str) -> RepoResult<Option<ChitFund>> {
    let sql = format!("{CHIT_FUND_SELECT} WHERE code = ?");
    let row = sqlx::query_as::<_, ChitFund>(&sql)
        .bind(code)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn create(
    pool: &SqlitePool,
    manager_id: &str,
    data: ChitFundCreate,
) -> RepoResult<ChitFund> {
    // Fail fast, before any write
    validate_amounts(data.total_amount, data.duration_months)?;

    let code = match data.code.as_deref().map(str::trim) {
        Some(c) if !c.is_empty() => c.to_uppercase(),
        _ => shared::util::generate_chit_code(),
    };

    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    let monthly_amount = money::monthly_amount(data.total_amount, data.duration_months);

    let mut tx = pool.begin().await?;

    // The UNIQUE index backs this up; the explicit check gives the
    // caller a readable message instead of a constraint error.
    let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM chit_fund WHERE code = ?")
        .bind(&code)
        .fetch_optional(&mut *tx)
        .await?;
    if existing.is_some() {
        return Err(RepoError::Duplicate(format!(
            "Chit code {code} is already in use"
        )));
    }

    sqlx::query(
        "INSERT INTO chit_fund (id, name, code, fund_type, total_amount, duration_months, monthly_amount, start_date, manager_id, current_month, current_members, status, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 1, 0, 'active', ?, ?)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&code)
    .bind(data.fund_type)
    .bind(data.total_amount)
    .bind(data.duration_months)
    .bind(monthly_amount)
    .bind(&data.start_date)
    .bind(manager_id)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create chit fund".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: ChitFundUpdate) -> RepoResult<ChitFund> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let sql = format!("{CHIT_FUND_SELECT} WHERE id = ?");
    let current = sqlx::query_as::<_, ChitFund>(&sql)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Chit fund {id} not found")))?;

    let total_amount = data.total_amount.unwrap_or(current.total_amount);
    let duration_months = data.duration_months.unwrap_or(current.duration_months);
    validate_amounts(total_amount, duration_months)?;

    // monthly_amount is derived; keep it in lockstep with total/duration
    let monthly_amount = money::monthly_amount(total_amount, duration_months);

    sqlx::query(
        "UPDATE chit_fund SET name = COALESCE(?, name), fund_type = COALESCE(?, fund_type), total_amount = ?, duration_months = ?, monthly_amount = ?, start_date = COALESCE(?, start_date), status = COALESCE(?, status), current_month = MIN(current_month, ?), updated_at = ? WHERE id = ?",
    )
    .bind(&data.name)
    .bind(data.fund_type)
    .bind(total_amount)
    .bind(duration_months)
    .bind(monthly_amount)
    .bind(&data.start_date)
    .bind(data.status)
    .bind(duration_months)
    .bind(now)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Chit fund {id} not found")))
}

/// Manual month advance: +1, capped at duration, never backwards.
pub async fn advance_month(pool: &SqlitePool, id: i64) -> RepoResult<ChitFund> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE chit_fund SET current_month = MIN(current_month + 1, duration_months), updated_at = ? WHERE id = ?",
    )
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Chit fund {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Chit fund {id} not found")))
}

/// Advance the month when every current member has a payment row for it.
///
/// Runs inside the caller's transaction (payment recording), so the
/// completion check and the bump are atomic with the ledger write.
pub(crate) async fn advance_month_if_complete(
    conn: &mut SqliteConnection,
    chit_id: i64,
) -> Result<bool, sqlx::Error> {
    let fund: Option<(i64, i64, i64)> = sqlx::query_as(
        "SELECT current_month, duration_months, current_members FROM chit_fund WHERE id = ?",
    )
    .bind(chit_id)
    .fetch_optional(&mut *conn)
    .await?;
    let Some((current_month, duration_months, current_members)) = fund else {
        return Ok(false);
    };
    if current_members == 0 || current_month >= duration_months {
        return Ok(false);
    }

    let (paid_members,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM membership m WHERE m.chit_id = ? AND EXISTS (SELECT 1 FROM payment p WHERE p.chit_id = m.chit_id AND p.member_id = m.member_id AND p.month = ?)",
    )
    .bind(chit_id)
    .bind(current_month)
    .fetch_one(&mut *conn)
    .await?;

    if paid_members < current_members {
        return Ok(false);
    }

    sqlx::query("UPDATE chit_fund SET current_month = current_month + 1, updated_at = ? WHERE id = ?")
        .bind(shared::util::now_millis())
        .bind(chit_id)
        .execute(&mut *conn)
        .await?;
    Ok(true)
}

/// Delete a fund and everything hanging off it.
///
/// Memberships, payments and auctions for the fund are removed in the
/// same transaction, and each affected member's active_chits and
/// total_paid give back exactly what the deleted rows contributed.
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM chit_fund WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    if exists.is_none() {
        return Ok(false);
    }

    sqlx::query(
        "UPDATE member SET active_chits = MAX(active_chits - 1, 0), updated_at = ? WHERE id IN (SELECT member_id FROM membership WHERE chit_id = ?)",
    )
    .bind(now)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "UPDATE member SET total_paid = MAX(total_paid - (SELECT COALESCE(SUM(amount), 0) FROM payment WHERE payment.chit_id = ? AND payment.member_id = member.id), 0), updated_at = ? WHERE id IN (SELECT DISTINCT member_id FROM payment WHERE chit_id = ?)",
    )
    .bind(id)
    .bind(now)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM payment WHERE chit_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM auction WHERE chit_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM membership WHERE chit_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let rows = sqlx::query("DELETE FROM chit_fund WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(rows.rows_affected() > 0)
}

fn validate_amounts(total_amount: f64, duration_months: i64) -> RepoResult<()> {
    if !total_amount.is_finite() || total_amount <= 0.0 {
        return Err(RepoError::Validation(format!(
            "total_amount must be positive, got {total_amount}"
        )));
    }
    if total_amount > money::MAX_AMOUNT {
        return Err(RepoError::Validation(format!(
            "total_amount exceeds maximum allowed ({}), got {total_amount}",
            money::MAX_AMOUNT
        )));
    }
    if duration_months <= 0 {
        return Err(RepoError::Validation(format!(
            "duration_months must be positive, got {duration_months}"
        )));
    }
    Ok(())
}
