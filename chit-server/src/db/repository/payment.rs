//! Payment Repository
//!
//! Every write here reconciles the two derived totals (member.total_paid
//! and membership.total_paid) in the same transaction as the ledger row.
//! Record adds, edit applies the signed delta, delete subtracts; the
//! three paths are exact mirrors so the totals always equal the sum of
//! the surviving payment rows.

use super::{RepoError, RepoResult};
use crate::ledger::money;
use shared::models::{ChitFund, Member, Payment, PaymentCreate, PaymentUpdate};
use sqlx::{Sqlite, SqlitePool, Transaction};

const PAYMENT_SELECT: &str = "SELECT id, member_id, member_name, chit_id, chit_name, month, amount, payment_date, manager_id, created_at FROM payment";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Payment>> {
    let sql = format!("{PAYMENT_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Payment>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn list_by_manager(pool: &SqlitePool, manager_id: &str) -> RepoResult<Vec<Payment>> {
    let sql = format!("{PAYMENT_SELECT} WHERE manager_id = ? ORDER BY created_at DESC");
    let rows = sqlx::query_as::<_, Payment>(&sql)
        .bind(manager_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn list_by_chit(pool: &SqlitePool, chit_id: i64) -> RepoResult<Vec<Payment>> {
    let sql = format!("{PAYMENT_SELECT} WHERE chit_id = ? ORDER BY month ASC, created_at ASC");
    let rows = sqlx::query_as::<_, Payment>(&sql)
        .bind(chit_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn list_by_member(pool: &SqlitePool, member_id: i64) -> RepoResult<Vec<Payment>> {
    let sql = format!("{PAYMENT_SELECT} WHERE member_id = ? ORDER BY created_at DESC");
    let rows = sqlx::query_as::<_, Payment>(&sql)
        .bind(member_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Record a contribution for a month.
///
/// The payer must hold a membership in the fund. After the insert the
/// fund's month advances automatically once every current member has a
/// row for it, all inside one transaction.
pub async fn record(pool: &SqlitePool, data: PaymentCreate) -> RepoResult<Payment> {
    let mut tx = pool.begin().await?;

    let fund = fetch_fund(&mut tx, data.chit_id).await?;
    let member = fetch_member(&mut tx, data.member_id).await?;
    validate_payment(data.month, data.amount, fund.duration_months)?;

    let membership_id = membership_id_for(&mut tx, data.chit_id, data.member_id)
        .await?
        .ok_or_else(|| {
            RepoError::RuleViolation(format!(
                "{} is not part of chit fund {}",
                member.name, fund.name
            ))
        })?;

    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    let payment_date = data
        .payment_date
        .clone()
        .unwrap_or_else(|| chrono::Utc::now().format("%Y-%m-%d").to_string());

    sqlx::query(
        "INSERT INTO payment (id, member_id, member_name, chit_id, chit_name, month, amount, payment_date, manager_id, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(data.member_id)
    .bind(&member.name)
    .bind(data.chit_id)
    .bind(&fund.name)
    .bind(data.month)
    .bind(data.amount)
    .bind(&payment_date)
    .bind(&fund.manager_id)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    apply_total_delta(&mut tx, data.member_id, Some(membership_id), data.amount, now).await?;

    super::chit_fund::advance_month_if_complete(&mut *tx, data.chit_id).await?;

    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to record payment".into()))
}

/// Edit a payment in place.
///
/// The amount delta (new minus old) flows into both running totals, so
/// an edit is indistinguishable from delete-then-record.
pub async fn update(pool: &SqlitePool, id: i64, data: PaymentUpdate) -> RepoResult<Payment> {
    let mut tx = pool.begin().await?;

    let current = fetch_payment(&mut tx, id).await?;
    let fund = fetch_fund(&mut tx, current.chit_id).await?;

    let month = data.month.unwrap_or(current.month);
    let amount = data.amount.unwrap_or(current.amount);
    validate_payment(month, amount, fund.duration_months)?;

    let now = shared::util::now_millis();
    sqlx::query(
        "UPDATE payment SET month = ?, amount = ?, payment_date = COALESCE(?, payment_date) WHERE id = ?",
    )
    .bind(month)
    .bind(amount)
    .bind(&data.payment_date)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    let delta = money::to_f64(money::to_decimal(amount) - money::to_decimal(current.amount));
    if delta != 0.0 {
        let membership_id = membership_id_for(&mut tx, current.chit_id, current.member_id).await?;
        apply_total_delta(&mut tx, current.member_id, membership_id, delta, now).await?;
    }

    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Payment {id} not found")))
}

/// Delete a payment and subtract it from both running totals.
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let mut tx = pool.begin().await?;

    let payment = fetch_payment(&mut tx, id).await?;

    sqlx::query("DELETE FROM payment WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let now = shared::util::now_millis();
    let membership_id = membership_id_for(&mut tx, payment.chit_id, payment.member_id).await?;
    apply_total_delta(&mut tx, payment.member_id, membership_id, -payment.amount, now).await?;

    tx.commit().await?;
    Ok(())
}

/// Bump member.total_paid and membership.total_paid by a signed delta,
/// flooring both at zero. A removed membership (id None) skips its half.
async fn apply_total_delta(
    tx: &mut Transaction<'_, Sqlite>,
    member_id: i64,
    membership_id: Option<i64>,
    delta: f64,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE member SET total_paid = MAX(total_paid + ?, 0), updated_at = ? WHERE id = ?")
        .bind(delta)
        .bind(now)
        .bind(member_id)
        .execute(&mut **tx)
        .await?;
    if let Some(ms_id) = membership_id {
        sqlx::query("UPDATE membership SET total_paid = MAX(total_paid + ?, 0) WHERE id = ?")
            .bind(delta)
            .bind(ms_id)
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}

async fn membership_id_for(
    tx: &mut Transaction<'_, Sqlite>,
    chit_id: i64,
    member_id: i64,
) -> Result<Option<i64>, sqlx::Error> {
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM membership WHERE chit_id = ? AND member_id = ?")
            .bind(chit_id)
            .bind(member_id)
            .fetch_optional(&mut **tx)
            .await?;
    Ok(row.map(|(id,)| id))
}

async fn fetch_fund(tx: &mut Transaction<'_, Sqlite>, chit_id: i64) -> RepoResult<ChitFund> {
    sqlx::query_as::<_, ChitFund>(
        "SELECT id, name, code, fund_type, total_amount, duration_months, monthly_amount, start_date, manager_id, current_month, current_members, status, created_at, updated_at FROM chit_fund WHERE id = ?",
    )
    .bind(chit_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| RepoError::NotFound(format!("Chit fund {chit_id} not found")))
}

async fn fetch_member(tx: &mut Transaction<'_, Sqlite>, member_id: i64) -> RepoResult<Member> {
    sqlx::query_as::<_, Member>(
        "SELECT id, user_id, name, phone, manager_id, active_chits, total_paid, status, created_at, updated_at FROM member WHERE id = ?",
    )
    .bind(member_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| RepoError::NotFound(format!("Member {member_id} not found")))
}

async fn fetch_payment(tx: &mut Transaction<'_, Sqlite>, id: i64) -> RepoResult<Payment> {
    let sql = format!("{PAYMENT_SELECT} WHERE id = ?");
    sqlx::query_as::<_, Payment>(&sql)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Payment {id} not found")))
}

fn validate_payment(month: i64, amount: f64, duration_months: i64) -> RepoResult<()> {
    if month < 1 || month > duration_months {
        return Err(RepoError::Validation(format!(
            "month must be between 1 and {duration_months}, got {month}"
        )));
    }
    if !amount.is_finite() || amount <= 0.0 {
        return Err(RepoError::Validation(format!(
            "amount must be positive, got {amount}"
        )));
    }
    if amount > money::MAX_AMOUNT {
        return Err(RepoError::Validation(format!(
            "amount exceeds maximum allowed ({}), got {amount}",
            money::MAX_AMOUNT
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::{memory_pool, seed_fund, seed_member};
    use crate::db::repository::{chit_fund, member, membership};

    async fn paid_totals(pool: &SqlitePool, member_id: i64, chit_id: i64) -> (f64, f64) {
        let m = member::find_by_id(pool, member_id).await.unwrap().unwrap();
        // No membership reads as zero so callers can check outsiders too
        let ms: Option<(f64,)> = sqlx::query_as(
            "SELECT total_paid FROM membership WHERE chit_id = ? AND member_id = ?",
        )
        .bind(chit_id)
        .bind(member_id)
        .fetch_optional(pool)
        .await
        .unwrap();
        (m.total_paid, ms.map_or(0.0, |(t,)| t))
    }

    #[tokio::test]
    async fn test_record_updates_both_totals() {
        let pool = memory_pool().await;
        let fund = seed_fund(&pool, 12000.0, 12).await;
        let alice = seed_member(&pool, "Alice").await;
        membership::add_member(&pool, fund.id, alice.id).await.unwrap();

        let payment = record(
            &pool,
            PaymentCreate {
                member_id: alice.id,
                chit_id: fund.id,
                month: 1,
                amount: 1000.0,
                payment_date: Some("2026-01-05".to_string()),
            },
        )
        .await
        .unwrap();

        assert_eq!(payment.amount, 1000.0);
        assert_eq!(payment.member_name, "Alice");
        assert_eq!(payment.chit_name, fund.name);
        assert_eq!(paid_totals(&pool, alice.id, fund.id).await, (1000.0, 1000.0));
    }

    #[tokio::test]
    async fn test_record_rejects_non_member() {
        let pool = memory_pool().await;
        let fund = seed_fund(&pool, 12000.0, 12).await;
        let outsider = seed_member(&pool, "Outsider").await;

        let result = record(
            &pool,
            PaymentCreate {
                member_id: outsider.id,
                chit_id: fund.id,
                month: 1,
                amount: 1000.0,
                payment_date: None,
            },
        )
        .await;
        assert!(matches!(result, Err(RepoError::RuleViolation(_))));
        assert_eq!(paid_totals(&pool, outsider.id, fund.id).await, (0.0, 0.0));

        // A member id that does not exist at all is NotFound, not a rule error
        let absent = record(
            &pool,
            PaymentCreate {
                member_id: 424242,
                chit_id: fund.id,
                month: 1,
                amount: 1000.0,
                payment_date: None,
            },
        )
        .await;
        assert!(matches!(absent, Err(RepoError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_record_rejects_out_of_range_month_and_amount() {
        let pool = memory_pool().await;
        let fund = seed_fund(&pool, 12000.0, 12).await;
        let alice = seed_member(&pool, "Alice").await;
        membership::add_member(&pool, fund.id, alice.id).await.unwrap();

        for (month, amount) in [(0, 1000.0), (13, 1000.0), (1, 0.0), (1, -50.0)] {
            let result = record(
                &pool,
                PaymentCreate {
                    member_id: alice.id,
                    chit_id: fund.id,
                    month,
                    amount,
                    payment_date: None,
                },
            )
            .await;
            assert!(
                matches!(result, Err(RepoError::Validation(_))),
                "month={month} amount={amount} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_delete_reverses_record_exactly() {
        let pool = memory_pool().await;
        let fund = seed_fund(&pool, 12000.0, 12).await;
        let alice = seed_member(&pool, "Alice").await;
        membership::add_member(&pool, fund.id, alice.id).await.unwrap();

        let p1 = record(
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
        record(
            &pool,
            PaymentCreate {
                member_id: alice.id,
                chit_id: fund.id,
                month: 2,
                amount: 1000.0,
                payment_date: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(paid_totals(&pool, alice.id, fund.id).await, (2000.0, 2000.0));

        delete(&pool, p1.id).await.unwrap();
        assert_eq!(paid_totals(&pool, alice.id, fund.id).await, (1000.0, 1000.0));

        // Second delete finds nothing and changes nothing
        let second = delete(&pool, p1.id).await;
        assert!(matches!(second, Err(RepoError::NotFound(_))));
        assert_eq!(paid_totals(&pool, alice.id, fund.id).await, (1000.0, 1000.0));
    }

    #[tokio::test]
    async fn test_update_applies_amount_delta_to_both_totals() {
        let pool = memory_pool().await;
        let fund = seed_fund(&pool, 12000.0, 12).await;
        let alice = seed_member(&pool, "Alice").await;
        membership::add_member(&pool, fund.id, alice.id).await.unwrap();

        let payment = record(
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

        let edited = update(
            &pool,
            payment.id,
            PaymentUpdate {
                month: None,
                amount: Some(750.0),
                payment_date: Some("2026-01-09".to_string()),
            },
        )
        .await
        .unwrap();
        assert_eq!(edited.amount, 750.0);
        assert_eq!(edited.payment_date, "2026-01-09");
        assert_eq!(paid_totals(&pool, alice.id, fund.id).await, (750.0, 750.0));

        // Raising it moves the totals back up by the same delta
        update(
            &pool,
            payment.id,
            PaymentUpdate {
                month: Some(2),
                amount: Some(1200.0),
                payment_date: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(paid_totals(&pool, alice.id, fund.id).await, (1200.0, 1200.0));
    }

    #[tokio::test]
    async fn test_month_advances_when_all_members_paid() {
        let pool = memory_pool().await;
        let fund = seed_fund(&pool, 12000.0, 12).await;
        let alice = seed_member(&pool, "Alice").await;
        let bob = seed_member(&pool, "Bob").await;
        membership::add_member(&pool, fund.id, alice.id).await.unwrap();
        membership::add_member(&pool, fund.id, bob.id).await.unwrap();

        record(
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
        let fund_row = chit_fund::find_by_id(&pool, fund.id).await.unwrap().unwrap();
        assert_eq!(fund_row.current_month, 1);

        record(
            &pool,
            PaymentCreate {
                member_id: bob.id,
                chit_id: fund.id,
                month: 1,
                amount: 1000.0,
                payment_date: None,
            },
        )
        .await
        .unwrap();
        let fund_row = chit_fund::find_by_id(&pool, fund.id).await.unwrap().unwrap();
        assert_eq!(fund_row.current_month, 2);
    }

    #[tokio::test]
    async fn test_delete_after_membership_removal_still_fixes_member_total() {
        let pool = memory_pool().await;
        let fund = seed_fund(&pool, 12000.0, 12).await;
        let alice = seed_member(&pool, "Alice").await;
        let ms = membership::add_member(&pool, fund.id, alice.id).await.unwrap();

        let payment = record(
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

        // Membership removal keeps the ledger rows
        membership::remove(&pool, ms.id).await.unwrap();
        assert_eq!(list_by_chit(&pool, fund.id).await.unwrap().len(), 1);

        delete(&pool, payment.id).await.unwrap();
        let alice_row = member::find_by_id(&pool, alice.id).await.unwrap().unwrap();
        assert_eq!(alice_row.total_paid, 0.0);
    }
}
