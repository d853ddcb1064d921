//! Fund progress, revenue, auction reduction and receiver selection
//!
//! The derivation rules behind the dashboards. Everything here is a pure
//! function of already-loaded rows so it can be unit tested without a
//! database.

use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::*;
use serde::Serialize;
use std::collections::HashSet;

use crate::ledger::money::{to_decimal, to_f64};
use shared::models::{Membership, Payment};

/// How far a fund has run, inclusive of the current month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FundProgress {
    pub months_passed: i64,
    /// 0..=100
    pub percentage: i64,
}

/// Elapsed months and completion percentage for a fund.
///
/// A fund started this calendar month counts as 1 month passed. A
/// missing or unparseable start date yields {0, 0} rather than an error;
/// progress is a display aggregate and must not fail a dashboard load.
pub fn fund_progress(
    start_date: Option<&str>,
    duration_months: i64,
    today: NaiveDate,
) -> FundProgress {
    let none = FundProgress {
        months_passed: 0,
        percentage: 0,
    };
    if duration_months <= 0 {
        return none;
    }
    let Some(raw) = start_date else {
        return none;
    };
    let Ok(start) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") else {
        return none;
    };

    let delta = (today.year() as i64 - start.year() as i64) * 12
        + (today.month() as i64 - start.month() as i64)
        + 1;
    let months_passed = delta.clamp(0, duration_months);
    let percentage = ((months_passed as f64 / duration_months as f64) * 100.0)
        .min(100.0)
        .round() as i64;

    FundProgress {
        months_passed,
        percentage,
    }
}

/// Total collected across a set of payment rows.
///
/// Used both for the manager dashboard aggregate and as the ledger-side
/// cross-check of member.total_paid.
pub fn total_revenue(payments: &[Payment]) -> f64 {
    let total: Decimal = payments.iter().map(|p| to_decimal(p.amount)).sum();
    to_f64(total)
}

/// Result of applying the month's auction discount schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AuctionReduction {
    pub reduction_pct: i64,
    pub reduced_monthly: f64,
    pub discount: f64,
}

/// Effective monthly contribution after the auction for `month`.
///
/// The discount schedule is deterministic: 5% per elapsed month, capped
/// at 40%. Month 1 has no reduction.
pub fn auction_reduction(base_monthly: f64, month: i64) -> AuctionReduction {
    let reduction_pct = ((month - 1) * 5).clamp(0, 40);
    let base = to_decimal(base_monthly);
    let reduced =
        base * (Decimal::ONE_HUNDRED - Decimal::from(reduction_pct)) / Decimal::ONE_HUNDRED;
    let reduced_monthly = to_f64(reduced);
    let discount = to_f64(base - reduced);

    AuctionReduction {
        reduction_pct,
        reduced_monthly,
        discount,
    }
}

/// Next member due to receive the pot.
///
/// First member in join order who is paid up for the month and has not
/// already received a payout. Returns None when every paid member has
/// received (or nobody has paid).
pub fn next_receiver(
    memberships_in_join_order: &[Membership],
    paid_member_ids: &HashSet<i64>,
    receiver_member_ids: &HashSet<i64>,
) -> Option<i64> {
    memberships_in_join_order
        .iter()
        .map(|m| m.member_id)
        .find(|id| paid_member_ids.contains(id) && !receiver_member_ids.contains(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::MembershipStatus;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn membership(member_id: i64) -> Membership {
        Membership {
            id: member_id * 10,
            chit_id: 1,
            member_id,
            chit_name: "Fund".to_string(),
            chit_code: "ABC234".to_string(),
            member_name: format!("Member {member_id}"),
            manager_id: "mgr-1".to_string(),
            status: MembershipStatus::Approved,
            total_paid: 0.0,
            joined_at: member_id,
        }
    }

    #[test]
    fn test_progress_started_this_month() {
        let p = fund_progress(Some("2026-08-01"), 12, date(2026, 8, 24));
        assert_eq!(p.months_passed, 1);
        assert_eq!(p.percentage, 8); // round(1/12 * 100)
    }

    #[test]
    fn test_progress_three_full_months_ago_counts_four() {
        // Started exactly 3 full months ago -> 4 inclusive of current month
        let p = fund_progress(Some("2026-05-24"), 12, date(2026, 8, 24));
        assert_eq!(p.months_passed, 4);
        assert_eq!(p.percentage, 33); // round(4/12 * 100)
    }

    #[test]
    fn test_progress_clamps_at_duration() {
        let p = fund_progress(Some("2020-01-01"), 12, date(2026, 8, 24));
        assert_eq!(p.months_passed, 12);
        assert_eq!(p.percentage, 100);
    }

    #[test]
    fn test_progress_future_start_is_zero() {
        let p = fund_progress(Some("2027-01-01"), 12, date(2026, 8, 24));
        assert_eq!(p.months_passed, 0);
        assert_eq!(p.percentage, 0);
    }

    #[test]
    fn test_progress_fails_soft() {
        assert_eq!(
            fund_progress(None, 12, date(2026, 8, 24)),
            FundProgress { months_passed: 0, percentage: 0 }
        );
        assert_eq!(
            fund_progress(Some("not-a-date"), 12, date(2026, 8, 24)),
            FundProgress { months_passed: 0, percentage: 0 }
        );
        assert_eq!(
            fund_progress(Some("2026-01-01"), 0, date(2026, 8, 24)),
            FundProgress { months_passed: 0, percentage: 0 }
        );
    }

    #[test]
    fn test_auction_reduction_month_one_is_full_rate() {
        let r = auction_reduction(1000.0, 1);
        assert_eq!(r.reduction_pct, 0);
        assert_eq!(r.reduced_monthly, 1000.0);
        assert_eq!(r.discount, 0.0);
    }

    #[test]
    fn test_auction_reduction_month_nine_hits_cap() {
        let r = auction_reduction(1000.0, 9);
        assert_eq!(r.reduction_pct, 40);
        assert_eq!(r.reduced_monthly, 600.0);
        assert_eq!(r.discount, 400.0);
    }

    #[test]
    fn test_auction_reduction_capped_past_month_nine() {
        let r = auction_reduction(1000.0, 20);
        assert_eq!(r.reduction_pct, 40);
        assert_eq!(r.reduced_monthly, 600.0);
    }

    #[test]
    fn test_auction_reduction_intermediate_month() {
        let r = auction_reduction(1000.0, 4);
        assert_eq!(r.reduction_pct, 15);
        assert_eq!(r.reduced_monthly, 850.0);
        assert_eq!(r.discount, 150.0);
    }

    #[test]
    fn test_total_revenue_sums_amounts() {
        let payment = |amount: f64| Payment {
            id: 1,
            member_id: 1,
            member_name: "M".to_string(),
            chit_id: 1,
            chit_name: "F".to_string(),
            month: 1,
            amount,
            payment_date: "2026-08-01".to_string(),
            manager_id: "mgr-1".to_string(),
            created_at: 0,
        };
        let payments = vec![payment(1000.0), payment(500.5), payment(0.01)];
        assert_eq!(total_revenue(&payments), 1500.51);
        assert_eq!(total_revenue(&[]), 0.0);
    }

    #[test]
    fn test_next_receiver_join_order_and_exclusions() {
        let memberships = vec![membership(1), membership(2), membership(3)];

        // Member 1 already received; member 2 paid; member 3 unpaid
        let paid: HashSet<i64> = [1, 2].into_iter().collect();
        let received: HashSet<i64> = [1].into_iter().collect();
        assert_eq!(next_receiver(&memberships, &paid, &received), Some(2));

        // Nobody paid -> none
        assert_eq!(
            next_receiver(&memberships, &HashSet::new(), &HashSet::new()),
            None
        );

        // Everyone paid and received -> none
        let all: HashSet<i64> = [1, 2, 3].into_iter().collect();
        assert_eq!(next_receiver(&memberships, &all, &all), None);
    }
}
