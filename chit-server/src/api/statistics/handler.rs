//! Statistics API Handlers
//!
//! Derives the manager dashboard from the ledger: everything here is
//! computed from payment rows and fund metadata, never read from the
//! cached totals, so the dashboard doubles as a reconciliation check.

use axum::{
    extract::{Extension, State},
    Json,
};
use serde::Serialize;
use std::collections::HashSet;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{auction, chit_fund, member, membership, payment};
use crate::ledger::accounting::{self, FundProgress};
use crate::ledger::money;
use crate::utils::AppResult;

/// Per-fund dashboard line
#[derive(Debug, Serialize)]
pub struct FundSummary {
    pub chit_id: i64,
    pub name: String,
    pub code: String,
    pub current_month: i64,
    pub current_members: i64,
    pub progress: FundProgress,
    /// Sum of the fund's payment rows
    pub collected: f64,
    /// current_members * monthly_amount * current_month
    pub expected: f64,
    /// max(expected - collected, 0)
    pub dues: f64,
    /// Next member due to receive the pot, by join order
    pub next_receiver: Option<i64>,
}

/// Overview numbers for the manager
#[derive(Debug, Serialize)]
pub struct OverviewStats {
    pub total_revenue: f64,
    pub active_funds: i64,
    pub total_funds: i64,
    pub total_members: i64,
}

/// Full dashboard response
#[derive(Debug, Serialize)]
pub struct StatisticsResponse {
    pub overview: OverviewStats,
    pub funds: Vec<FundSummary>,
}

/// GET /api/statistics - the manager dashboard
pub async fn get_statistics(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<StatisticsResponse>> {
    let funds = chit_fund::find_all_by_manager(&state.pool, &user.id).await?;
    let all_payments = payment::list_by_manager(&state.pool, &user.id).await?;
    let members = member::find_all_by_manager(&state.pool, &user.id).await?;

    let today = chrono::Utc::now().date_naive();
    let mut summaries = Vec::with_capacity(funds.len());

    for fund in &funds {
        let fund_payments: Vec<_> = all_payments
            .iter()
            .filter(|p| p.chit_id == fund.id)
            .cloned()
            .collect();
        let collected = accounting::total_revenue(&fund_payments);

        let expected = money::to_f64(
            money::to_decimal(fund.monthly_amount)
                * rust_decimal::Decimal::from(fund.current_members)
                * rust_decimal::Decimal::from(fund.current_month),
        );
        let dues = money::to_f64(
            (money::to_decimal(expected) - money::to_decimal(collected))
                .max(rust_decimal::Decimal::ZERO),
        );

        let memberships = membership::find_by_chit(&state.pool, fund.id).await?;
        let auctions = auction::list_by_chit(&state.pool, fund.id).await?;
        let paid: HashSet<i64> = fund_payments
            .iter()
            .filter(|p| p.month == fund.current_month)
            .map(|p| p.member_id)
            .collect();
        let receivers: HashSet<i64> = auctions.iter().map(|a| a.member_id).collect();
        let next_receiver = accounting::next_receiver(&memberships, &paid, &receivers);

        summaries.push(FundSummary {
            chit_id: fund.id,
            name: fund.name.clone(),
            code: fund.code.clone(),
            current_month: fund.current_month,
            current_members: fund.current_members,
            progress: accounting::fund_progress(
                fund.start_date.as_deref(),
                fund.duration_months,
                today,
            ),
            collected,
            expected,
            dues,
            next_receiver,
        });
    }

    let overview = OverviewStats {
        total_revenue: accounting::total_revenue(&all_payments),
        active_funds: funds
            .iter()
            .filter(|f| f.status == shared::models::FundStatus::Active)
            .count() as i64,
        total_funds: funds.len() as i64,
        total_members: members.len() as i64,
    };

    Ok(Json(StatisticsResponse {
        overview,
        funds: summaries,
    }))
}
