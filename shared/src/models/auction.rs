//! Auction Model
//!
//! The month's bidding winner and the resulting reduced contribution
//! rate. Auction rows are informational history; recording one never
//! mutates fund or member caches.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Auction {
    pub id: i64,
    pub chit_id: i64,
    pub chit_name: String,
    pub member_id: i64,
    pub member_name: String,
    pub month: i64,
    /// Payout given to the winning bidder
    pub amount_taken: f64,
    /// Post-discount monthly contribution from this month on
    pub monthly_amount: f64,
    /// fund.monthly_amount - monthly_amount
    pub discount: f64,
    pub manager_id: String,
    /// ISO date (YYYY-MM-DD)
    pub auction_date: String,
    pub created_at: i64,
}

/// Record auction payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuctionCreate {
    pub chit_id: i64,
    pub member_id: i64,
    pub month: i64,
    pub amount_taken: f64,
    /// Defaults to today when omitted
    pub auction_date: Option<String>,
}
