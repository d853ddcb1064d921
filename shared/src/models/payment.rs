//! Payment Model
//!
//! One member's contribution for one month of one fund. Payment rows are
//! the ledger; member.total_paid and membership.total_paid must always
//! equal the sum of matching rows.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: i64,
    pub member_id: i64,
    pub member_name: String,
    pub chit_id: i64,
    pub chit_name: String,
    /// 1..=fund.duration_months
    pub month: i64,
    pub amount: f64,
    /// ISO date (YYYY-MM-DD)
    pub payment_date: String,
    pub manager_id: String,
    pub created_at: i64,
}

/// Record payment payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCreate {
    pub member_id: i64,
    pub chit_id: i64,
    pub month: i64,
    pub amount: f64,
    /// Defaults to today when omitted
    pub payment_date: Option<String>,
}

/// Edit payment payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentUpdate {
    pub month: Option<i64>,
    pub amount: Option<f64>,
    pub payment_date: Option<String>,
}
