//! Chit Fund Model

use serde::{Deserialize, Serialize};

/// Fund variant: auction funds reduce the monthly contribution as the
/// months proceed, friendship funds pay out a fixed pot by rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum FundType {
    Auction,
    Friendship,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum FundStatus {
    Active,
    Closed,
}

/// Chit fund entity
///
/// `current_members` is a denormalized count of memberships and
/// `monthly_amount` is derived from total/duration; both are kept in
/// sync transactionally by the repositories.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ChitFund {
    pub id: i64,
    pub name: String,
    /// Unique human-enterable join code
    pub code: String,
    pub fund_type: FundType,
    pub total_amount: f64,
    pub duration_months: i64,
    pub monthly_amount: f64,
    /// ISO date (YYYY-MM-DD); optional, progress reads fail soft
    pub start_date: Option<String>,
    pub manager_id: String,
    /// 1..=duration_months, never decreases
    pub current_month: i64,
    pub current_members: i64,
    pub status: FundStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create chit fund payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChitFundCreate {
    pub name: String,
    /// Omitted => a code is generated server-side
    pub code: Option<String>,
    pub fund_type: FundType,
    pub total_amount: f64,
    pub duration_months: i64,
    pub start_date: Option<String>,
}

/// Update chit fund payload (code is immutable after create)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChitFundUpdate {
    pub name: Option<String>,
    pub fund_type: Option<FundType>,
    pub total_amount: Option<f64>,
    pub duration_months: Option<i64>,
    pub start_date: Option<String>,
    pub status: Option<FundStatus>,
}
