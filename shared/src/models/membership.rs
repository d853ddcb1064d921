//! Membership Model
//!
//! Join table between chit funds and members. The membership table is
//! the source of truth for "who is in which fund"; fund.current_members
//! and member.active_chits are caches over it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum MembershipStatus {
    Pending,
    Approved,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Membership {
    pub id: i64,
    pub chit_id: i64,
    pub member_id: i64,
    // Denormalized for display
    pub chit_name: String,
    pub chit_code: String,
    pub member_name: String,
    pub manager_id: String,
    pub status: MembershipStatus,
    /// Sum of this member's payments into this fund
    pub total_paid: f64,
    pub joined_at: i64,
}
