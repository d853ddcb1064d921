//! Ledger accounting
//!
//! Pure derivation functions over fund/payment/auction records. Nothing
//! in this module touches the store; repositories and the statistics API
//! call into it with already-loaded rows.

pub mod accounting;
pub mod money;

pub use accounting::{
    auction_reduction, fund_progress, next_receiver, total_revenue, AuctionReduction,
    FundProgress,
};
pub use money::{monthly_amount, money_eq, to_decimal, to_f64, MONEY_TOLERANCE};
