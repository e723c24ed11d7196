//! Per-user running cost aggregate.
//!
//! The aggregate lives on the user document itself (`users/{uid}`) and is
//! written in the same transaction as each new card.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Running totals for a user.
///
/// Stored at: `users/{uid}`
///
/// Only ever increased: deleting or repricing a card leaves the totals as
/// they were, so `total_card_cost` is lifetime acquisition spend rather than
/// the cost of what is currently held.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserTotals {
    /// Sum of every saved card's acquisition price
    #[serde(rename = "Total Card Cost", default)]
    pub total_card_cost: f64,
    /// Revenue from sales (no sales flow writes this yet)
    #[serde(rename = "Total Revenue", default)]
    pub total_revenue: f64,
    /// Running cost, incremented alongside `Total Card Cost`
    #[serde(rename = "Cost", default)]
    pub cost: f64,
    /// Last update timestamp (ISO 8601)
    #[serde(rename = "updatedAt", default)]
    pub updated_at: String,
}

impl UserTotals {
    /// Add a newly saved card's price.
    pub fn record_purchase(&mut self, price: f64, now: &str) {
        self.total_card_cost += price;
        self.cost += price;
        self.updated_at = now.to_string();
    }

    /// Revenue minus total card cost.
    pub fn net(&self) -> f64 {
        self.total_revenue - self.total_card_cost
    }
}
