//! Inventory summary computed from the cards currently held.

use crate::models::CardRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Counts and cost of an inventory listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct InventorySummary {
    pub card_count: u32,
    pub complete_count: u32,
    pub incomplete_count: u32,
    /// Sum of acquisition prices of the listed cards
    pub total_acquisition_cost: f64,
    /// Card count per item type ("Raw", "Slabs", ...); blank types under ""
    pub by_item_type: BTreeMap<String, u32>,
    /// Acquisition cost per item type
    pub cost_by_item_type: BTreeMap<String, f64>,
}

impl InventorySummary {
    pub fn from_cards<'a>(cards: impl IntoIterator<Item = &'a CardRecord>) -> Self {
        let mut summary = Self::default();
        for card in cards {
            summary.add(card);
        }
        summary
    }

    fn add(&mut self, card: &CardRecord) {
        self.card_count += 1;
        if card.is_complete {
            self.complete_count += 1;
        } else {
            self.incomplete_count += 1;
        }
        self.total_acquisition_cost += card.acquisition_price;

        let item_type = card.item_type.trim().to_string();
        *self.by_item_type.entry(item_type.clone()).or_insert(0) += 1;
        *self.cost_by_item_type.entry(item_type).or_insert(0.0) += card.acquisition_price;
    }

    /// Mean acquisition price, `None` for an empty inventory.
    pub fn average_cost(&self) -> Option<f64> {
        (self.card_count > 0).then(|| self.total_acquisition_cost / f64::from(self.card_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn card(item_type: &str, price: f64, complete: bool) -> CardRecord {
        CardRecord {
            id: Some(format!("{}-{}", item_type, price)),
            card_name: "Card".to_string(),
            pokemon_name: "Pikachu".to_string(),
            set_name: "Jungle".to_string(),
            set_number: "60".to_string(),
            condition: "Near Mint".to_string(),
            language: "English".to_string(),
            item_type: item_type.to_string(),
            acquisition_price: price,
            date_added: Utc::now(),
            card_image_url: None,
            is_complete: complete,
        }
    }

    #[test]
    fn test_summary_counts_and_costs() {
        let cards = vec![
            card("Raw", 10.0, true),
            card("Raw", 5.0, false),
            card("Slabs", 100.0, true),
        ];

        let summary = InventorySummary::from_cards(&cards);

        assert_eq!(summary.card_count, 3);
        assert_eq!(summary.complete_count, 2);
        assert_eq!(summary.incomplete_count, 1);
        assert_eq!(summary.total_acquisition_cost, 115.0);
        assert_eq!(summary.by_item_type.get("Raw"), Some(&2));
        assert_eq!(summary.cost_by_item_type.get("Slabs"), Some(&100.0));
        assert_eq!(summary.average_cost(), Some(115.0 / 3.0));
    }

    #[test]
    fn test_empty_summary() {
        let summary = InventorySummary::from_cards(&[]);
        assert_eq!(summary.card_count, 0);
        assert_eq!(summary.average_cost(), None);
    }
}
