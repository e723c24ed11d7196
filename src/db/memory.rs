//! In-process document store with the same semantics as the Firestore layout.
//!
//! Used for tests and offline runs.

use crate::db::{log_unreadable_card, new_document_id, DocumentStore};
use crate::error::AppError;
use crate::models::{CardDocument, UserTotals};
use crate::time_utils::{format_utc_rfc3339, store_now};
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;

#[derive(Debug, Clone)]
enum StoredCard {
    Card(CardDocument),
    /// A document that does not decode as a card, with the decode error
    Unreadable(String),
}

#[derive(Debug, Default, Clone)]
struct UserData {
    cards: HashMap<String, StoredCard>,
    totals: Option<UserTotals>,
}

impl UserData {
    /// Readable cards passing `keep`, with ids; unreadable ones are logged.
    fn readable_cards(
        &self,
        user_id: &str,
        keep: impl Fn(&CardDocument) -> bool,
    ) -> Vec<CardDocument> {
        self.cards
            .iter()
            .filter_map(|(id, stored)| match stored {
                StoredCard::Card(doc) if keep(doc) => Some(MemoryStore::with_id(id, doc)),
                StoredCard::Card(_) => None,
                StoredCard::Unreadable(reason) => {
                    log_unreadable_card(user_id, id, reason);
                    None
                }
            })
            .collect()
    }
}

/// Document store kept in memory, keyed by user id.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: DashMap<String, UserData>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cards stored for a user.
    pub fn card_count(&self, user_id: &str) -> usize {
        self.users
            .get(user_id)
            .map(|data| data.cards.len())
            .unwrap_or(0)
    }

    /// Store a document under `card_id` that will not decode as a card, as
    /// an older client or a hand edit might leave behind.
    pub fn insert_unreadable(&self, user_id: &str, card_id: &str, reason: &str) {
        self.users
            .entry(user_id.to_string())
            .or_default()
            .cards
            .insert(card_id.to_string(), StoredCard::Unreadable(reason.to_string()));
    }

    fn with_id(id: &str, doc: &CardDocument) -> CardDocument {
        let mut doc = doc.clone();
        doc.id = Some(id.to_string());
        doc
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create_card(&self, user_id: &str, card: &CardDocument) -> Result<String, AppError> {
        let card_id = new_document_id();
        let now = format_utc_rfc3339(store_now());

        let mut data = self.users.entry(user_id.to_string()).or_default();
        let mut stored = card.clone();
        stored.id = None;
        data.cards.insert(card_id.clone(), StoredCard::Card(stored));
        data.totals
            .get_or_insert_with(UserTotals::default)
            .record_purchase(card.acquisition_price, &now);

        tracing::debug!(user_id, card_id = %card_id, "Card stored in memory");
        Ok(card_id)
    }

    async fn get_card(
        &self,
        user_id: &str,
        card_id: &str,
    ) -> Result<Option<CardDocument>, AppError> {
        let Some(data) = self.users.get(user_id) else {
            return Ok(None);
        };
        match data.cards.get(card_id) {
            None => Ok(None),
            Some(StoredCard::Card(doc)) => Ok(Some(Self::with_id(card_id, doc))),
            Some(StoredCard::Unreadable(reason)) => Err(AppError::Store(format!(
                "Card {} could not be decoded: {}",
                card_id, reason
            ))),
        }
    }

    async fn replace_card(
        &self,
        user_id: &str,
        card_id: &str,
        card: &CardDocument,
    ) -> Result<(), AppError> {
        let mut data = self
            .users
            .get_mut(user_id)
            .ok_or_else(|| AppError::NotFound(format!("Card {} not found", card_id)))?;
        let slot = data
            .cards
            .get_mut(card_id)
            .ok_or_else(|| AppError::NotFound(format!("Card {} not found", card_id)))?;

        let mut stored = card.clone();
        stored.id = None;
        *slot = StoredCard::Card(stored);
        Ok(())
    }

    async fn delete_card(&self, user_id: &str, card_id: &str) -> Result<(), AppError> {
        self.users
            .get_mut(user_id)
            .and_then(|mut data| data.cards.remove(card_id))
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Card {} not found", card_id)))
    }

    async fn list_cards(&self, user_id: &str) -> Result<Vec<CardDocument>, AppError> {
        let mut cards = match self.users.get(user_id) {
            Some(data) => data.readable_cards(user_id, |_| true),
            None => return Ok(Vec::new()),
        };

        cards.sort_by(|a, b| b.date_added.cmp(&a.date_added).then_with(|| a.id.cmp(&b.id)));
        Ok(cards)
    }

    async fn cards_in_name_range(
        &self,
        user_id: &str,
        lower: &str,
        upper: &str,
    ) -> Result<Vec<CardDocument>, AppError> {
        let mut cards = match self.users.get(user_id) {
            Some(data) => data.readable_cards(user_id, |doc| {
                let key = doc.pokemon_name_lower.as_str();
                key >= lower && key < upper
            }),
            None => return Ok(Vec::new()),
        };

        // Firestore orders range results by the filtered field, then by id.
        cards.sort_by(|a, b| {
            a.pokemon_name_lower
                .cmp(&b.pokemon_name_lower)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(cards)
    }

    async fn get_totals(&self, user_id: &str) -> Result<Option<UserTotals>, AppError> {
        Ok(self.users.get(user_id).and_then(|data| data.totals.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::prefix_upper_bound;
    use chrono::{Duration, TimeZone, Utc};

    fn doc(name: &str, minutes: i64, price: f64) -> CardDocument {
        CardDocument {
            id: None,
            acquisition_price: price,
            card_name: format!("{} card", name),
            condition: "Near Mint".to_string(),
            date_added: Utc.with_ymd_and_hms(2025, 7, 20, 0, 0, 0).unwrap()
                + Duration::minutes(minutes),
            item_type: "Raw".to_string(),
            language: "English".to_string(),
            pokemon_name: name.to_string(),
            pokemon_name_lower: name.to_lowercase(),
            set_name: "Base Set".to_string(),
            set_number: 1,
            is_complete: true,
            card_image_url: None,
        }
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let store = MemoryStore::new();
        store.create_card("u1", &doc("Old", 0, 1.0)).await.unwrap();
        store.create_card("u1", &doc("New", 10, 1.0)).await.unwrap();
        store.create_card("u1", &doc("Mid", 5, 1.0)).await.unwrap();

        let names: Vec<String> = store
            .list_cards("u1")
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.pokemon_name)
            .collect();

        assert_eq!(names, vec!["New", "Mid", "Old"]);
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let store = MemoryStore::new();
        let id = store.create_card("u1", &doc("Pikachu", 0, 1.0)).await.unwrap();

        assert!(store.get_card("u2", &id).await.unwrap().is_none());
        assert!(store.list_cards("u2").await.unwrap().is_empty());
        assert!(matches!(
            store.delete_card("u2", &id).await,
            Err(AppError::NotFound(_))
        ));
        assert_eq!(store.card_count("u1"), 1);
    }

    #[tokio::test]
    async fn test_range_query_orders_by_name() {
        let store = MemoryStore::new();
        for name in ["Charmander", "Squirtle", "Charizard", "Chansey"] {
            store.create_card("u1", &doc(name, 0, 1.0)).await.unwrap();
        }

        let found: Vec<String> = store
            .cards_in_name_range("u1", "char", &prefix_upper_bound("char"))
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.pokemon_name)
            .collect();

        assert_eq!(found, vec!["Charizard", "Charmander"]);
    }

    #[tokio::test]
    async fn test_create_accumulates_totals() {
        let store = MemoryStore::new();
        store.create_card("u1", &doc("A", 0, 2.5)).await.unwrap();
        store.create_card("u1", &doc("B", 0, 7.5)).await.unwrap();

        let totals = store.get_totals("u1").await.unwrap().unwrap();
        assert_eq!(totals.total_card_cost, 10.0);
        assert!(store.get_totals("u2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unreadable_documents_are_skipped() {
        let store = MemoryStore::new();
        store.create_card("u1", &doc("Charizard", 0, 1.0)).await.unwrap();
        store.insert_unreadable("u1", "legacy", "invalid type: string \"4/102\", expected i64");

        let listed = store.list_cards("u1").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].pokemon_name, "Charizard");

        let found = store
            .cards_in_name_range("u1", "char", &prefix_upper_bound("char"))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);

        assert!(matches!(
            store.get_card("u1", "legacy").await,
            Err(AppError::Store(_))
        ));
        // Still a document: it can be deleted.
        store.delete_card("u1", "legacy").await.unwrap();
    }

    #[tokio::test]
    async fn test_replace_missing_card_is_not_found() {
        let store = MemoryStore::new();
        store.create_card("u1", &doc("A", 0, 1.0)).await.unwrap();

        let result = store.replace_card("u1", "missing", &doc("B", 0, 1.0)).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
