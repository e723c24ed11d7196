// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use vendor_vault::db::{DocumentStore, FirestoreDb, MemoryStore};
use vendor_vault::error::AppError;
use vendor_vault::models::{CardDocument, CardFormInput, UserContext, UserTotals};
use vendor_vault::services::CardRepository;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Generate a unique user ID for test isolation.
#[allow(dead_code)]
pub fn unique_user_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("test-user-{}", nanos)
}

/// Repository over a fresh in-memory store.
/// Returns the repository and the store for direct inspection.
#[allow(dead_code)]
pub fn memory_repo() -> (CardRepository, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (CardRepository::new(store.clone()), store)
}

#[allow(dead_code)]
pub fn vendor() -> UserContext {
    UserContext::authenticated("vendor-1")
}

/// Form for a complete card.
#[allow(dead_code)]
pub fn card_form(pokemon_name: &str, price: &str) -> CardFormInput {
    CardFormInput {
        card_name: format!("Base Set {}", pokemon_name),
        pokemon_name: pokemon_name.to_string(),
        set_name: "Base Set".to_string(),
        set_number: "4".to_string(),
        condition: "Near Mint".to_string(),
        language: "English".to_string(),
        item_type: "Raw".to_string(),
        acquisition_price: price.to_string(),
        card_image_url: None,
    }
}

/// Store wrapper that can be switched into failing every call, or only
/// full listings.
#[allow(dead_code)]
pub struct FlakyStore {
    inner: MemoryStore,
    failing: AtomicBool,
    failing_list: AtomicBool,
}

#[allow(dead_code)]
impl FlakyStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            failing: AtomicBool::new(false),
            failing_list: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_failing_list(&self, failing: bool) {
        self.failing_list.store(failing, Ordering::SeqCst);
    }

    pub fn card_count(&self, user_id: &str) -> usize {
        self.inner.card_count(user_id)
    }

    fn check(&self) -> Result<(), AppError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Store("unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn create_card(&self, user_id: &str, card: &CardDocument) -> Result<String, AppError> {
        self.check()?;
        self.inner.create_card(user_id, card).await
    }

    async fn get_card(
        &self,
        user_id: &str,
        card_id: &str,
    ) -> Result<Option<CardDocument>, AppError> {
        self.check()?;
        self.inner.get_card(user_id, card_id).await
    }

    async fn replace_card(
        &self,
        user_id: &str,
        card_id: &str,
        card: &CardDocument,
    ) -> Result<(), AppError> {
        self.check()?;
        self.inner.replace_card(user_id, card_id, card).await
    }

    async fn delete_card(&self, user_id: &str, card_id: &str) -> Result<(), AppError> {
        self.check()?;
        self.inner.delete_card(user_id, card_id).await
    }

    async fn list_cards(&self, user_id: &str) -> Result<Vec<CardDocument>, AppError> {
        self.check()?;
        if self.failing_list.load(Ordering::SeqCst) {
            return Err(AppError::Store("listing unavailable".to_string()));
        }
        self.inner.list_cards(user_id).await
    }

    async fn cards_in_name_range(
        &self,
        user_id: &str,
        lower: &str,
        upper: &str,
    ) -> Result<Vec<CardDocument>, AppError> {
        self.check()?;
        self.inner.cards_in_name_range(user_id, lower, upper).await
    }

    async fn get_totals(&self, user_id: &str) -> Result<Option<UserTotals>, AppError> {
        self.check()?;
        self.inner.get_totals(user_id).await
    }
}
