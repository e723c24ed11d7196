// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Layout:
//! - `users/{uid}`: user document carrying the running totals
//! - `users/{uid}/cards/{cardId}`: one document per card

use crate::db::{collections, log_unreadable_card, new_document_id, DocumentStore};
use crate::error::AppError;
use crate::models::{CardDocument, UserTotals};
use crate::time_utils::{format_utc_rfc3339, store_now};
use async_trait::async_trait;
use firestore::errors::FirestoreError;
use firestore::{
    FirestoreQueryDirection, FirestoreResult, FirestoreWritePrecondition, ParentPathBuilder,
};
use gcloud_sdk::google::firestore::v1::Document;
use serde::{Deserialize, Serialize};

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Store(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| AppError::Store(format!("Failed to connect to Firestore Emulator: {}", e)))?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    pub fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Store("Database not connected (offline mode)".to_string()))
    }

    /// Path of `users/{uid}`, the parent of the user's card collection.
    fn user_path(&self, user_id: &str) -> Result<ParentPathBuilder, AppError> {
        self.get_client()?
            .parent_path(collections::USERS, user_id)
            .map_err(|e| AppError::Store(e.to_string()))
    }

    /// Map a failed card write; a failed `exists` precondition is `NotFound`.
    fn write_error(card_id: &str, e: FirestoreError) -> AppError {
        match e {
            FirestoreError::DataNotFoundError(_) => {
                AppError::NotFound(format!("Card {} not found", card_id))
            }
            e => AppError::Store(e.to_string()),
        }
    }
}

/// Totals field paths; names containing spaces must be backquoted.
mod totals_fields {
    pub const TOTAL_CARD_COST: &str = "`Total Card Cost`";
    pub const COST: &str = "Cost";
    pub const UPDATED_AT: &str = "updatedAt";
}

#[derive(Serialize, Deserialize)]
struct TotalsStamp {
    #[serde(rename = "updatedAt")]
    updated_at: String,
}

/// Decode query results one document at a time.
///
/// Documents that do not map onto a card (left by older clients, or edited
/// by hand) are logged and skipped so they do not hide the rest.
fn decode_cards(user_id: &str, docs: Vec<Document>) -> Vec<CardDocument> {
    docs.into_iter()
        .filter_map(|doc| {
            let card_id = doc.name.rsplit('/').next().unwrap_or_default().to_string();
            match firestore::FirestoreDb::deserialize_doc_to::<CardDocument>(&doc) {
                Ok(mut card) => {
                    if card.id.is_none() {
                        card.id = Some(card_id);
                    }
                    Some(card)
                }
                Err(e) => {
                    log_unreadable_card(user_id, &card_id, &e);
                    None
                }
            }
        })
        .collect()
}

#[async_trait]
impl DocumentStore for FirestoreDb {
    // ─── Card Writes ─────────────────────────────────────────────

    /// Store the card and bump the user's totals in one transaction, so a
    /// failed commit leaves neither behind.
    ///
    /// The totals are raised with server-side increments rather than a
    /// read-modify-write, so concurrent creates cannot lose each other's
    /// price. Only the totals fields of `users/{uid}` are written.
    async fn create_card(&self, user_id: &str, card: &CardDocument) -> Result<String, AppError> {
        let client = self.get_client()?;
        let parent = self.user_path(user_id)?;
        let card_id = new_document_id();
        let now = format_utc_rfc3339(store_now());
        let price = card.acquisition_price;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Store(format!("Failed to begin transaction: {}", e)))?;

        // 1. Card document
        client
            .fluent()
            .update()
            .in_col(collections::CARDS)
            .document_id(&card_id)
            .parent(&parent)
            .object(card)
            .add_to_transaction(&mut transaction)
            .map_err(|e| AppError::Store(format!("Failed to add card to transaction: {}", e)))?;

        // 2. Timestamp on the user document (masked; other fields untouched)
        client
            .fluent()
            .update()
            .fields([totals_fields::UPDATED_AT])
            .in_col(collections::USERS)
            .document_id(user_id)
            .object(&TotalsStamp { updated_at: now.clone() })
            .add_to_transaction(&mut transaction)
            .map_err(|e| AppError::Store(format!("Failed to add totals to transaction: {}", e)))?;

        // 3. Increment the running totals
        client
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(user_id)
            .transforms(|t| {
                t.fields([
                    t.field(totals_fields::TOTAL_CARD_COST).increment(price),
                    t.field(totals_fields::COST).increment(price),
                ])
            })
            .only_transform()
            .add_to_transaction(&mut transaction)
            .map_err(|e| AppError::Store(format!("Failed to add increments to transaction: {}", e)))?;

        // 4. Commit atomically
        transaction
            .commit()
            .await
            .map_err(|e| AppError::Store(format!("Transaction commit failed: {}", e)))?;

        tracing::info!(user_id, card_id = %card_id, price, "Card stored");

        Ok(card_id)
    }

    async fn replace_card(
        &self,
        user_id: &str,
        card_id: &str,
        card: &CardDocument,
    ) -> Result<(), AppError> {
        let parent = self.user_path(user_id)?;
        // The precondition keeps a replace from recreating a deleted card.
        let result: FirestoreResult<()> = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::CARDS)
            .precondition(FirestoreWritePrecondition::Exists(true))
            .document_id(card_id)
            .parent(&parent)
            .object(card)
            .execute()
            .await;
        result.map_err(|e| Self::write_error(card_id, e))
    }

    async fn delete_card(&self, user_id: &str, card_id: &str) -> Result<(), AppError> {
        let parent = self.user_path(user_id)?;
        // Without the precondition a delete of a missing document succeeds.
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::CARDS)
            .document_id(card_id)
            .parent(&parent)
            .precondition(FirestoreWritePrecondition::Exists(true))
            .execute()
            .await
            .map_err(|e| Self::write_error(card_id, e))
    }

    // ─── Card Reads ──────────────────────────────────────────────

    async fn get_card(
        &self,
        user_id: &str,
        card_id: &str,
    ) -> Result<Option<CardDocument>, AppError> {
        let parent = self.user_path(user_id)?;
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::CARDS)
            .parent(&parent)
            .obj()
            .one(card_id)
            .await
            .map_err(|e| AppError::Store(e.to_string()))
    }

    async fn list_cards(&self, user_id: &str) -> Result<Vec<CardDocument>, AppError> {
        let parent = self.user_path(user_id)?;
        let docs = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::CARDS)
            .parent(&parent)
            .order_by([("dateAdded", FirestoreQueryDirection::Descending)])
            .query()
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;
        Ok(decode_cards(user_id, docs))
    }

    async fn cards_in_name_range(
        &self,
        user_id: &str,
        lower: &str,
        upper: &str,
    ) -> Result<Vec<CardDocument>, AppError> {
        let parent = self.user_path(user_id)?;
        let lower = lower.to_string();
        let upper = upper.to_string();

        let docs = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::CARDS)
            .parent(&parent)
            .filter(move |q| {
                q.for_all([
                    q.field("pokemonNameLower")
                        .greater_than_or_equal(lower.clone()),
                    q.field("pokemonNameLower").less_than(upper.clone()),
                ])
            })
            .query()
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;
        Ok(decode_cards(user_id, docs))
    }

    // ─── Totals ──────────────────────────────────────────────────

    async fn get_totals(&self, user_id: &str) -> Result<Option<UserTotals>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Store(e.to_string()))
    }
}
