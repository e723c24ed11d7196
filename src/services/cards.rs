// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Card repository: validation, derived fields and the in-memory mirror.
//!
//! Every operation either fully succeeds (the change is visible in both the
//! store and the mirror) or fails without touching either. Nothing retries.

use crate::db::{prefix_upper_bound, DocumentStore};
use crate::error::{AppError, Result};
use crate::models::{CardFormInput, CardRecord, InventorySummary, UserContext, UserTotals};
use crate::time_utils::store_now;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Card operations for the presentation layer.
pub struct CardRepository {
    store: Arc<dyn DocumentStore>,
    /// Last listing shown to the user, newest first (or search order)
    mirror: RwLock<Vec<CardRecord>>,
}

impl CardRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            mirror: RwLock::new(Vec::new()),
        }
    }

    // ─── Writes ──────────────────────────────────────────────────

    /// Validate a form, store the card and add it to the mirror.
    ///
    /// The store also adds the price to the user's running totals.
    pub async fn create(&self, ctx: &UserContext, input: CardFormInput) -> Result<CardRecord> {
        let user_id = ctx.require_user()?;
        let record = input.into_record(store_now())?;
        let doc = record.to_document();

        let card_id = self.store.create_card(user_id, &doc).await?;

        let mut stored = doc.into_record();
        stored.id = Some(card_id.clone());

        let mut mirror = self.mirror.write().await;
        let position = mirror.partition_point(|c| c.date_added > stored.date_added);
        mirror.insert(position, stored.clone());

        tracing::info!(
            user_id,
            card_id = %card_id,
            is_complete = stored.is_complete,
            "Card created"
        );
        Ok(stored)
    }

    /// Replace every field of a stored card except its id and `date_added`.
    ///
    /// The caller's `date_added` is ignored; the stored one is kept.
    pub async fn update(&self, ctx: &UserContext, mut record: CardRecord) -> Result<CardRecord> {
        let user_id = ctx.require_user()?;
        let card_id = record
            .id
            .clone()
            .ok_or_else(|| AppError::NotFound("Card has never been saved".to_string()))?;
        record.normalize();
        record.validate_for_store()?;

        let existing = self
            .store
            .get_card(user_id, &card_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Card {} not found", card_id)))?;

        let mut updated = record;
        updated.date_added = existing.date_added;
        let doc = updated.to_document();

        self.store.replace_card(user_id, &card_id, &doc).await?;
        let stored = doc.into_record();

        tracing::info!(
            user_id,
            card_id = %card_id,
            is_complete = stored.is_complete,
            "Card updated"
        );

        // The write is done; a failed reload must not report the update as failed.
        if let Err(e) = self.list(ctx).await {
            tracing::warn!(error = %e, "Reload after update failed, patching mirror");
            let mut mirror = self.mirror.write().await;
            if let Some(slot) = mirror.iter_mut().find(|c| c.id == stored.id) {
                *slot = stored.clone();
            }
        }

        Ok(stored)
    }

    /// Parse form values and apply them to the stored card `card_id`.
    pub async fn update_from_form(
        &self,
        ctx: &UserContext,
        card_id: &str,
        input: CardFormInput,
    ) -> Result<CardRecord> {
        ctx.require_user()?;
        // The date is a placeholder; update keeps the stored one.
        let mut record = input.into_record(store_now())?;
        record.id = Some(card_id.to_string());
        self.update(ctx, record).await
    }

    /// Delete a card from the store, then from the mirror.
    pub async fn delete(&self, ctx: &UserContext, card_id: &str) -> Result<()> {
        let user_id = ctx.require_user()?;
        self.store.delete_card(user_id, card_id).await?;

        let mut mirror = self.mirror.write().await;
        let before = mirror.len();
        mirror.retain(|c| c.id.as_deref() != Some(card_id));

        tracing::info!(
            user_id,
            card_id,
            removed_from_mirror = before - mirror.len(),
            "Card deleted"
        );
        Ok(())
    }

    // ─── Reads ───────────────────────────────────────────────────

    /// Fetch one card.
    pub async fn get(&self, ctx: &UserContext, card_id: &str) -> Result<CardRecord> {
        let user_id = ctx.require_user()?;
        self.store
            .get_card(user_id, card_id)
            .await?
            .map(|doc| doc.into_record())
            .ok_or_else(|| AppError::NotFound(format!("Card {} not found", card_id)))
    }

    /// Reload every card for the user, newest first, into the mirror.
    ///
    /// Anonymous callers get an empty list and an empty mirror.
    pub async fn list(&self, ctx: &UserContext) -> Result<Vec<CardRecord>> {
        let Some(user_id) = ctx.user_id() else {
            self.mirror.write().await.clear();
            return Ok(Vec::new());
        };

        let records: Vec<CardRecord> = self
            .store
            .list_cards(user_id)
            .await?
            .into_iter()
            .map(|doc| doc.into_record())
            .collect();

        tracing::debug!(user_id, count = records.len(), "Cards loaded");
        *self.mirror.write().await = records.clone();
        Ok(records)
    }

    /// Cards whose Pokémon name starts with `prefix`, ignoring case.
    ///
    /// A prefix match, not containment: "char" finds "Charizard" but not
    /// "Pikachu". An empty prefix reloads everything.
    pub async fn search(&self, ctx: &UserContext, prefix: &str) -> Result<Vec<CardRecord>> {
        if prefix.is_empty() {
            return self.list(ctx).await;
        }
        let Some(user_id) = ctx.user_id() else {
            self.mirror.write().await.clear();
            return Ok(Vec::new());
        };

        let lower = prefix.to_lowercase();
        let upper = prefix_upper_bound(&lower);
        let records: Vec<CardRecord> = self
            .store
            .cards_in_name_range(user_id, &lower, &upper)
            .await?
            .into_iter()
            .map(|doc| doc.into_record())
            .collect();

        tracing::debug!(user_id, prefix, count = records.len(), "Card search");
        *self.mirror.write().await = records.clone();
        Ok(records)
    }

    /// The user's running totals; zero when nothing was ever saved.
    pub async fn totals(&self, ctx: &UserContext) -> Result<UserTotals> {
        let user_id = ctx.require_user()?;
        Ok(self.store.get_totals(user_id).await?.unwrap_or_default())
    }

    /// Snapshot of the mirror.
    pub async fn cards(&self) -> Vec<CardRecord> {
        self.mirror.read().await.clone()
    }

    /// Summary of the cards currently in the mirror.
    pub async fn summary(&self) -> InventorySummary {
        InventorySummary::from_cards(self.mirror.read().await.iter())
    }
}
