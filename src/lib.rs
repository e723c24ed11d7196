// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! VendorVault: trading-card inventory for vendors
//!
//! This crate provides the card repository (validation, completeness
//! derivation, Firestore persistence) and the reference-data and identity
//! clients that a presentation layer calls on user action.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod time_utils;

use config::Config;
use db::DocumentStore;
use error::Result;
use models::{CardLookup, CardQuery, CardRecord, UserContext};
use services::{CardRepository, Debouncer, IdentityClient, ReferenceDataClient};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub cards: CardRepository,
    pub reference: ReferenceDataClient,
    pub identity: IdentityClient,
    search_debouncer: Debouncer,
    lookup_debouncer: Debouncer,
}

impl AppState {
    /// Build the state around a document store.
    pub fn new(config: Config, store: Arc<dyn DocumentStore>) -> anyhow::Result<Self> {
        Ok(Self {
            cards: CardRepository::new(store),
            reference: ReferenceDataClient::new(&config)?,
            identity: IdentityClient::new(&config)?,
            search_debouncer: Debouncer::new(config.search_debounce),
            lookup_debouncer: Debouncer::new(config.search_debounce),
            config,
        })
    }

    /// Search as the user types: runs `search` once typing pauses and hands
    /// the result to `on_done`. Earlier pending searches are dropped.
    pub fn schedule_search<F>(self: &Arc<Self>, ctx: UserContext, text: String, on_done: F)
    where
        F: FnOnce(Result<Vec<CardRecord>>) + Send + 'static,
    {
        let state = Arc::clone(self);
        self.search_debouncer.schedule(async move {
            let result = state.cards.search(&ctx, &text).await;
            on_done(result);
        });
    }

    /// Look up a card's number and image once the user stops editing the
    /// name and set fields. `on_done` gets `None` when nothing was found.
    pub fn schedule_card_lookup<F>(self: &Arc<Self>, query: CardQuery, on_done: F)
    where
        F: FnOnce(Option<CardLookup>) + Send + 'static,
    {
        let state = Arc::clone(self);
        self.lookup_debouncer.schedule(async move {
            let lookup = state.reference.lookup_card(&query).await;
            on_done(lookup);
        });
    }
}
