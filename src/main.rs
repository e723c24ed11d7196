// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! VendorVault inventory report
//!
//! Signs in, loads the inventory (or the cards whose Pokémon name starts
//! with the optional first argument) and logs each card with a summary.
//!
//! Usage: `vendor-vault [name-prefix]`

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vendor_vault::{config::Config, db::FirestoreDb, time_utils::format_utc_rfc3339, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(project = %config.firebase_project_id, "Starting VendorVault report");

    let email = std::env::var("VENDOR_VAULT_EMAIL").map_err(|_| "VENDOR_VAULT_EMAIL not set")?;
    let password =
        std::env::var("VENDOR_VAULT_PASSWORD").map_err(|_| "VENDOR_VAULT_PASSWORD not set")?;
    let prefix = std::env::args().nth(1).unwrap_or_default();

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.firebase_project_id)
        .await
        .expect("Failed to connect to Firestore");

    let state = Arc::new(AppState::new(config, Arc::new(db))?);

    let session = state.identity.sign_in(&email, &password).await?;
    let ctx = session.context();

    let cards = state.cards.search(&ctx, &prefix).await?;
    for card in &cards {
        tracing::info!(
            card_id = card.id.as_deref().unwrap_or_default(),
            pokemon = %card.pokemon_name,
            set = %card.set_name,
            number = %card.set_number,
            condition = %card.condition,
            price = card.acquisition_price,
            complete = card.is_complete,
            added = %format_utc_rfc3339(card.date_added),
            "Card"
        );
    }

    let summary = state.cards.summary().await;
    let totals = state.cards.totals(&ctx).await?;
    tracing::info!(
        cards = summary.card_count,
        complete = summary.complete_count,
        incomplete = summary.incomplete_count,
        inventory_cost = summary.total_acquisition_cost,
        total_card_cost = totals.total_card_cost,
        total_revenue = totals.total_revenue,
        "Inventory summary"
    );

    state.identity.sign_out(session);
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("vendor_vault=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
