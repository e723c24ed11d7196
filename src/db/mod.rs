//! Database layer: the remote document store and its in-memory stand-in.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

use crate::error::AppError;
use crate::models::{CardDocument, UserTotals};
use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::Rng;

/// Collection names as constants.
pub mod collections {
    /// User documents (keyed by uid); carry the running totals
    pub const USERS: &str = "users";
    /// Card sub-collection under each user document
    pub const CARDS: &str = "cards";
}

/// Length of generated document ids (same as Firestore auto-ids).
const DOCUMENT_ID_LEN: usize = 20;

/// Upper-bound sentinel for prefix range queries.
pub const PREFIX_SENTINEL: char = '\u{f8ff}';

/// Card storage, one collection per user.
///
/// Documents returned by reads always carry their id.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Store a new card and add its acquisition price to the user's totals,
    /// both in one atomic write. Returns the new document id.
    async fn create_card(&self, user_id: &str, card: &CardDocument) -> Result<String, AppError>;

    /// Get one card by id.
    async fn get_card(
        &self,
        user_id: &str,
        card_id: &str,
    ) -> Result<Option<CardDocument>, AppError>;

    /// Replace every field of an existing card.
    ///
    /// Fails with `NotFound` if the card does not exist.
    async fn replace_card(
        &self,
        user_id: &str,
        card_id: &str,
        card: &CardDocument,
    ) -> Result<(), AppError>;

    /// Delete a card. Fails with `NotFound` if the card does not exist.
    async fn delete_card(&self, user_id: &str, card_id: &str) -> Result<(), AppError>;

    /// All cards for a user, newest `dateAdded` first.
    ///
    /// Documents that cannot be decoded are skipped with a warning; this and
    /// `cards_in_name_range` only fail when the query itself fails.
    async fn list_cards(&self, user_id: &str) -> Result<Vec<CardDocument>, AppError>;

    /// Cards whose `pokemonNameLower` is in `[lower, upper)`, ordered by that
    /// field.
    async fn cards_in_name_range(
        &self,
        user_id: &str,
        lower: &str,
        upper: &str,
    ) -> Result<Vec<CardDocument>, AppError>;

    /// The user's running totals, if any card was ever saved.
    async fn get_totals(&self, user_id: &str) -> Result<Option<UserTotals>, AppError>;
}

/// Generate a random alphanumeric document id.
pub fn new_document_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(DOCUMENT_ID_LEN)
        .map(char::from)
        .collect()
}

/// Log a stored card that could not be decoded. Listings skip such cards.
pub(crate) fn log_unreadable_card(user_id: &str, card_id: &str, reason: &dyn std::fmt::Display) {
    tracing::warn!(
        user_id,
        card_id,
        error = %reason,
        "Skipping unreadable card document"
    );
}

/// Exclusive upper bound for a prefix range starting at `prefix`.
pub fn prefix_upper_bound(prefix: &str) -> String {
    let mut upper = String::with_capacity(prefix.len() + PREFIX_SENTINEL.len_utf8());
    upper.push_str(prefix);
    upper.push(PREFIX_SENTINEL);
    upper
}
