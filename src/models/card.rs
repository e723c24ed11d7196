// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Card record model, form input and the persisted document shape.

use crate::error::{AppError, Result};
use crate::models::reference::CardLookup;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::{Validate, ValidationError};

/// Default card language offered by the form.
pub const DEFAULT_LANGUAGE: &str = "English";

/// Languages cards are printed in, used to seed the language picker.
///
/// The stored field stays free-form; this list only provides choices.
pub const CARD_LANGUAGES: &[&str] = &[
    "Chinese (Simplified)",
    "Chinese (Traditional)",
    "Dutch",
    "English",
    "French",
    "German",
    "Indonesian",
    "Italian",
    "Japanese",
    "Korean",
    "Polish",
    "Portuguese",
    "Russian",
    "Spanish",
    "Thai",
];

/// Physical condition grade of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    #[serde(rename = "Gem Mint")]
    GemMint,
    #[serde(rename = "Near Mint")]
    NearMint,
    #[serde(rename = "Lightly Played")]
    LightlyPlayed,
    #[serde(rename = "Moderately Played")]
    ModeratelyPlayed,
    #[serde(rename = "Heavily Played")]
    HeavilyPlayed,
    #[serde(rename = "Damaged")]
    Damaged,
}

impl Condition {
    pub const ALL: [Condition; 6] = [
        Condition::GemMint,
        Condition::NearMint,
        Condition::LightlyPlayed,
        Condition::ModeratelyPlayed,
        Condition::HeavilyPlayed,
        Condition::Damaged,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::GemMint => "Gem Mint",
            Condition::NearMint => "Near Mint",
            Condition::LightlyPlayed => "Lightly Played",
            Condition::ModeratelyPlayed => "Moderately Played",
            Condition::HeavilyPlayed => "Heavily Played",
            Condition::Damaged => "Damaged",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Condition {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        Condition::ALL
            .into_iter()
            .find(|c| c.as_str() == s.trim())
            .ok_or_else(|| AppError::Validation(format!("Unknown condition: {}", s)))
    }
}

/// Kind of inventory item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemType {
    Sealed,
    Slabs,
    Raw,
    Other,
}

impl ItemType {
    pub const ALL: [ItemType; 4] = [
        ItemType::Sealed,
        ItemType::Slabs,
        ItemType::Raw,
        ItemType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Sealed => "Sealed",
            ItemType::Slabs => "Slabs",
            ItemType::Raw => "Raw",
            ItemType::Other => "Other",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        ItemType::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| AppError::Validation(format!("Unknown item type: {}", s)))
    }
}

/// One catalogued physical item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CardRecord {
    /// Store-assigned document id (None until first persisted)
    pub id: Option<String>,
    pub card_name: String,
    pub pokemon_name: String,
    pub set_name: String,
    /// Set number; records read from the store carry the normalized integer
    pub set_number: String,
    pub condition: String,
    pub language: String,
    pub item_type: String,
    pub acquisition_price: f64,
    /// When the card was first saved (never changed by updates)
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub date_added: DateTime<Utc>,
    #[serde(rename = "cardImageURL")]
    pub card_image_url: Option<String>,
    /// Derived on every write, see [`is_complete`]
    pub is_complete: bool,
}

impl CardRecord {
    /// Trim every text field and drop a blank image URL, then recompute
    /// completeness. Every write path goes through this, so the stored
    /// name and its search key never carry stray whitespace.
    pub fn normalize(&mut self) {
        for field in [
            &mut self.card_name,
            &mut self.pokemon_name,
            &mut self.set_name,
            &mut self.set_number,
            &mut self.condition,
            &mut self.language,
            &mut self.item_type,
        ] {
            let trimmed = field.trim();
            if trimmed.len() != field.len() {
                *field = trimmed.to_string();
            }
        }
        self.card_image_url = self
            .card_image_url
            .take()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());
        self.refresh_completeness();
    }

    /// Recompute the completeness flag from the current field values.
    pub fn refresh_completeness(&mut self) {
        self.is_complete = is_complete(self);
    }

    /// Check the rules a record must satisfy before it may reach the store.
    pub fn validate_for_store(&self) -> Result<()> {
        require_not_blank("pokemonName", &self.pokemon_name)?;
        require_not_blank("setName", &self.set_name)?;
        if !self.acquisition_price.is_finite() || self.acquisition_price < 0.0 {
            return Err(AppError::Validation(format!(
                "acquisitionPrice: must be a non-negative amount, got {}",
                self.acquisition_price
            )));
        }
        check_choice::<Condition>(&self.condition)?;
        check_choice::<ItemType>(&self.item_type)?;
        Ok(())
    }

    /// Build the persisted document for this record.
    pub fn to_document(&self) -> CardDocument {
        CardDocument {
            id: self.id.clone(),
            acquisition_price: self.acquisition_price,
            card_name: self.card_name.clone(),
            condition: self.condition.clone(),
            date_added: self.date_added,
            item_type: self.item_type.clone(),
            language: self.language.clone(),
            pokemon_name: self.pokemon_name.clone(),
            pokemon_name_lower: self.pokemon_name.to_lowercase(),
            set_name: self.set_name.clone(),
            set_number: normalize_set_number(&self.set_number),
            is_complete: is_complete(self),
            card_image_url: self.card_image_url.clone(),
        }
    }
}

/// Fields a completeness check looks at, as entered.
fn completeness_fields(record: &CardRecord) -> [&str; 7] {
    [
        &record.card_name,
        &record.pokemon_name,
        &record.set_name,
        &record.set_number,
        &record.condition,
        &record.language,
        &record.item_type,
    ]
}

/// Whether every descriptive field is filled in and the set number is positive.
///
/// Price and date are not considered: the type always carries them.
pub fn is_complete(record: &CardRecord) -> bool {
    completeness_fields(record)
        .iter()
        .all(|field| !field.trim().is_empty())
        && normalize_set_number(&record.set_number) > 0
}

/// Integer formed by the digits of an entered set number.
///
/// "4/102" becomes 4102, "SWSH020" becomes 20, and text without digits
/// becomes 0. Saturates at `i64::MAX` (Firestore integers are 64-bit signed).
pub fn normalize_set_number(entered: &str) -> i64 {
    entered
        .chars()
        .filter_map(|c| c.to_digit(10))
        .fold(0i64, |acc, d| {
            acc.checked_mul(10)
                .and_then(|v| v.checked_add(i64::from(d)))
                .unwrap_or(i64::MAX)
        })
}

/// Parse an entered price into a non-negative finite amount.
pub fn parse_price(entered: &str) -> Result<f64> {
    let trimmed = entered.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(
            "acquisitionPrice: required".to_string(),
        ));
    }
    let value: f64 = trimmed.parse().map_err(|_| {
        AppError::Validation(format!("acquisitionPrice: not a number: {}", entered))
    })?;
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::Validation(format!(
            "acquisitionPrice: must be a non-negative amount, got {}",
            entered
        )));
    }
    Ok(value)
}

fn require_not_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{}: required", field)));
    }
    Ok(())
}

/// Empty is allowed (it only makes the card incomplete); anything else must
/// be one of the known choices.
fn check_choice<T: FromStr<Err = AppError>>(value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Ok(());
    }
    value.parse::<T>().map(|_| ())
}

fn not_blank(value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required").with_message("required".into()));
    }
    Ok(())
}

fn valid_price(value: &str) -> std::result::Result<(), ValidationError> {
    parse_price(value).map(|_| ()).map_err(|_| {
        ValidationError::new("price")
            .with_message("must be a non-negative amount".into())
    })
}

fn valid_condition(value: &str) -> std::result::Result<(), ValidationError> {
    check_choice::<Condition>(value)
        .map_err(|_| ValidationError::new("choice").with_message("unknown condition".into()))
}

fn valid_item_type(value: &str) -> std::result::Result<(), ValidationError> {
    check_choice::<ItemType>(value)
        .map_err(|_| ValidationError::new("choice").with_message("unknown item type".into()))
}

/// Raw form values as entered by the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CardFormInput {
    pub card_name: String,
    #[validate(custom(function = "not_blank"))]
    pub pokemon_name: String,
    #[validate(custom(function = "not_blank"))]
    pub set_name: String,
    pub set_number: String,
    #[validate(custom(function = "valid_condition"))]
    pub condition: String,
    pub language: String,
    #[validate(custom(function = "valid_item_type"))]
    pub item_type: String,
    #[validate(custom(function = "valid_price"))]
    pub acquisition_price: String,
    #[serde(rename = "cardImageURL")]
    pub card_image_url: Option<String>,
}

impl CardFormInput {
    /// Validate the form and build an unsaved record dated `date_added`.
    pub fn into_record(self, date_added: DateTime<Utc>) -> Result<CardRecord> {
        self.validate()?;
        let acquisition_price = parse_price(&self.acquisition_price)?;

        let mut record = CardRecord {
            id: None,
            card_name: self.card_name,
            pokemon_name: self.pokemon_name,
            set_name: self.set_name,
            set_number: self.set_number,
            condition: self.condition,
            language: self.language,
            item_type: self.item_type,
            acquisition_price,
            date_added,
            card_image_url: self.card_image_url,
            is_complete: false,
        };
        record.normalize();
        Ok(record)
    }

    /// Pre-fill fields from a reference card lookup.
    ///
    /// Only the set number and image are taken; a missing value leaves the
    /// field as it was.
    pub fn apply_lookup(&mut self, lookup: &CardLookup) {
        if !lookup.number.trim().is_empty() {
            self.set_number = lookup.number.clone();
        }
        if let Some(url) = lookup.image_url() {
            self.card_image_url = Some(url.to_string());
        }
    }
}

/// Card document as stored under `users/{uid}/cards/{id}`.
///
/// Field names follow the existing collection, including the capitalized
/// `Condition` and `Language`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardDocument {
    /// Document id, filled in by the store when reading
    #[serde(alias = "_firestore_id", default, skip_serializing)]
    pub id: Option<String>,
    #[serde(rename = "acquisitionPrice")]
    pub acquisition_price: f64,
    #[serde(rename = "cardName", default)]
    pub card_name: String,
    #[serde(rename = "Condition", default)]
    pub condition: String,
    #[serde(rename = "dateAdded", with = "firestore::serialize_as_timestamp")]
    pub date_added: DateTime<Utc>,
    #[serde(rename = "itemType", default)]
    pub item_type: String,
    #[serde(rename = "Language", default)]
    pub language: String,
    #[serde(rename = "pokemonName", default)]
    pub pokemon_name: String,
    /// Case-folded `pokemonName`, the key prefix search ranges over
    #[serde(rename = "pokemonNameLower", default)]
    pub pokemon_name_lower: String,
    #[serde(rename = "setName", default)]
    pub set_name: String,
    #[serde(rename = "setNumber", default)]
    pub set_number: i64,
    #[serde(rename = "isComplete", default)]
    pub is_complete: bool,
    #[serde(
        rename = "cardImageURL",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub card_image_url: Option<String>,
}

impl CardDocument {
    /// Map a stored document back to a record.
    ///
    /// `is_complete` is re-derived rather than trusted, so documents written
    /// by older clients without the flag read back correctly.
    pub fn into_record(self) -> CardRecord {
        let mut record = CardRecord {
            id: self.id,
            card_name: self.card_name,
            pokemon_name: self.pokemon_name,
            set_name: self.set_name,
            set_number: self.set_number.to_string(),
            condition: self.condition,
            language: self.language,
            item_type: self.item_type,
            acquisition_price: self.acquisition_price,
            date_added: self.date_added,
            card_image_url: self.card_image_url,
            is_complete: false,
        };
        record.refresh_completeness();
        record
    }
}
