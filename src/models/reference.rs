// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Reference card data used to pre-fill the card form.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Fields the card lookup searches on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardQuery {
    pub card_name: String,
    pub pokemon_name: String,
    pub set_name: String,
}

impl CardQuery {
    pub fn is_empty(&self) -> bool {
        self.card_name.trim().is_empty()
            && self.pokemon_name.trim().is_empty()
            && self.set_name.trim().is_empty()
    }

    /// Search expression for the Pokémon TCG API `q` parameter.
    ///
    /// `name:"Base Set Charizard" name:"Charizard" set.name:"Base Set"`,
    /// skipping empty fields.
    pub fn to_search_expression(&self) -> String {
        let terms = [
            ("name", &self.card_name),
            ("name", &self.pokemon_name),
            ("set.name", &self.set_name),
        ];
        terms
            .iter()
            .map(|(key, value)| (key, value.trim()))
            .filter(|(_, value)| !value.is_empty())
            .map(|(key, value)| format!("{}:\"{}\"", key, value.replace('"', "")))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Result of a reference card lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CardLookup {
    /// Printed card number within the set (e.g. "4")
    pub number: String,
    pub small_image: Option<String>,
    pub large_image: Option<String>,
}

impl CardLookup {
    /// Best image to show, preferring the large scan.
    pub fn image_url(&self) -> Option<&str> {
        self.large_image
            .as_deref()
            .or(self.small_image.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_expression_skips_empty_fields() {
        let query = CardQuery {
            card_name: String::new(),
            pokemon_name: "Charizard".to_string(),
            set_name: " Base Set ".to_string(),
        };

        assert_eq!(
            query.to_search_expression(),
            "name:\"Charizard\" set.name:\"Base Set\""
        );
    }

    #[test]
    fn test_search_expression_strips_quotes() {
        let query = CardQuery {
            card_name: "Farfetch\"d".to_string(),
            ..Default::default()
        };

        assert_eq!(query.to_search_expression(), "name:\"Farfetchd\"");
    }

    #[test]
    fn test_empty_query() {
        assert!(CardQuery::default().is_empty());
        assert_eq!(CardQuery::default().to_search_expression(), "");
    }

    #[test]
    fn test_image_url_prefers_large() {
        let lookup = CardLookup {
            number: "4".to_string(),
            small_image: Some("small".to_string()),
            large_image: None,
        };
        assert_eq!(lookup.image_url(), Some("small"));
    }
}
