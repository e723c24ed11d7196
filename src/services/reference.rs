// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Reference data clients used to pre-fill the card form.
//!
//! Handles:
//! - Species names from PokeAPI (cached for the client's lifetime)
//! - Set names from the Pokémon TCG API (cached likewise)
//! - Card number and image lookup by name and set
//!
//! Every lookup is best-effort: failures are logged and come back as an
//! empty list or `None`, never as an error.

use crate::config::Config;
use crate::error::AppError;
use crate::models::{CardLookup, CardQuery};
use anyhow::Context;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);
/// PokeAPI has ~1300 species; ask for all of them in one page.
const SPECIES_PAGE_LIMIT: u32 = 10_000;
const TCG_API_KEY_HEADER: &str = "X-Api-Key";

type NameCache = RwLock<Option<Arc<Vec<String>>>>;

/// Client for the public card and species reference APIs.
pub struct ReferenceDataClient {
    http: reqwest::Client,
    pokeapi_base_url: String,
    tcg_base_url: String,
    tcg_api_key: Option<String>,
    species_cache: NameCache,
    set_cache: NameCache,
}

impl ReferenceDataClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .context("failed building reference data HTTP client")?;

        Ok(Self {
            http,
            pokeapi_base_url: config.pokeapi_base_url.clone(),
            tcg_base_url: config.pokemon_tcg_base_url.clone(),
            tcg_api_key: config.pokemon_tcg_api_key.clone(),
            species_cache: RwLock::new(None),
            set_cache: RwLock::new(None),
        })
    }

    /// All species names, capitalized ("Mr-Mime", "Charizard").
    pub async fn species_names(&self) -> Arc<Vec<String>> {
        cached_names(&self.species_cache, "species", || self.fetch_species_names()).await
    }

    /// All card set names.
    pub async fn set_names(&self) -> Arc<Vec<String>> {
        cached_names(&self.set_cache, "sets", || self.fetch_set_names()).await
    }

    /// Look up the first card matching the given name and set.
    ///
    /// Returns `None` when every query field is empty, nothing matches, or
    /// the API call fails.
    pub async fn lookup_card(&self, query: &CardQuery) -> Option<CardLookup> {
        if query.is_empty() {
            return None;
        }

        match self.fetch_card(query).await {
            Ok(lookup) => lookup,
            Err(e) => {
                tracing::warn!(error = %e, "Card lookup failed");
                None
            }
        }
    }

    async fn fetch_species_names(&self) -> Result<Vec<String>, AppError> {
        let url = format!("{}/pokemon", self.pokeapi_base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("limit", SPECIES_PAGE_LIMIT)])
            .send()
            .await
            .map_err(|e| AppError::ReferenceApi(e.to_string()))?;

        let body: SpeciesListResponse = check_response_json(response).await?;
        Ok(body
            .results
            .into_iter()
            .map(|entry| capitalize_words(&entry.name))
            .collect())
    }

    async fn fetch_set_names(&self) -> Result<Vec<String>, AppError> {
        let url = format!("{}/sets", self.tcg_base_url);
        let response = self
            .tcg_request(&url)
            .send()
            .await
            .map_err(|e| AppError::ReferenceApi(e.to_string()))?;

        let body: SetListResponse = check_response_json(response).await?;
        Ok(body.data.into_iter().map(|set| set.name).collect())
    }

    async fn fetch_card(&self, query: &CardQuery) -> Result<Option<CardLookup>, AppError> {
        let url = format!("{}/cards", self.tcg_base_url);
        let response = self
            .tcg_request(&url)
            .query(&[
                ("q", query.to_search_expression()),
                ("pageSize", "1".to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::ReferenceApi(e.to_string()))?;

        let body: CardSearchResponse = check_response_json(response).await?;
        Ok(body.into_lookup())
    }

    fn tcg_request(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.http.get(url).header(ACCEPT, "application/json");
        match &self.tcg_api_key {
            Some(key) => request.header(TCG_API_KEY_HEADER, key),
            None => request,
        }
    }
}

/// Return the cached list, fetching it on first use.
///
/// Failed or empty fetches are not cached so a later call can retry.
async fn cached_names<F, Fut>(cache: &NameCache, kind: &str, fetch: F) -> Arc<Vec<String>>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<Vec<String>, AppError>>,
{
    if let Some(names) = cache.read().await.as_ref() {
        return names.clone();
    }

    // Hold the write lock across the fetch so concurrent callers share it.
    let mut slot = cache.write().await;
    if let Some(names) = slot.as_ref() {
        return names.clone();
    }

    match fetch().await {
        Ok(names) if !names.is_empty() => {
            tracing::info!(kind, count = names.len(), "Reference names loaded");
            let names = Arc::new(names);
            *slot = Some(names.clone());
            names
        }
        Ok(_) => {
            tracing::warn!(kind, "Reference name list was empty");
            Arc::new(Vec::new())
        }
        Err(e) => {
            tracing::warn!(kind, error = %e, "Failed to load reference names");
            Arc::new(Vec::new())
        }
    }
}

/// Check response status and parse the JSON body.
async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, AppError> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.as_u16() == 429 {
            tracing::warn!("Reference API rate limit hit (429)");
        }

        return Err(AppError::ReferenceApi(format!("HTTP {}: {}", status, body)));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::ReferenceApi(format!("Failed to parse response: {}", e)))
}

/// Names containing `fragment`, ignoring case. Empty fragment matches nothing.
pub fn filter_names(names: &[String], fragment: &str) -> Vec<String> {
    let fragment = fragment.trim().to_lowercase();
    if fragment.is_empty() {
        return Vec::new();
    }
    names
        .iter()
        .filter(|name| name.to_lowercase().contains(&fragment))
        .cloned()
        .collect()
}

/// Uppercase the first letter of each space- or hyphen-separated word.
pub fn capitalize_words(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut at_word_start = true;
    for c in name.chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        at_word_start = c == ' ' || c == '-';
    }
    out
}

// ─── API Response Types ──────────────────────────────────────

#[derive(Debug, Deserialize)]
struct NamedEntry {
    name: String,
}

/// PokeAPI `GET /pokemon` response.
#[derive(Debug, Deserialize)]
struct SpeciesListResponse {
    results: Vec<NamedEntry>,
}

/// Pokémon TCG API `GET /sets` response.
#[derive(Debug, Deserialize)]
struct SetListResponse {
    data: Vec<NamedEntry>,
}

/// Pokémon TCG API `GET /cards` response.
#[derive(Debug, Deserialize)]
struct CardSearchResponse {
    data: Vec<CardEntry>,
}

#[derive(Debug, Deserialize)]
struct CardEntry {
    number: String,
    #[serde(default)]
    images: Option<CardImages>,
}

#[derive(Debug, Deserialize)]
struct CardImages {
    small: Option<String>,
    large: Option<String>,
}

impl CardSearchResponse {
    fn into_lookup(self) -> Option<CardLookup> {
        let card = self.data.into_iter().next()?;
        let (small_image, large_image) = match card.images {
            Some(images) => (images.small, images.large),
            None => (None, None),
        };
        Some(CardLookup {
            number: card.number,
            small_image,
            large_image,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_client() -> ReferenceDataClient {
        // Nothing listens on the discard port, so every request fails fast.
        let config = Config {
            pokeapi_base_url: "http://127.0.0.1:9".to_string(),
            pokemon_tcg_base_url: "http://127.0.0.1:9".to_string(),
            ..Config::default()
        };
        ReferenceDataClient::new(&config).unwrap()
    }

    #[test]
    fn test_capitalize_words() {
        assert_eq!(capitalize_words("charizard"), "Charizard");
        assert_eq!(capitalize_words("mr-mime"), "Mr-Mime");
        assert_eq!(capitalize_words("tapu koko"), "Tapu Koko");
        assert_eq!(capitalize_words(""), "");
    }

    #[test]
    fn test_filter_names_is_case_insensitive_containment() {
        let names = vec![
            "Charizard".to_string(),
            "Charmander".to_string(),
            "Squirtle".to_string(),
        ];

        assert_eq!(filter_names(&names, "CHAR"), vec!["Charizard", "Charmander"]);
        assert_eq!(filter_names(&names, "tle"), vec!["Squirtle"]);
        assert!(filter_names(&names, "").is_empty());
    }

    #[test]
    fn test_card_search_response_into_lookup() {
        let body: CardSearchResponse = serde_json::from_value(serde_json::json!({
            "data": [{
                "id": "base1-4",
                "name": "Charizard",
                "number": "4",
                "images": {
                    "small": "https://images.pokemontcg.io/base1/4.png",
                    "large": "https://images.pokemontcg.io/base1/4_hires.png"
                }
            }],
            "page": 1,
            "pageSize": 1
        }))
        .unwrap();

        let lookup = body.into_lookup().unwrap();
        assert_eq!(lookup.number, "4");
        assert_eq!(
            lookup.image_url(),
            Some("https://images.pokemontcg.io/base1/4_hires.png")
        );
    }

    #[test]
    fn test_empty_card_search_response() {
        let body: CardSearchResponse =
            serde_json::from_value(serde_json::json!({ "data": [] })).unwrap();
        assert!(body.into_lookup().is_none());
    }

    #[test]
    fn test_species_response_parses() {
        let body: SpeciesListResponse = serde_json::from_value(serde_json::json!({
            "count": 2,
            "results": [
                { "name": "bulbasaur", "url": "https://pokeapi.co/api/v2/pokemon/1/" },
                { "name": "mr-mime", "url": "https://pokeapi.co/api/v2/pokemon/122/" }
            ]
        }))
        .unwrap();

        let names: Vec<String> = body
            .results
            .into_iter()
            .map(|e| capitalize_words(&e.name))
            .collect();
        assert_eq!(names, vec!["Bulbasaur", "Mr-Mime"]);
    }

    #[tokio::test]
    async fn test_failed_lookups_are_swallowed() {
        let client = offline_client();

        assert!(client.species_names().await.is_empty());
        assert!(client.set_names().await.is_empty());

        let query = CardQuery {
            pokemon_name: "Charizard".to_string(),
            ..Default::default()
        };
        assert!(client.lookup_card(&query).await.is_none());

        // Failures are not cached.
        assert!(client.species_cache.read().await.is_none());
    }

    #[tokio::test]
    async fn test_empty_query_skips_request() {
        let client = offline_client();
        assert!(client.lookup_card(&CardQuery::default()).await.is_none());
    }
}
