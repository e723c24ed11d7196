//! Application configuration loaded from environment variables.

use std::env;
use std::time::Duration;

const DEFAULT_POKEAPI_BASE_URL: &str = "https://pokeapi.co/api/v2";
const DEFAULT_POKEMON_TCG_BASE_URL: &str = "https://api.pokemontcg.io/v2";
const DEFAULT_IDENTITY_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";
const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 500;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Firebase / GCP project ID
    pub firebase_project_id: String,
    /// Firebase Web API key (identifies the project to Identity Toolkit)
    pub firebase_api_key: String,
    /// Identity Toolkit REST base URL
    pub identity_base_url: String,
    /// PokeAPI base URL (species names)
    pub pokeapi_base_url: String,
    /// Pokémon TCG API base URL (sets and cards)
    pub pokemon_tcg_base_url: String,
    /// Optional Pokémon TCG API key (raises rate limits)
    pub pokemon_tcg_api_key: Option<String>,
    /// Delay before a search or card lookup is issued after typing stops
    pub search_debounce: Duration,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            firebase_project_id: "test-project".to_string(),
            firebase_api_key: "test_api_key".to_string(),
            identity_base_url: DEFAULT_IDENTITY_BASE_URL.to_string(),
            pokeapi_base_url: DEFAULT_POKEAPI_BASE_URL.to_string(),
            pokemon_tcg_base_url: DEFAULT_POKEMON_TCG_BASE_URL.to_string(),
            pokemon_tcg_api_key: None,
            search_debounce: Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file is read first when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            firebase_project_id: env::var("FIREBASE_PROJECT_ID")
                .unwrap_or_else(|_| "local-dev".to_string()),
            firebase_api_key: env::var("FIREBASE_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("FIREBASE_API_KEY"))?,
            identity_base_url: base_url_var("IDENTITY_BASE_URL", DEFAULT_IDENTITY_BASE_URL),
            pokeapi_base_url: base_url_var("POKEAPI_BASE_URL", DEFAULT_POKEAPI_BASE_URL),
            pokemon_tcg_base_url: base_url_var(
                "POKEMON_TCG_BASE_URL",
                DEFAULT_POKEMON_TCG_BASE_URL,
            ),
            pokemon_tcg_api_key: env::var("POKEMON_TCG_API_KEY")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            search_debounce: match env::var("SEARCH_DEBOUNCE_MS") {
                Ok(raw) => Duration::from_millis(
                    raw.trim()
                        .parse()
                        .map_err(|_| ConfigError::Invalid("SEARCH_DEBOUNCE_MS", raw.clone()))?,
                ),
                Err(_) => Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS),
            },
        })
    }
}

/// Read a base URL, dropping any trailing slash.
fn base_url_var(name: &str, default: &str) -> String {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .trim_end_matches('/')
        .to_string()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
