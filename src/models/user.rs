//! Signed-in user identity passed into repository calls.

use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who a repository call is made for.
///
/// Passed explicitly to every operation instead of living in global state,
/// so tests can make up any user they like.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserContext {
    user_id: Option<String>,
}

impl UserContext {
    /// No one is signed in.
    pub fn anonymous() -> Self {
        Self { user_id: None }
    }

    /// A signed-in user with the identity provider's opaque id.
    pub fn authenticated(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    /// The user id, or `Unauthorized` for an anonymous context.
    pub fn require_user(&self) -> Result<&str> {
        self.user_id().ok_or(AppError::Unauthorized)
    }
}

/// Session returned by a successful sign-up or sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    /// Identity provider user id (also the `users/{uid}` document id)
    pub user_id: String,
    pub email: String,
    /// Short-lived ID token
    pub id_token: String,
    pub refresh_token: String,
    /// When the ID token expires
    pub expires_at: DateTime<Utc>,
}

impl AuthSession {
    /// Repository context for this session.
    pub fn context(&self) -> UserContext {
        UserContext::authenticated(self.user_id.clone())
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
