// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firebase Authentication (Identity Toolkit REST API) client.
//!
//! Handles:
//! - Account creation and email/password sign-in
//! - Password reset emails
//! - Local sign-out
//!
//! Each call is a single request with no retry.

use crate::config::Config;
use crate::error::AppError;
use crate::models::{AuthSession, UserContext};
use anyhow::Context;
use chrono::{Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);
/// Identity Toolkit's default ID token lifetime.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// Identity provider client.
#[derive(Clone)]
pub struct IdentityClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl IdentityClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .context("failed building identity HTTP client")?;

        Ok(Self {
            http,
            base_url: config.identity_base_url.clone(),
            api_key: config.firebase_api_key.clone(),
        })
    }

    /// Create an account and sign it in.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, AppError> {
        let body = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        let response: TokenResponse = self.post("accounts:signUp", &body).await?;
        tracing::info!(user_id = %response.local_id, "Account created");
        Ok(response.into_session(email))
    }

    /// Sign in with email and password.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AppError> {
        let body = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        let response: TokenResponse = self.post("accounts:signInWithPassword", &body).await?;
        tracing::info!(user_id = %response.local_id, "Signed in");
        Ok(response.into_session(email))
    }

    /// Send a password reset email.
    pub async fn send_password_reset(&self, email: &str) -> Result<(), AppError> {
        let body = OobCodeRequest {
            request_type: "PASSWORD_RESET",
            email,
        };
        let _: serde_json::Value = self.post("accounts:sendOobCode", &body).await?;
        tracing::info!("Password reset email requested");
        Ok(())
    }

    /// End a session. Tokens are simply dropped; nothing is sent.
    pub fn sign_out(&self, session: AuthSession) -> UserContext {
        tracing::info!(user_id = %session.user_id, "Signed out");
        UserContext::anonymous()
    }

    async fn post<B, T>(&self, method: &str, body: &B) -> Result<T, AppError>
    where
        B: Serialize + ?Sized,
        T: for<'de> Deserialize<'de>,
    {
        let url = format!("{}/{}", self.base_url, method);
        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Identity(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Identity(provider_error_code(&body).unwrap_or_else(
                || format!("HTTP {}: {}", status, body),
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Identity(format!("Failed to parse response: {}", e)))
    }
}

/// Extract the provider's error code from an error body.
///
/// `{"error":{"code":400,"message":"WEAK_PASSWORD : Password should be at least 6 characters"}}`
/// yields `WEAK_PASSWORD : Password should be at least 6 characters`.
pub fn provider_error_code(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .map(|e| e.error.message)
        .filter(|m| !m.is_empty())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OobCodeRequest<'a> {
    request_type: &'a str,
    email: &'a str,
}

/// signUp / signInWithPassword response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    id_token: String,
    #[serde(default)]
    email: Option<String>,
    refresh_token: String,
    /// Seconds, as a string
    #[serde(default)]
    expires_in: Option<String>,
    local_id: String,
}

impl TokenResponse {
    fn into_session(self, requested_email: &str) -> AuthSession {
        let lifetime = self
            .expires_in
            .as_deref()
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);

        AuthSession {
            user_id: self.local_id,
            email: self.email.unwrap_or_else(|| requested_email.to_string()),
            id_token: self.id_token,
            refresh_token: self.refresh_token,
            expires_at: Utc::now() + ChronoDuration::seconds(lifetime),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}
