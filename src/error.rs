// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types shared by the repository and its collaborators.

/// Application error type returned by every fallible operation.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Document store error: {0}")]
    Store(String),

    #[error("Identity provider error: {0}")]
    Identity(String),

    #[error("Reference data API error: {0}")]
    ReferenceApi(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Identity Toolkit code for a wrong password.
    pub const INVALID_PASSWORD: &'static str = "INVALID_PASSWORD";
    /// Identity Toolkit code for an unknown account.
    pub const EMAIL_NOT_FOUND: &'static str = "EMAIL_NOT_FOUND";
    /// Identity Toolkit code when sign-in fails without saying why (email
    /// enumeration protection).
    pub const INVALID_LOGIN_CREDENTIALS: &'static str = "INVALID_LOGIN_CREDENTIALS";

    /// Whether the user can recover by correcting what they typed.
    ///
    /// Store and internal failures are not recoverable locally; the caller
    /// should show the message and let the user try again later.
    pub fn is_user_correctable(&self) -> bool {
        match self {
            AppError::Validation(_) => true,
            AppError::Identity(code) => is_credentials_error(code),
            _ => false,
        }
    }

    /// Whether this is a credentials rejection from the identity provider.
    pub fn is_credentials_error(&self) -> bool {
        matches!(self, AppError::Identity(code) if is_credentials_error(code))
    }
}

fn is_credentials_error(code: &str) -> bool {
    code.starts_with(AppError::INVALID_PASSWORD)
        || code.starts_with(AppError::EMAIL_NOT_FOUND)
        || code.starts_with(AppError::INVALID_LOGIN_CREDENTIALS)
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let reason = errs
                    .iter()
                    .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| {
                        errs.first()
                            .map(|e| e.code.to_string())
                            .unwrap_or_default()
                    });
                format!("{}: {}", field, reason)
            })
            .collect();
        // HashMap order is unstable; keep messages deterministic.
        fields.sort();
        AppError::Validation(fields.join("; "))
    }
}

/// Result type alias for repository and service operations
pub type Result<T> = std::result::Result<T, AppError>;
