//! Domain service for account registration and login.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{LoginInput, OwnerId, RegistrationInput};

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Registration rules failed; messages in rule order.
    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("Username or email already exists")]
    Conflict,

    #[error("Email and password are required")]
    MissingCredentials,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Messages suitable for showing on the submitting form.
    #[must_use]
    pub fn user_messages(&self) -> Vec<String> {
        match self {
            Self::Validation(errors) => errors.clone(),
            Self::Conflict | Self::MissingCredentials | Self::InvalidCredentials => {
                vec![self.to_string()]
            }
            Self::Database(_) | Self::Internal(_) => {
                vec!["Something went wrong, please try again".to_string()]
            }
        }
    }
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Identity carried in the session after a successful login or registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub username: String,
    pub email: String,
}

impl SessionUser {
    #[must_use]
    pub fn owner(&self) -> OwnerId {
        OwnerId::new(self.id.clone())
    }
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Validates the form, rejects taken usernames or emails and creates the
    /// account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] or [`AuthError::Conflict`] for
    /// rejected input.
    async fn register(&self, input: &RegistrationInput) -> Result<SessionUser, AuthError>;

    /// Verifies an email/password pair.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown email and for
    /// a wrong password alike.
    async fn login(&self, input: &LoginInput) -> Result<SessionUser, AuthError>;
}
