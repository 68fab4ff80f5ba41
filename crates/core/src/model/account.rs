use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::UserId;
use crate::time::Clock;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CredentialsError {
    #[error("email cannot be empty")]
    EmptyEmail,

    #[error("email address is not valid")]
    InvalidEmail,

    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },
}

//
// ─── USER ──────────────────────────────────────────────────────────────────────
//

/// The identity attached to a signed-in session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Tokens issued by the auth provider for a signed-in user.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    /// A session without an expiry never goes stale on the client side.
    #[must_use]
    pub fn is_expired(&self, clock: &Clock) -> bool {
        self.expires_at.is_some_and(|at| clock.has_passed(at))
    }
}

// Tokens stay out of logs.
impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

//
// ─── CREDENTIALS ───────────────────────────────────────────────────────────────
//

/// Minimum password length accepted by the hosted auth service.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Validated email/password pair for sign-in and sign-up.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    /// Trims and validates the email, checks the password length.
    ///
    /// # Errors
    ///
    /// Returns `CredentialsError` when the email is blank or malformed, or the
    /// password is shorter than [`MIN_PASSWORD_LEN`].
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, CredentialsError> {
        let email = email.into().trim().to_owned();
        let password = password.into();

        if email.is_empty() {
            return Err(CredentialsError::EmptyEmail);
        }
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
            _ => return Err(CredentialsError::InvalidEmail),
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(CredentialsError::PasswordTooShort {
                min: MIN_PASSWORD_LEN,
            });
        }

        Ok(Self { email, password })
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}
