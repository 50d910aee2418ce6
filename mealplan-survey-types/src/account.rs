//! User accounts: self-registration and the admin user list.

use serde::{Deserialize, Serialize};

use crate::DraftError;

pub type UserId = i64;

/// Shortest password the backend accepts at registration.
pub const MIN_PASSWORD_LEN: usize = 6;

/// A user as listed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default = "active")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,

    /// Set on registration, e.g. that the account awaits approval.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn active() -> bool {
    true
}

/// An account waiting for an administrator to approve or reject it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingUser {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Body of `POST /users/register`.
#[derive(Clone, PartialEq, Serialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
}

// Keep the password out of logs.
impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl Registration {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Check the registration and trim the email.
    pub fn validate(mut self) -> Result<Self, DraftError> {
        let mut missing = Vec::new();
        if self.email.trim().is_empty() {
            missing.push("email");
        }
        if self.password.is_empty() {
            missing.push("password");
        }
        if !missing.is_empty() {
            return Err(DraftError::MissingFields(missing));
        }

        self.email = self.email.trim().to_string();
        if !plausible_email(&self.email) {
            return Err(DraftError::InvalidEmail);
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(DraftError::PasswordTooShort(MIN_PASSWORD_LEN));
        }
        Ok(self)
    }
}

/// One `@` with a non-empty local part and a dotted domain; the backend does the rest.
fn plausible_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.split('.').count() > 1
        && domain.split('.').all(|part| !part.is_empty())
}
