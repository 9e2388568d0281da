//! Session token correlating the gateway redirect flow and approval links.
//!
//! A fresh token is minted for every redirect-flow attempt. The token is
//! the only credential in the approver's approve/reject links, so it must
//! be unguessable; 128 bits of UUIDv4 randomness rendered as 32 hex
//! characters.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::ValidationError;

/// Opaque 32-character hex token, unique per application attempt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Mints a fresh random token.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Validates and wraps a token received from a URL path or callback.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidFormat` unless the input is
    /// exactly 32 lowercase hex characters.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        if input.len() != 32 || !input.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()) {
            return Err(ValidationError::invalid_format(
                "session_token",
                "expected 32 lowercase hex characters",
            ));
        }
        Ok(Self(input.to_string()))
    }

    /// Returns the token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
