use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::domain::user::UserError;

/// Opaque, immutable identifier assigned to a user at creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Generate a fresh id of the form `<unix-nanos>-<8 hex chars>`.
    pub fn generate() -> Self {
        let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let suffix: [u8; 4] = rand::random();
        let suffix: String = suffix.iter().map(|b| format!("{b:02x}")).collect();

        Self(format!("{nanos}-{suffix}"))
    }

    pub fn parse(id: impl Into<String>) -> Result<Self, UserError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(UserError::InvalidUserId);
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
