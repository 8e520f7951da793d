use serde::{Deserialize, Serialize};

use crate::constants::{MAX_USERNAME_LEN, MIN_USERNAME_LEN};
use crate::models::timestamp_to_rfc3339;

/// User record stored in redb
/// Uses Unix timestamp for compact storage with bincode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// Lower-cased username
    pub username: String,
    /// argon2 PHC string
    pub password_hash: String,
    /// When the user was created (Unix timestamp)
    pub created_at: i64,
}

/// User model for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub username: String,
    pub created_at: String,
}

impl User {
    pub fn from_record(id: u64, record: &UserRecord) -> Self {
        Self {
            id,
            username: record.username.clone(),
            created_at: timestamp_to_rfc3339(record.created_at),
        }
    }

    /// Normalize a username for storage and lookup
    pub fn normalize_username(username: &str) -> String {
        username.trim().to_ascii_lowercase()
    }

    /// Validate a (normalized) username: 3-32 ASCII alphanumerics or underscores
    pub fn validate_username(username: &str) -> bool {
        (MIN_USERNAME_LEN..=MAX_USERNAME_LEN).contains(&username.len())
            && username
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
    }
}
