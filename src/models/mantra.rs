use serde::{Deserialize, Serialize};

use crate::constants::{MAX_MANTRA_TEXT_LEN, MAX_MANTRA_TITLE_LEN};
use crate::error::{AppError, Result};
use crate::models::timestamp_to_rfc3339;

/// Mantra record stored in redb
///
/// Mantras are shared content; `created_by` is informational only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MantraRecord {
    pub title: String,
    pub key_takeaway: String,
    pub background: Option<String>,
    pub personal_take: Option<String>,
    pub when_where: Option<String>,
    pub negative_thinking: Option<String>,
    pub cbt_principles: Option<String>,
    pub references: Option<String>,
    pub created_by: Option<u64>,
    pub created_at: i64,
}

/// Mantra model for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mantra {
    pub id: u64,
    pub title: String,
    pub key_takeaway: String,
    pub background: Option<String>,
    pub personal_take: Option<String>,
    pub when_where: Option<String>,
    pub negative_thinking: Option<String>,
    pub cbt_principles: Option<String>,
    pub references: Option<String>,
    pub created_by: Option<u64>,
    pub created_at: String,
    pub like_count: u64,
}

impl Mantra {
    pub fn from_record(id: u64, record: MantraRecord, like_count: u64) -> Self {
        Self {
            id,
            title: record.title,
            key_takeaway: record.key_takeaway,
            background: record.background,
            personal_take: record.personal_take,
            when_where: record.when_where,
            negative_thinking: record.negative_thinking,
            cbt_principles: record.cbt_principles,
            references: record.references,
            created_by: record.created_by,
            created_at: timestamp_to_rfc3339(record.created_at),
            like_count,
        }
    }
}

/// Request body for creating a mantra
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMantra {
    pub title: String,
    pub key_takeaway: String,
    pub background: Option<String>,
    pub personal_take: Option<String>,
    pub when_where: Option<String>,
    pub negative_thinking: Option<String>,
    pub cbt_principles: Option<String>,
    pub references: Option<String>,
}

fn required(field: &str, value: &str, max: usize) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::InvalidInput(format!("{} is required", field)));
    }
    if value.chars().count() > max {
        return Err(AppError::InvalidInput(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(value.to_string())
}

fn optional(field: &str, value: &Option<String>) -> Result<Option<String>> {
    match value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => required(field, v, MAX_MANTRA_TEXT_LEN).map(Some),
    }
}

impl NewMantra {
    /// Validate the request and build the record to store
    pub fn into_record(self, created_by: u64, now: i64) -> Result<MantraRecord> {
        Ok(MantraRecord {
            title: required("Title", &self.title, MAX_MANTRA_TITLE_LEN)?,
            key_takeaway: required("Key takeaway", &self.key_takeaway, MAX_MANTRA_TEXT_LEN)?,
            background: optional("Background", &self.background)?,
            personal_take: optional("Personal take", &self.personal_take)?,
            when_where: optional("When/where", &self.when_where)?,
            negative_thinking: optional("Negative thinking", &self.negative_thinking)?,
            cbt_principles: optional("CBT principles", &self.cbt_principles)?,
            references: optional("References", &self.references)?,
            created_by: Some(created_by),
            created_at: now,
        })
    }
}
