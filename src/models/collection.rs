use serde::{Deserialize, Serialize};

use crate::constants::{
    ERR_COLLECTION_NAME_REQUIRED, MAX_COLLECTION_DESCRIPTION_LEN, MAX_COLLECTION_NAME_LEN,
};
use crate::error::{AppError, Result};
use crate::models::timestamp_to_rfc3339;

/// Collection record stored in redb
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionRecord {
    /// The only user allowed to read, change or delete this collection
    pub owner_id: u64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Collection model for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: u64,
    pub user_id: u64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    /// Present in listings only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mantra_count: Option<u64>,
}

impl Collection {
    pub fn from_record(id: u64, record: &CollectionRecord) -> Self {
        Self {
            id,
            user_id: record.owner_id,
            name: record.name.clone(),
            description: record.description.clone(),
            created_at: timestamp_to_rfc3339(record.created_at),
            updated_at: timestamp_to_rfc3339(record.updated_at),
            mantra_count: None,
        }
    }

    pub fn with_mantra_count(mut self, count: u64) -> Self {
        self.mantra_count = Some(count);
        self
    }
}

/// Partial update to a collection
///
/// An empty description clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollectionChanges {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Trim and check a collection name
pub fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput(
            ERR_COLLECTION_NAME_REQUIRED.to_string(),
        ));
    }
    if name.chars().count() > MAX_COLLECTION_NAME_LEN {
        return Err(AppError::InvalidInput(format!(
            "Collection name must be at most {} characters",
            MAX_COLLECTION_NAME_LEN
        )));
    }
    Ok(name.to_string())
}

/// Trim and check a collection description; blank becomes `None`
pub fn validate_description(description: Option<&str>) -> Result<Option<String>> {
    let Some(description) = description.map(str::trim).filter(|d| !d.is_empty()) else {
        return Ok(None);
    };
    if description.chars().count() > MAX_COLLECTION_DESCRIPTION_LEN {
        return Err(AppError::InvalidInput(format!(
            "Collection description must be at most {} characters",
            MAX_COLLECTION_DESCRIPTION_LEN
        )));
    }
    Ok(Some(description.to_string()))
}

impl CollectionChanges {
    /// Apply these changes to `record`, validating each provided field
    pub fn apply(&self, record: &mut CollectionRecord, now: i64) -> Result<()> {
        if let Some(name) = &self.name {
            record.name = validate_name(name)?;
        }
        if let Some(description) = &self.description {
            record.description = validate_description(Some(description))?;
        }
        record.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> CollectionRecord {
        CollectionRecord {
            owner_id: 1,
            name: "Morning".to_string(),
            description: Some("Start the day".to_string()),
            created_at: 100,
            updated_at: 100,
        }
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("  Calm  ").unwrap(), "Calm");
        assert!(matches!(validate_name("   "), Err(AppError::InvalidInput(_))));
        assert!(validate_name(&"x".repeat(MAX_COLLECTION_NAME_LEN)).is_ok());
        assert!(validate_name(&"x".repeat(MAX_COLLECTION_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_description() {
        assert_eq!(validate_description(None).unwrap(), None);
        assert_eq!(validate_description(Some("  ")).unwrap(), None);
        assert_eq!(
            validate_description(Some(" notes ")).unwrap(),
            Some("notes".to_string())
        );
        assert!(validate_description(Some(&"x".repeat(MAX_COLLECTION_DESCRIPTION_LEN + 1))).is_err());
    }

    #[test]
    fn test_apply_partial_changes() {
        let mut rec = record();
        let changes = CollectionChanges {
            name: Some("Evening".to_string()),
            description: None,
        };

        changes.apply(&mut rec, 200).unwrap();

        assert_eq!(rec.name, "Evening");
        assert_eq!(rec.description.as_deref(), Some("Start the day"));
        assert_eq!(rec.updated_at, 200);
        assert_eq!(rec.created_at, 100);
    }

    #[test]
    fn test_apply_empty_description_clears() {
        let mut rec = record();
        let changes = CollectionChanges {
            name: None,
            description: Some(String::new()),
        };

        changes.apply(&mut rec, 200).unwrap();

        assert_eq!(rec.description, None);
        assert_eq!(rec.name, "Morning");
    }

    #[test]
    fn test_apply_invalid_name_leaves_error() {
        let mut rec = record();
        let changes = CollectionChanges {
            name: Some(" ".to_string()),
            description: None,
        };

        assert!(changes.apply(&mut rec, 200).is_err());
    }
}
