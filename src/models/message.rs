use serde::{Deserialize, Serialize};

use crate::constants::{ERR_MESSAGE_CONTENT_REQUIRED, ERR_MESSAGE_TO_SELF, MAX_MESSAGE_LEN};
use crate::error::{AppError, Result};
use crate::models::{User, timestamp_to_rfc3339};

/// Direct message stored in redb
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub sender_id: u64,
    pub recipient_id: u64,
    pub content: String,
    pub created_at: i64,
}

impl MessageRecord {
    /// The other participant, seen from `user_id`
    pub fn partner_of(&self, user_id: u64) -> u64 {
        if self.sender_id == user_id {
            self.recipient_id
        } else {
            self.sender_id
        }
    }
}

/// Message model for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: u64,
    pub sender_id: u64,
    pub recipient_id: u64,
    pub content: String,
    pub created_at: String,
}

impl Message {
    pub fn from_record(id: u64, record: &MessageRecord) -> Self {
        Self {
            id,
            sender_id: record.sender_id,
            recipient_id: record.recipient_id,
            content: record.content.clone(),
            created_at: timestamp_to_rfc3339(record.created_at),
        }
    }
}

/// One entry of a user's inbox: the other participant and the latest message
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub user: User,
    pub last_message: Message,
}

/// Request body for sending a message
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessage {
    pub recipient_id: u64,
    pub content: String,
}

impl NewMessage {
    /// Validate the request and build the record to store
    pub fn into_record(self, sender_id: u64, now: i64) -> Result<MessageRecord> {
        if self.recipient_id == sender_id {
            return Err(AppError::InvalidInput(ERR_MESSAGE_TO_SELF.to_string()));
        }

        let content = self.content.trim();
        if content.is_empty() {
            return Err(AppError::InvalidInput(ERR_MESSAGE_CONTENT_REQUIRED.to_string()));
        }
        if content.chars().count() > MAX_MESSAGE_LEN {
            return Err(AppError::InvalidInput(format!(
                "Message must be at most {} characters",
                MAX_MESSAGE_LEN
            )));
        }

        Ok(MessageRecord {
            sender_id,
            recipient_id: self.recipient_id,
            content: content.to_string(),
            created_at: now,
        })
    }
}
