pub mod collection;
pub mod mantra;
pub mod message;
pub mod user;

use chrono::{DateTime, Utc};

pub use collection::{Collection, CollectionChanges, CollectionRecord};
pub use mantra::{Mantra, MantraRecord, NewMantra};
pub use message::{Conversation, Message, MessageRecord, NewMessage};
pub use user::{User, UserRecord};

/// Convert Unix timestamp to RFC3339 string, defaulting to now if invalid
pub fn timestamp_to_rfc3339(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .unwrap_or_else(Utc::now)
        .to_rfc3339()
}
