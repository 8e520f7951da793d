use redb::TableDefinition;

/// Users table: user_id -> UserRecord (serialized)
pub const USERS: TableDefinition<u64, &[u8]> = TableDefinition::new("users");

/// Username index: lower-cased username -> user_id
/// Enforces username uniqueness
pub const USERNAMES: TableDefinition<&str, u64> = TableDefinition::new("usernames");

/// Mantras table: mantra_id -> MantraRecord (serialized)
pub const MANTRAS: TableDefinition<u64, &[u8]> = TableDefinition::new("mantras");

/// Collections table: collection_id -> CollectionRecord (serialized)
pub const COLLECTIONS: TableDefinition<u64, &[u8]> = TableDefinition::new("collections");

/// Owner index: (user_id, collection_id) -> ()
/// Used to list a user's collections without a full scan
pub const USER_COLLECTIONS: TableDefinition<(u64, u64), ()> =
    TableDefinition::new("user_collections");

/// Membership: (collection_id, mantra_id) -> (position, added_at)
/// The key is the uniqueness constraint on the pair. `position` comes from
/// the "collection_mantras" sequence and orders a collection's mantras.
pub const COLLECTION_MANTRAS: TableDefinition<(u64, u64), (u64, i64)> =
    TableDefinition::new("collection_mantras");

/// Likes: (mantra_id, user_id) -> liked_at (Unix timestamp)
pub const MANTRA_LIKES: TableDefinition<(u64, u64), i64> = TableDefinition::new("mantra_likes");

/// Messages table: message_id -> MessageRecord (serialized)
pub const MESSAGES: TableDefinition<u64, &[u8]> = TableDefinition::new("messages");

/// Thread index: (lower user_id, higher user_id, message_id) -> ()
/// One range scan yields a conversation in send order
pub const MESSAGE_THREADS: TableDefinition<(u64, u64, u64), ()> =
    TableDefinition::new("message_threads");

/// Inbox index: (user_id, partner_id) -> id of the latest message between them
pub const USER_CONVERSATIONS: TableDefinition<(u64, u64), u64> =
    TableDefinition::new("user_conversations");

/// Id sequences: entity name -> last allocated id
pub const SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("sequences");
