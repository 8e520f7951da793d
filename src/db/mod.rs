pub mod collections;
pub mod mantras;
pub mod messages;
pub mod tables;
pub mod users;

use redb::{
    Database, Error as RedbError, ReadableDatabase, ReadableTable, ReadableTableMetadata,
    WriteTransaction,
};
use serde::{Serialize, de::DeserializeOwned};
use std::ops::RangeInclusive;
use std::path::Path;
use std::sync::Arc;

use crate::error::Result;

const BINCODE_CONFIG: bincode::config::Configuration = bincode::config::standard();

/// Database handle type (Arc-wrapped for sharing across handlers)
pub type Db = Arc<Database>;

/// Open or create the redb database at the given path
///
/// Creates all required tables on first run.
#[allow(clippy::result_large_err)]
pub fn open_database(path: impl AsRef<Path>) -> std::result::Result<Db, RedbError> {
    tracing::info!("Opening database at: {:?}", path.as_ref());

    // Create parent directory if it doesn't exist
    if let Some(parent) = path.as_ref().parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            tracing::error!("Failed to create database directory: {}", e);
            RedbError::Io(e)
        })?;
    }

    let db = Database::create(path)?;

    let write_txn = db.begin_write()?;
    {
        let _ = write_txn.open_table(tables::USERS)?;
        let _ = write_txn.open_table(tables::USERNAMES)?;
        let _ = write_txn.open_table(tables::MANTRAS)?;
        let _ = write_txn.open_table(tables::COLLECTIONS)?;
        let _ = write_txn.open_table(tables::USER_COLLECTIONS)?;
        let _ = write_txn.open_table(tables::COLLECTION_MANTRAS)?;
        let _ = write_txn.open_table(tables::MANTRA_LIKES)?;
        let _ = write_txn.open_table(tables::MESSAGES)?;
        let _ = write_txn.open_table(tables::MESSAGE_THREADS)?;
        let _ = write_txn.open_table(tables::USER_CONVERSATIONS)?;
        let _ = write_txn.open_table(tables::SEQUENCES)?;
    }
    write_txn.commit()?;

    tracing::info!("Database initialized successfully");

    Ok(Arc::new(db))
}

/// Run a blocking database closure on the blocking thread pool
pub async fn with_db<T, F>(db: &Db, f: F) -> Result<T>
where
    F: FnOnce(&Database) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let db = db.clone();
    tokio::task::spawn_blocking(move || f(&db)).await?
}

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(bincode::serde::encode_to_vec(value, BINCODE_CONFIG)?)
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let (value, _) = bincode::serde::decode_from_slice(bytes, BINCODE_CONFIG)?;
    Ok(value)
}

/// Allocate the next id for `entity` inside the caller's write transaction
///
/// Ids start at 1 and are never reused.
pub(crate) fn next_id(txn: &WriteTransaction, entity: &str) -> Result<u64> {
    let mut sequences = txn.open_table(tables::SEQUENCES)?;
    let next = sequences.get(entity)?.map(|v| v.value()).unwrap_or(0) + 1;
    sequences.insert(entity, next)?;
    Ok(next)
}

/// All composite keys whose first component is `prefix`
pub(crate) fn prefix_range(prefix: u64) -> RangeInclusive<(u64, u64)> {
    (prefix, 0)..=(prefix, u64::MAX)
}

/// Count rows of a composite-key table sharing the first key component
pub(crate) fn count_prefix<V: redb::Value + 'static>(
    table: &impl ReadableTable<(u64, u64), V>,
    prefix: u64,
) -> Result<u64> {
    let mut count = 0;
    for entry in table.range(prefix_range(prefix))? {
        entry?;
        count += 1;
    }
    Ok(count)
}

/// Row counts reported by the admin stats endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub users: u64,
    pub mantras: u64,
    pub collections: u64,
    pub memberships: u64,
    pub likes: u64,
    pub messages: u64,
}

pub fn stats(db: &Database) -> Result<Stats> {
    let read_txn = db.begin_read()?;
    Ok(Stats {
        users: read_txn.open_table(tables::USERS)?.len()?,
        mantras: read_txn.open_table(tables::MANTRAS)?.len()?,
        collections: read_txn.open_table(tables::COLLECTIONS)?.len()?,
        memberships: read_txn.open_table(tables::COLLECTION_MANTRAS)?.len()?,
        likes: read_txn.open_table(tables::MANTRA_LIKES)?.len()?,
        messages: read_txn.open_table(tables::MESSAGES)?.len()?,
    })
}


#[cfg(test)]
mod tests {
    use super::test_support::temp_db;
    use super::*;

    #[test]
    fn test_next_id_is_monotonic_per_entity() {
        let (_dir, db) = temp_db();

        let txn = db.begin_write().unwrap();
        assert_eq!(next_id(&txn, "a").unwrap(), 1);
        assert_eq!(next_id(&txn, "a").unwrap(), 2);
        assert_eq!(next_id(&txn, "b").unwrap(), 1);
        txn.commit().unwrap();

        let txn = db.begin_write().unwrap();
        assert_eq!(next_id(&txn, "a").unwrap(), 3);
    }

    #[test]
    fn test_encode_decode_record() {
        let record = crate::models::UserRecord {
            username: "jamie".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            created_at: 1_733_788_800,
        };

        let bytes = encode(&record).unwrap();
        let decoded: crate::models::UserRecord = decode(&bytes).unwrap();

        assert_eq!(decoded.username, "jamie");
        assert_eq!(decoded.created_at, record.created_at);
    }

    #[test]
    fn test_reopen_keeps_data() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("test.db");

        {
            let db = open_database(&path).unwrap();
            let txn = db.begin_write().unwrap();
            next_id(&txn, "collections").unwrap();
            txn.commit().unwrap();
        }

        let db = open_database(&path).unwrap();
        let txn = db.begin_write().unwrap();
        assert_eq!(next_id(&txn, "collections").unwrap(), 2);
    }

    #[test]
    fn test_stats_empty() {
        let (_dir, db) = temp_db();

        let stats = stats(&db).unwrap();

        assert_eq!(stats.users, 0);
        assert_eq!(stats.memberships, 0);
        assert_eq!(stats.messages, 0);
    }
}
