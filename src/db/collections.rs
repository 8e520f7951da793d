//! Collection storage and the (collection, mantra) membership relation.
//!
//! The membership table is keyed by the pair itself, so the key is the
//! uniqueness constraint. `insert_membership` refuses to overwrite and
//! reports `UniqueViolation` instead; redb serializes write transactions,
//! which makes that check-and-insert atomic.

use redb::{Database, ReadableDatabase, ReadableTable};

use crate::db::{count_prefix, decode, encode, mantras, next_id, prefix_range, tables};
use crate::error::{AppError, Result};
use crate::models::{CollectionRecord, Mantra};

/// Insert a new collection and its owner index entry
pub fn create(db: &Database, record: &CollectionRecord) -> Result<u64> {
    let write_txn = db.begin_write()?;
    let collection_id = {
        let collection_id = next_id(&write_txn, "collections")?;

        let mut collections = write_txn.open_table(tables::COLLECTIONS)?;
        let bytes = encode(record)?;
        collections.insert(collection_id, bytes.as_slice())?;

        let mut owner_index = write_txn.open_table(tables::USER_COLLECTIONS)?;
        owner_index.insert((record.owner_id, collection_id), ())?;
        collection_id
    };
    write_txn.commit()?;

    Ok(collection_id)
}

pub fn get(db: &Database, collection_id: u64) -> Result<Option<CollectionRecord>> {
    let read_txn = db.begin_read()?;
    let collections = read_txn.open_table(tables::COLLECTIONS)?;
    collections
        .get(collection_id)?
        .map(|bytes| decode(bytes.value()))
        .transpose()
}

/// A user's collections, newest first, each with its mantra count
pub fn list_for_owner(db: &Database, owner_id: u64) -> Result<Vec<(u64, CollectionRecord, u64)>> {
    let read_txn = db.begin_read()?;
    let owner_index = read_txn.open_table(tables::USER_COLLECTIONS)?;
    let collections = read_txn.open_table(tables::COLLECTIONS)?;
    let memberships = read_txn.open_table(tables::COLLECTION_MANTRAS)?;

    let mut result = Vec::new();
    for entry in owner_index.range(prefix_range(owner_id))?.rev() {
        let (key, _) = entry?;
        let (_, collection_id) = key.value();

        let Some(bytes) = collections.get(collection_id)? else {
            tracing::warn!(
                "Owner index points at missing collection {} (user {})",
                collection_id,
                owner_id
            );
            continue;
        };
        let record: CollectionRecord = decode(bytes.value())?;
        let count = count_prefix(&memberships, collection_id)?;
        result.push((collection_id, record, count));
    }

    Ok(result)
}

/// Overwrite an existing collection record
///
/// Fails with `CollectionNotFound` if it was deleted in the meantime.
pub fn save(db: &Database, collection_id: u64, record: &CollectionRecord) -> Result<()> {
    let write_txn = db.begin_write()?;
    {
        let mut collections = write_txn.open_table(tables::COLLECTIONS)?;
        if collections.get(collection_id)?.is_none() {
            return Err(AppError::CollectionNotFound);
        }
        let bytes = encode(record)?;
        collections.insert(collection_id, bytes.as_slice())?;
    }
    write_txn.commit()?;

    Ok(())
}

/// Delete a collection together with its membership rows
///
/// Returns `None` if the collection does not exist, otherwise the number of
/// membership rows removed.
pub fn delete(db: &Database, collection_id: u64) -> Result<Option<u64>> {
    let write_txn = db.begin_write()?;
    let removed = {
        let mut collections = write_txn.open_table(tables::COLLECTIONS)?;
        let Some(record) = collections
            .remove(collection_id)?
            .map(|bytes| decode::<CollectionRecord>(bytes.value()))
            .transpose()?
        else {
            return Ok(None);
        };

        let mut owner_index = write_txn.open_table(tables::USER_COLLECTIONS)?;
        owner_index.remove((record.owner_id, collection_id))?;

        let mut memberships = write_txn.open_table(tables::COLLECTION_MANTRAS)?;
        let mut keys = Vec::new();
        for entry in memberships.range(prefix_range(collection_id))? {
            let (key, _) = entry?;
            keys.push(key.value());
        }
        for key in &keys {
            memberships.remove(*key)?;
        }
        keys.len() as u64
    };
    write_txn.commit()?;

    Ok(Some(removed))
}

// =============================================================================
// Membership
// =============================================================================

pub fn membership_exists(db: &Database, collection_id: u64, mantra_id: u64) -> Result<bool> {
    let read_txn = db.begin_read()?;
    let memberships = read_txn.open_table(tables::COLLECTION_MANTRAS)?;
    Ok(memberships.get((collection_id, mantra_id))?.is_some())
}

/// Insert the (collection, mantra) pair
///
/// Never overwrites. Errors:
/// - `UniqueViolation("collection_mantras")` if the pair already exists
/// - `ForeignKeyViolation` if the collection or mantra does not exist
pub fn insert_membership(db: &Database, collection_id: u64, mantra_id: u64, now: i64) -> Result<()> {
    let write_txn = db.begin_write()?;
    {
        let collections = write_txn.open_table(tables::COLLECTIONS)?;
        if collections.get(collection_id)?.is_none() {
            return Err(AppError::ForeignKeyViolation("collections"));
        }

        let mantras = write_txn.open_table(tables::MANTRAS)?;
        if mantras.get(mantra_id)?.is_none() {
            return Err(AppError::ForeignKeyViolation("mantras"));
        }

        let mut memberships = write_txn.open_table(tables::COLLECTION_MANTRAS)?;
        if memberships.get((collection_id, mantra_id))?.is_some() {
            return Err(AppError::UniqueViolation("collection_mantras"));
        }

        // Positions are global and strictly increasing, so same-second adds keep their order
        let position = next_id(&write_txn, "collection_mantras")?;
        memberships.insert((collection_id, mantra_id), (position, now))?;
    }
    write_txn.commit()?;

    Ok(())
}

/// Delete the (collection, mantra) pair, returning rows affected (0 or 1)
pub fn delete_membership(db: &Database, collection_id: u64, mantra_id: u64) -> Result<u64> {
    let write_txn = db.begin_write()?;
    let removed = {
        let mut memberships = write_txn.open_table(tables::COLLECTION_MANTRAS)?;
        let removed = memberships.remove((collection_id, mantra_id))?.is_some();
        u64::from(removed)
    };
    write_txn.commit()?;

    Ok(removed)
}

/// Number of membership rows for the pair (0 or 1 while the key is the constraint)
pub fn membership_count(db: &Database, collection_id: u64, mantra_id: u64) -> Result<u64> {
    Ok(u64::from(membership_exists(db, collection_id, mantra_id)?))
}

/// Mantras in a collection, in the order they were added
pub fn mantras_in(db: &Database, collection_id: u64) -> Result<Vec<Mantra>> {
    let read_txn = db.begin_read()?;
    let memberships = read_txn.open_table(tables::COLLECTION_MANTRAS)?;
    let mantra_table = read_txn.open_table(tables::MANTRAS)?;
    let likes = read_txn.open_table(tables::MANTRA_LIKES)?;

    let mut rows = Vec::new();
    for entry in memberships.range(prefix_range(collection_id))? {
        let (key, value) = entry?;
        let (_, mantra_id) = key.value();
        let (position, _) = value.value();
        rows.push((position, mantra_id));
    }
    rows.sort_unstable();

    let mut result = Vec::with_capacity(rows.len());
    for (_, mantra_id) in rows {
        match mantras::load(&mantra_table, &likes, mantra_id)? {
            Some(mantra) => result.push(mantra),
            None => tracing::warn!(
                "Collection {} references missing mantra {}",
                collection_id,
                mantra_id
            ),
        }
    }

    Ok(result)
}
