use redb::{Database, ReadOnlyTable, ReadableDatabase, ReadableTable};

use crate::db::{count_prefix, decode, encode, next_id, tables};
use crate::error::{AppError, Result};
use crate::models::{Mantra, MantraRecord};

pub fn create(db: &Database, record: &MantraRecord) -> Result<u64> {
    let write_txn = db.begin_write()?;
    let mantra_id = {
        let mantra_id = next_id(&write_txn, "mantras")?;
        let mut mantras = write_txn.open_table(tables::MANTRAS)?;
        let bytes = encode(record)?;
        mantras.insert(mantra_id, bytes.as_slice())?;
        mantra_id
    };
    write_txn.commit()?;

    Ok(mantra_id)
}

/// Load one mantra with its like count from already-open tables
pub(crate) fn load(
    mantras: &ReadOnlyTable<u64, &'static [u8]>,
    likes: &ReadOnlyTable<(u64, u64), i64>,
    mantra_id: u64,
) -> Result<Option<Mantra>> {
    let Some(record) = mantras
        .get(mantra_id)?
        .map(|bytes| decode::<MantraRecord>(bytes.value()))
        .transpose()?
    else {
        return Ok(None);
    };

    let like_count = count_prefix(likes, mantra_id)?;
    Ok(Some(Mantra::from_record(mantra_id, record, like_count)))
}

pub fn get(db: &Database, mantra_id: u64) -> Result<Option<Mantra>> {
    let read_txn = db.begin_read()?;
    let mantras = read_txn.open_table(tables::MANTRAS)?;
    let likes = read_txn.open_table(tables::MANTRA_LIKES)?;
    load(&mantras, &likes, mantra_id)
}

pub fn exists(db: &Database, mantra_id: u64) -> Result<bool> {
    let read_txn = db.begin_read()?;
    let mantras = read_txn.open_table(tables::MANTRAS)?;
    Ok(mantras.get(mantra_id)?.is_some())
}

/// All mantras ordered by id
pub fn list(db: &Database) -> Result<Vec<Mantra>> {
    let read_txn = db.begin_read()?;
    let mantras = read_txn.open_table(tables::MANTRAS)?;
    let likes = read_txn.open_table(tables::MANTRA_LIKES)?;

    let mut result = Vec::new();
    for entry in mantras.iter()? {
        let (id, bytes) = entry?;
        let mantra_id = id.value();
        let record: MantraRecord = decode(bytes.value())?;
        let like_count = count_prefix(&likes, mantra_id)?;
        result.push(Mantra::from_record(mantra_id, record, like_count));
    }

    Ok(result)
}

// =============================================================================
// Likes
// =============================================================================

pub fn like_exists(db: &Database, mantra_id: u64, user_id: u64) -> Result<bool> {
    let read_txn = db.begin_read()?;
    let likes = read_txn.open_table(tables::MANTRA_LIKES)?;
    Ok(likes.get((mantra_id, user_id))?.is_some())
}

/// Insert a like for (mantra, user)
///
/// Never overwrites: an existing pair yields `UniqueViolation`, a missing
/// mantra yields `ForeignKeyViolation`.
pub fn insert_like(db: &Database, mantra_id: u64, user_id: u64, now: i64) -> Result<()> {
    let write_txn = db.begin_write()?;
    {
        let mantras = write_txn.open_table(tables::MANTRAS)?;
        if mantras.get(mantra_id)?.is_none() {
            return Err(AppError::ForeignKeyViolation("mantras"));
        }

        let mut likes = write_txn.open_table(tables::MANTRA_LIKES)?;
        if likes.get((mantra_id, user_id))?.is_some() {
            return Err(AppError::UniqueViolation("mantra_likes"));
        }
        likes.insert((mantra_id, user_id), now)?;
    }
    write_txn.commit()?;

    Ok(())
}

/// Delete a like, returning the number of rows removed (0 or 1)
pub fn delete_like(db: &Database, mantra_id: u64, user_id: u64) -> Result<u64> {
    let write_txn = db.begin_write()?;
    let removed = {
        let mut likes = write_txn.open_table(tables::MANTRA_LIKES)?;
        let removed = likes.remove((mantra_id, user_id))?.is_some();
        u64::from(removed)
    };
    write_txn.commit()?;

    Ok(removed)
}
