use redb::{Database, ReadableDatabase, ReadableTable};

use crate::db::{decode, encode, next_id, tables};
use crate::error::{AppError, Result};
use crate::models::UserRecord;

/// Insert a new user
///
/// Fails with `UniqueViolation("usernames")` if the username is taken.
pub fn create(db: &Database, record: &UserRecord) -> Result<u64> {
    let write_txn = db.begin_write()?;
    let user_id = {
        let mut usernames = write_txn.open_table(tables::USERNAMES)?;
        if usernames.get(record.username.as_str())?.is_some() {
            return Err(AppError::UniqueViolation("usernames"));
        }

        let user_id = next_id(&write_txn, "users")?;
        usernames.insert(record.username.as_str(), user_id)?;

        let mut users = write_txn.open_table(tables::USERS)?;
        let bytes = encode(record)?;
        users.insert(user_id, bytes.as_slice())?;
        user_id
    };
    write_txn.commit()?;

    Ok(user_id)
}

pub fn get(db: &Database, user_id: u64) -> Result<Option<UserRecord>> {
    let read_txn = db.begin_read()?;
    let users = read_txn.open_table(tables::USERS)?;
    users
        .get(user_id)?
        .map(|bytes| decode(bytes.value()))
        .transpose()
}

/// Look up a user by normalized username
pub fn find_by_username(db: &Database, username: &str) -> Result<Option<(u64, UserRecord)>> {
    let read_txn = db.begin_read()?;
    let usernames = read_txn.open_table(tables::USERNAMES)?;
    let Some(user_id) = usernames.get(username)?.map(|v| v.value()) else {
        return Ok(None);
    };

    let users = read_txn.open_table(tables::USERS)?;
    let record = users
        .get(user_id)?
        .map(|bytes| decode::<UserRecord>(bytes.value()))
        .transpose()?;

    Ok(record.map(|r| (user_id, r)))
}
