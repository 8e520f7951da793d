//! Direct messages between two users.
//!
//! Threads are keyed by the ordered user pair, so both participants read the
//! same conversation with one range scan. The inbox index keeps, per user and
//! partner, the id of the latest message exchanged.

use redb::{Database, ReadableDatabase, ReadableTable};

use crate::db::{decode, encode, next_id, prefix_range, tables};
use crate::error::{AppError, Result};
use crate::models::{MessageRecord, UserRecord};

/// Latest exchange with one partner, as listed in a user's inbox
#[derive(Debug, Clone)]
pub struct InboxEntry {
    pub partner_id: u64,
    pub partner: UserRecord,
    pub message_id: u64,
    pub message: MessageRecord,
}

fn thread_key(a: u64, b: u64) -> (u64, u64) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Store a message and update both participants' inbox entries
///
/// Fails with `ForeignKeyViolation("users")` if the recipient does not exist.
pub fn create(db: &Database, record: &MessageRecord) -> Result<u64> {
    let write_txn = db.begin_write()?;
    let message_id = {
        let users = write_txn.open_table(tables::USERS)?;
        if users.get(record.recipient_id)?.is_none() {
            return Err(AppError::ForeignKeyViolation("users"));
        }

        let message_id = next_id(&write_txn, "messages")?;

        let mut messages = write_txn.open_table(tables::MESSAGES)?;
        let bytes = encode(record)?;
        messages.insert(message_id, bytes.as_slice())?;

        let (low, high) = thread_key(record.sender_id, record.recipient_id);
        let mut threads = write_txn.open_table(tables::MESSAGE_THREADS)?;
        threads.insert((low, high, message_id), ())?;

        let mut inbox = write_txn.open_table(tables::USER_CONVERSATIONS)?;
        inbox.insert((record.sender_id, record.recipient_id), message_id)?;
        inbox.insert((record.recipient_id, record.sender_id), message_id)?;
        message_id
    };
    write_txn.commit()?;

    Ok(message_id)
}

/// Messages exchanged between two users, oldest first
pub fn thread(db: &Database, a: u64, b: u64) -> Result<Vec<(u64, MessageRecord)>> {
    let read_txn = db.begin_read()?;
    let threads = read_txn.open_table(tables::MESSAGE_THREADS)?;
    let messages = read_txn.open_table(tables::MESSAGES)?;

    let (low, high) = thread_key(a, b);
    let mut result = Vec::new();
    for entry in threads.range((low, high, 0)..=(low, high, u64::MAX))? {
        let (key, _) = entry?;
        let (_, _, message_id) = key.value();

        match messages.get(message_id)? {
            Some(bytes) => result.push((message_id, decode(bytes.value())?)),
            None => tracing::warn!("Thread index points at missing message {}", message_id),
        }
    }

    Ok(result)
}

/// A user's conversations, most recently active first
pub fn inbox(db: &Database, user_id: u64) -> Result<Vec<InboxEntry>> {
    let read_txn = db.begin_read()?;
    let conversations = read_txn.open_table(tables::USER_CONVERSATIONS)?;
    let users = read_txn.open_table(tables::USERS)?;
    let messages = read_txn.open_table(tables::MESSAGES)?;

    let mut latest = Vec::new();
    for entry in conversations.range(prefix_range(user_id))? {
        let (key, message_id) = entry?;
        let (_, partner_id) = key.value();
        latest.push((message_id.value(), partner_id));
    }
    // Message ids grow with time
    latest.sort_unstable_by(|a, b| b.cmp(a));

    let mut result = Vec::with_capacity(latest.len());
    for (message_id, partner_id) in latest {
        let partner = users
            .get(partner_id)?
            .map(|bytes| decode::<UserRecord>(bytes.value()))
            .transpose()?;
        let message = messages
            .get(message_id)?
            .map(|bytes| decode::<MessageRecord>(bytes.value()))
            .transpose()?;

        let (Some(partner), Some(message)) = (partner, message) else {
            tracing::warn!(
                "Inbox of user {} has a dangling entry (partner {}, message {})",
                user_id,
                partner_id,
                message_id
            );
            continue;
        };
        result.push(InboxEntry {
            partner_id,
            partner,
            message_id,
            message,
        });
    }

    Ok(result)
}
