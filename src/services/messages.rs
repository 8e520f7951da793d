use chrono::Utc;

use crate::db::{self, Db, with_db};
use crate::error::{AppError, Result};
use crate::models::{Conversation, Message, NewMessage, User};

pub async fn send(db: &Db, caller_id: u64, new: NewMessage) -> Result<Message> {
    let record = new.into_record(caller_id, Utc::now().timestamp())?;

    // Recipient existence is checked inside the store transaction
    let stored = record.clone();
    let message_id = match with_db(db, move |db| db::messages::create(db, &stored)).await {
        Ok(id) => id,
        Err(AppError::ForeignKeyViolation(_)) => return Err(AppError::RecipientNotFound),
        Err(e) => return Err(e),
    };

    tracing::info!(
        "User {} sent message {} to user {}",
        caller_id,
        message_id,
        record.recipient_id
    );
    Ok(Message::from_record(message_id, &record))
}

/// The caller's conversations, most recently active first
pub async fn inbox(db: &Db, caller_id: u64) -> Result<Vec<Conversation>> {
    let entries = with_db(db, move |db| db::messages::inbox(db, caller_id)).await?;

    Ok(entries
        .into_iter()
        .map(|entry| Conversation {
            user: User::from_record(entry.partner_id, &entry.partner),
            last_message: Message::from_record(entry.message_id, &entry.message),
        })
        .collect())
}

/// The partner and every message exchanged with them, oldest first
pub async fn conversation(db: &Db, caller_id: u64, partner_id: u64) -> Result<(User, Vec<Message>)> {
    let (partner, messages) = with_db(db, move |db| {
        // Unknown partner is a 404, not an empty thread
        let Some(partner) = db::users::get(db, partner_id)? else {
            return Err(AppError::RecipientNotFound);
        };
        Ok((partner, db::messages::thread(db, caller_id, partner_id)?))
    })
    .await?;

    Ok((
        User::from_record(partner_id, &partner),
        messages
            .iter()
            .map(|(id, record)| Message::from_record(*id, record))
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::temp_db;
    use crate::models::UserRecord;

    async fn user(db: &Db, name: &str) -> u64 {
        let record = UserRecord {
            username: name.to_string(),
            password_hash: "$argon2id$stub".to_string(),
            created_at: 1_000,
        };
        with_db(db, move |db| db::users::create(db, &record))
            .await
            .unwrap()
    }

    fn new_message(recipient_id: u64, content: &str) -> NewMessage {
        NewMessage {
            recipient_id,
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn test_send_and_read_conversation() {
        let (_dir, db) = temp_db();
        let alex = user(&db, "alex").await;
        let sam = user(&db, "sam").await;

        let sent = send(&db, alex, new_message(sam, " hi sam ")).await.unwrap();
        assert_eq!(sent.content, "hi sam");
        assert_eq!(sent.sender_id, alex);
        send(&db, sam, new_message(alex, "hi alex")).await.unwrap();

        let (partner, messages) = conversation(&db, sam, alex).await.unwrap();
        assert_eq!(partner.username, "alex");
        let contents: Vec<_> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["hi sam", "hi alex"]);

        let conversations = inbox(&db, alex).await.unwrap();
        assert_eq!(conversations.len(), 1);
        assert_eq!(conversations[0].user.id, sam);
        assert_eq!(conversations[0].last_message.content, "hi alex");
    }

    #[tokio::test]
    async fn test_unknown_recipient_is_not_found() {
        let (_dir, db) = temp_db();
        let alex = user(&db, "alex").await;

        assert!(matches!(
            send(&db, alex, new_message(42, "hello?")).await,
            Err(AppError::RecipientNotFound)
        ));
        assert!(matches!(
            conversation(&db, alex, 42).await,
            Err(AppError::RecipientNotFound)
        ));
    }
}
