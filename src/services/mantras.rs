use chrono::Utc;

use crate::db::{self, Db, with_db};
use crate::error::{AppError, Result};
use crate::models::{Mantra, NewMantra};
use crate::services::{Insertion, resolve_insert};

pub async fn list(db: &Db) -> Result<Vec<Mantra>> {
    with_db(db, db::mantras::list).await
}

pub async fn get(db: &Db, mantra_id: u64) -> Result<Mantra> {
    with_db(db, move |db| db::mantras::get(db, mantra_id))
        .await?
        .ok_or(AppError::MantraNotFound)
}

pub async fn create(db: &Db, caller_id: u64, new: NewMantra) -> Result<Mantra> {
    let record = new.into_record(caller_id, Utc::now().timestamp())?;

    let stored = record.clone();
    let mantra_id = with_db(db, move |db| db::mantras::create(db, &stored)).await?;

    tracing::info!("User {} created mantra {}", caller_id, mantra_id);
    Ok(Mantra::from_record(mantra_id, record, 0))
}

/// Like a mantra; liking twice succeeds with `AlreadyPresent`
pub async fn like(db: &Db, mantra_id: u64, caller_id: u64) -> Result<Insertion> {
    let (found, liked) = with_db(db, move |db| {
        Ok((
            db::mantras::exists(db, mantra_id)?,
            db::mantras::like_exists(db, mantra_id, caller_id)?,
        ))
    })
    .await?;

    // Mantra must exist before it can be liked
    if !found {
        return Err(AppError::MantraNotFound);
    }
    if liked {
        return Ok(Insertion::AlreadyPresent);
    }

    let now = Utc::now().timestamp();
    let result = with_db(db, move |db| {
        db::mantras::insert_like(db, mantra_id, caller_id, now)
    })
    .await;

    let outcome = resolve_insert(result)?;
    if outcome == Insertion::Inserted {
        tracing::info!("User {} liked mantra {}", caller_id, mantra_id);
    }
    Ok(outcome)
}

pub async fn unlike(db: &Db, mantra_id: u64, caller_id: u64) -> Result<()> {
    let removed = with_db(db, move |db| db::mantras::delete_like(db, mantra_id, caller_id)).await?;
    if removed == 0 {
        return Err(AppError::LikeNotFound);
    }

    tracing::info!("User {} unliked mantra {}", caller_id, mantra_id);
    Ok(())
}
