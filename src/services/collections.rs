use chrono::Utc;

use crate::db::{self, Db, with_db};
use crate::error::{AppError, Result};
use crate::models::collection::{validate_description, validate_name};
use crate::models::{Collection, CollectionChanges, CollectionRecord, Mantra};
use crate::services::{Insertion, resolve_insert};

/// Fetch a collection and check that `caller_id` owns it
///
/// Missing → `CollectionNotFound`; owned by someone else → `Forbidden`.
/// Not-found always wins over forbidden.
pub async fn ensure_owner(db: &Db, collection_id: u64, caller_id: u64) -> Result<CollectionRecord> {
    let record = with_db(db, move |db| db::collections::get(db, collection_id))
        .await?
        .ok_or(AppError::CollectionNotFound)?;

    check_owner(collection_id, &record, caller_id)?;
    Ok(record)
}

fn check_owner(collection_id: u64, record: &CollectionRecord, caller_id: u64) -> Result<()> {
    if record.owner_id != caller_id {
        tracing::warn!(
            "User {} denied access to collection {} owned by {}",
            caller_id,
            collection_id,
            record.owner_id
        );
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub async fn list(db: &Db, caller_id: u64) -> Result<Vec<Collection>> {
    let rows = with_db(db, move |db| db::collections::list_for_owner(db, caller_id)).await?;

    Ok(rows
        .into_iter()
        .map(|(id, record, count)| Collection::from_record(id, &record).with_mantra_count(count))
        .collect())
}

pub async fn detail(db: &Db, collection_id: u64, caller_id: u64) -> Result<(Collection, Vec<Mantra>)> {
    let record = ensure_owner(db, collection_id, caller_id).await?;
    let mantras = with_db(db, move |db| db::collections::mantras_in(db, collection_id)).await?;

    Ok((Collection::from_record(collection_id, &record), mantras))
}

pub async fn create(
    db: &Db,
    caller_id: u64,
    name: &str,
    description: Option<&str>,
) -> Result<Collection> {
    let now = Utc::now().timestamp();
    let record = CollectionRecord {
        owner_id: caller_id,
        name: validate_name(name)?,
        description: validate_description(description)?,
        created_at: now,
        updated_at: now,
    };

    let stored = record.clone();
    let collection_id = with_db(db, move |db| db::collections::create(db, &stored)).await?;

    tracing::info!("User {} created collection {}", caller_id, collection_id);
    Ok(Collection::from_record(collection_id, &record))
}

pub async fn update(
    db: &Db,
    collection_id: u64,
    caller_id: u64,
    changes: CollectionChanges,
) -> Result<Collection> {
    let mut record = ensure_owner(db, collection_id, caller_id).await?;

    // Validate and merge the provided fields
    changes.apply(&mut record, Utc::now().timestamp())?;

    let stored = record.clone();
    with_db(db, move |db| db::collections::save(db, collection_id, &stored)).await?;

    tracing::info!("User {} updated collection {}", caller_id, collection_id);
    Ok(Collection::from_record(collection_id, &record))
}

pub async fn delete(db: &Db, collection_id: u64, caller_id: u64) -> Result<()> {
    ensure_owner(db, collection_id, caller_id).await?;

    // Memberships go in the same transaction as the collection
    let removed = with_db(db, move |db| db::collections::delete(db, collection_id))
        .await?
        .ok_or(AppError::CollectionNotFound)?;

    tracing::info!(
        "User {} deleted collection {} ({} memberships removed)",
        caller_id,
        collection_id,
        removed
    );
    Ok(())
}

/// Add a mantra to a collection
///
/// Owner-only. Adding a mantra that is already in the collection succeeds
/// with [`Insertion::AlreadyPresent`], including when a concurrent request
/// inserts it between our existence check and our insert.
pub async fn add_mantra(
    db: &Db,
    collection_id: u64,
    mantra_id: u64,
    caller_id: u64,
) -> Result<Insertion> {
    // 1. Collection must exist and belong to the caller
    ensure_owner(db, collection_id, caller_id).await?;

    // 2. Cheap path for a repeated add
    let exists = with_db(db, move |db| {
        db::collections::membership_exists(db, collection_id, mantra_id)
    })
    .await?;
    if exists {
        tracing::debug!(
            "Mantra {} already in collection {}",
            mantra_id,
            collection_id
        );
        return Ok(Insertion::AlreadyPresent);
    }

    // 3. Insert; a concurrent add surfaces here as a uniqueness violation
    let outcome = insert_after_check(db, collection_id, mantra_id).await?;
    if outcome == Insertion::Inserted {
        tracing::info!(
            "User {} added mantra {} to collection {}",
            caller_id,
            mantra_id,
            collection_id
        );
    }
    Ok(outcome)
}

/// Second half of `add_mantra`: the insert that follows a negative existence check
pub(crate) async fn insert_after_check(
    db: &Db,
    collection_id: u64,
    mantra_id: u64,
) -> Result<Insertion> {
    let now = Utc::now().timestamp();
    let result = with_db(db, move |db| {
        db::collections::insert_membership(db, collection_id, mantra_id, now)
    })
    .await;

    resolve_insert(result)
}

/// Remove a mantra from a collection
///
/// Owner-only. `MembershipNotFound` if the mantra was not in the collection.
pub async fn remove_mantra(
    db: &Db,
    collection_id: u64,
    mantra_id: u64,
    caller_id: u64,
) -> Result<()> {
    ensure_owner(db, collection_id, caller_id).await?;

    // Zero rows affected means the mantra was never in the collection
    let removed = with_db(db, move |db| {
        db::collections::delete_membership(db, collection_id, mantra_id)
    })
    .await?;
    if removed == 0 {
        return Err(AppError::MembershipNotFound);
    }

    tracing::info!(
        "User {} removed mantra {} from collection {}",
        caller_id,
        mantra_id,
        collection_id
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{sample_mantra, temp_db};

    const OWNER: u64 = 1;
    const STRANGER: u64 = 2;

    async fn seed(db: &Db) -> (u64, u64) {
        let collection = create(db, OWNER, "Morning", Some("Start the day"))
            .await
            .unwrap();
        let mantra_id = with_db(db, |db| db::mantras::create(db, &sample_mantra("Calm")))
            .await
            .unwrap();
        (collection.id, mantra_id)
    }

    async fn row_count(db: &Db, collection_id: u64, mantra_id: u64) -> u64 {
        with_db(db, move |db| {
            db::collections::membership_count(db, collection_id, mantra_id)
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_add_twice_reports_already_exists() {
        let (_dir, db) = temp_db();
        let (collection_id, mantra_id) = seed(&db).await;

        let first = add_mantra(&db, collection_id, mantra_id, OWNER).await.unwrap();
        let second = add_mantra(&db, collection_id, mantra_id, OWNER).await.unwrap();

        assert_eq!(first, Insertion::Inserted);
        assert_eq!(second, Insertion::AlreadyPresent);
        assert_eq!(row_count(&db, collection_id, mantra_id).await, 1);
    }

    #[tokio::test]
    async fn test_insert_losing_race_is_success() {
        let (_dir, db) = temp_db();
        let (collection_id, mantra_id) = seed(&db).await;

        // Another request lands its insert after our (negative) existence check
        with_db(&db, move |db| {
            db::collections::insert_membership(db, collection_id, mantra_id, 0)
        })
        .await
        .unwrap();

        let outcome = insert_after_check(&db, collection_id, mantra_id).await.unwrap();

        assert_eq!(outcome, Insertion::AlreadyPresent);
        assert_eq!(row_count(&db, collection_id, mantra_id).await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_adds_leave_one_row() {
        let (_dir, db) = temp_db();
        let (collection_id, mantra_id) = seed(&db).await;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let db = db.clone();
                tokio::spawn(async move { add_mantra(&db, collection_id, mantra_id, OWNER).await })
            })
            .collect();

        let mut inserted = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap() == Insertion::Inserted {
                inserted += 1;
            }
        }

        assert_eq!(inserted, 1);
        assert_eq!(row_count(&db, collection_id, mantra_id).await, 1);
    }

    #[tokio::test]
    async fn test_add_unknown_mantra_is_internal_error() {
        let (_dir, db) = temp_db();
        let (collection_id, _) = seed(&db).await;

        let err = add_mantra(&db, collection_id, 999, OWNER).await.unwrap_err();

        assert!(matches!(err, AppError::ForeignKeyViolation("mantras")));
    }

    #[tokio::test]
    async fn test_ownership_guard() {
        let (_dir, db) = temp_db();
        let (collection_id, mantra_id) = seed(&db).await;

        assert!(matches!(
            ensure_owner(&db, collection_id, STRANGER).await,
            Err(AppError::Forbidden)
        ));
        assert!(matches!(
            add_mantra(&db, collection_id, mantra_id, STRANGER).await,
            Err(AppError::Forbidden)
        ));
        assert!(matches!(
            remove_mantra(&db, collection_id, 999, STRANGER).await,
            Err(AppError::Forbidden)
        ));
        assert!(matches!(
            delete(&db, collection_id, STRANGER).await,
            Err(AppError::Forbidden)
        ));
        assert_eq!(ensure_owner(&db, collection_id, OWNER).await.unwrap().name, "Morning");
    }

    #[tokio::test]
    async fn test_not_found_precedes_forbidden() {
        let (_dir, db) = temp_db();

        assert!(matches!(
            ensure_owner(&db, 404, STRANGER).await,
            Err(AppError::CollectionNotFound)
        ));
        assert!(matches!(
            remove_mantra(&db, 404, 1, STRANGER).await,
            Err(AppError::CollectionNotFound)
        ));
    }

    #[tokio::test]
    async fn test_remove_then_remove_again() {
        let (_dir, db) = temp_db();
        let (collection_id, mantra_id) = seed(&db).await;
        add_mantra(&db, collection_id, mantra_id, OWNER).await.unwrap();

        remove_mantra(&db, collection_id, mantra_id, OWNER).await.unwrap();
        assert_eq!(row_count(&db, collection_id, mantra_id).await, 0);

        assert!(matches!(
            remove_mantra(&db, collection_id, mantra_id, OWNER).await,
            Err(AppError::MembershipNotFound)
        ));
    }

    #[tokio::test]
    async fn test_update_and_detail() {
        let (_dir, db) = temp_db();
        let (collection_id, mantra_id) = seed(&db).await;
        add_mantra(&db, collection_id, mantra_id, OWNER).await.unwrap();

        let updated = update(
            &db,
            collection_id,
            OWNER,
            CollectionChanges {
                name: Some("  Night ".to_string()),
                description: Some(String::new()),
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.name, "Night");
        assert_eq!(updated.description, None);

        let (collection, mantras) = detail(&db, collection_id, OWNER).await.unwrap();
        assert_eq!(collection.name, "Night");
        assert_eq!(mantras.len(), 1);
        assert_eq!(mantras[0].id, mantra_id);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let (_dir, db) = temp_db();

        assert!(matches!(
            create(&db, OWNER, "   ", None).await,
            Err(AppError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_list_only_own_collections() {
        let (_dir, db) = temp_db();
        let (collection_id, mantra_id) = seed(&db).await;
        add_mantra(&db, collection_id, mantra_id, OWNER).await.unwrap();
        create(&db, STRANGER, "Theirs", None).await.unwrap();

        let mine = list(&db, OWNER).await.unwrap();

        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, collection_id);
        assert_eq!(mine[0].mantra_count, Some(1));
    }

    #[tokio::test]
    async fn test_delete_cascades() {
        let (_dir, db) = temp_db();
        let (collection_id, mantra_id) = seed(&db).await;
        add_mantra(&db, collection_id, mantra_id, OWNER).await.unwrap();

        delete(&db, collection_id, OWNER).await.unwrap();

        assert_eq!(row_count(&db, collection_id, mantra_id).await, 0);
        assert!(matches!(
            delete(&db, collection_id, OWNER).await,
            Err(AppError::CollectionNotFound)
        ));
    }
}
