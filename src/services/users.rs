use chrono::Utc;

use crate::config::Config;
use crate::constants::{ERR_INVALID_USERNAME, ERR_PASSWORD_TOO_SHORT, MIN_PASSWORD_LEN};
use crate::db::{self, Db, with_db};
use crate::error::{AppError, Result};
use crate::models::{User, UserRecord};
use crate::security::{hash_password, issue_token, verify_password};

/// A user together with a freshly issued bearer token
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub token: String,
}

fn start_session(config: &Config, user: User, now: i64) -> Result<Session> {
    let token = issue_token(user.id, now, config.token_ttl_secs, &config.app_secret_key)?;
    Ok(Session { user, token })
}

pub async fn register(db: &Db, config: &Config, username: &str, password: &str) -> Result<Session> {
    // Validate input before doing any expensive hashing
    let username = User::normalize_username(username);
    if !User::validate_username(&username) {
        return Err(AppError::InvalidInput(ERR_INVALID_USERNAME.to_string()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::InvalidInput(ERR_PASSWORD_TOO_SHORT.to_string()));
    }

    // Hash password (argon2 is CPU-bound)
    let now = Utc::now().timestamp();
    let password = password.to_string();
    let record = tokio::task::spawn_blocking(move || -> Result<UserRecord> {
        Ok(UserRecord {
            username,
            password_hash: hash_password(&password)?,
            created_at: now,
        })
    })
    .await??;

    // Store user; the username index rejects duplicates
    let stored = record.clone();
    let user_id = match with_db(db, move |db| db::users::create(db, &stored)).await {
        Ok(id) => id,
        Err(AppError::UniqueViolation(_)) => {
            tracing::info!("Registration rejected: username taken");
            return Err(AppError::UserAlreadyExists);
        }
        Err(e) => return Err(e),
    };

    tracing::info!("New user registered: {}", user_id);
    start_session(config, User::from_record(user_id, &record), now)
}

pub async fn login(db: &Db, config: &Config, username: &str, password: &str) -> Result<Session> {
    let username = User::normalize_username(username);
    let found = with_db(db, move |db| db::users::find_by_username(db, &username)).await?;

    let Some((user_id, record)) = found else {
        tracing::warn!("Login attempt for unknown username");
        return Err(AppError::InvalidCredentials);
    };

    // Verify password off the async runtime
    let password = password.to_string();
    let hash = record.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || verify_password(&password, &hash)).await?;
    if !valid {
        tracing::warn!("Invalid password for user {}", user_id);
        return Err(AppError::InvalidCredentials);
    }

    start_session(config, User::from_record(user_id, &record), Utc::now().timestamp())
}

pub async fn get(db: &Db, user_id: u64) -> Result<User> {
    with_db(db, move |db| db::users::get(db, user_id))
        .await?
        .map(|record| User::from_record(user_id, &record))
        .ok_or(AppError::UserNotFound)
}
