use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::constants::*;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] redb::Error),

    #[error("Database open error: {0}")]
    DatabaseOpen(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::error::EncodeError),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] bincode::error::DecodeError),

    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    /// A row with the same key already exists in `table`.
    /// Mutators with idempotent semantics turn this into a success.
    #[error("Unique constraint violated on {0}")]
    UniqueViolation(&'static str),

    /// A referenced row in `table` does not exist.
    #[error("Foreign key violated on {0}")]
    ForeignKeyViolation(&'static str),

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Forbidden")]
    Forbidden,

    #[error("Collection not found")]
    CollectionNotFound,

    #[error("Mantra not found")]
    MantraNotFound,

    #[error("Mantra not found in collection")]
    MembershipNotFound,

    #[error("Like not found")]
    LikeNotFound,

    /// Token subject no longer exists
    #[error("User not found")]
    UserNotFound,

    /// A user addressed by id (message recipient, conversation partner) does not exist
    #[error("Recipient not found")]
    RecipientNotFound,

    #[error("User already exists")]
    UserAlreadyExists,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unauthorized")]
    Unauthorized,
}

impl AppError {
    /// HTTP status this error maps to
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated
            | AppError::InvalidCredentials
            | AppError::UserNotFound
            | AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::CollectionNotFound
            | AppError::MantraNotFound
            | AppError::MembershipNotFound
            | AppError::LikeNotFound
            | AppError::RecipientNotFound => StatusCode::NOT_FOUND,
            AppError::UserAlreadyExists => StatusCode::CONFLICT,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Implement IntoResponse to convert AppError into HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match self {
            AppError::Unauthenticated | AppError::UserNotFound => ERR_UNAUTHENTICATED,
            AppError::InvalidCredentials => ERR_INVALID_CREDENTIALS,
            AppError::Unauthorized => "Unauthorized",
            AppError::Forbidden => ERR_FORBIDDEN,
            AppError::CollectionNotFound => ERR_COLLECTION_NOT_FOUND,
            AppError::MantraNotFound => ERR_MANTRA_NOT_FOUND,
            AppError::MembershipNotFound => ERR_MEMBERSHIP_NOT_FOUND,
            AppError::LikeNotFound => ERR_LIKE_NOT_FOUND,
            AppError::RecipientNotFound => ERR_USER_NOT_FOUND,
            AppError::UserAlreadyExists => "Username is already taken",
            AppError::InvalidInput(ref msg) => msg.as_str(),
            ref internal => {
                tracing::error!("Internal error: {:?}", internal);
                ERR_INTERNAL
            }
        };

        let body = Json(json!({
            "status": "error",
            "message": message,
        }));

        (status, body).into_response()
    }
}

/// Result type alias for application results
pub type Result<T> = std::result::Result<T, AppError>;
