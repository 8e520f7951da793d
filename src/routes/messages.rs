use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::AppState;
use crate::auth::AuthUser;
use crate::error::Result;
use crate::models::{Conversation, Message, NewMessage, User};
use crate::routes::extract::{ApiJson, ApiPath};
use crate::routes::response::ApiResponse;
use crate::services::messages as service;

#[derive(Debug, Serialize)]
pub struct MessageData {
    pub message: Message,
}

#[derive(Debug, Serialize)]
pub struct ConversationsData {
    pub conversations: Vec<Conversation>,
}

#[derive(Debug, Serialize)]
pub struct ThreadData {
    pub user: User,
    pub messages: Vec<Message>,
}

/// GET /messages
pub async fn list_conversations(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ConversationsData>>> {
    let conversations = service::inbox(&state.db, user.id()).await?;

    Ok(Json(ApiResponse::success(ConversationsData { conversations })))
}

/// POST /messages
///
/// 404 if the recipient does not exist, 400 for empty content or a message to self.
pub async fn send_message(
    user: AuthUser,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<NewMessage>,
) -> Result<(StatusCode, Json<ApiResponse<MessageData>>)> {
    let message = service::send(&state.db, user.id(), payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(MessageData { message }).with_message("Message sent")),
    ))
}

/// GET /messages/{user_id}
pub async fn get_conversation(
    user: AuthUser,
    State(state): State<AppState>,
    ApiPath(partner_id): ApiPath<u64>,
) -> Result<Json<ApiResponse<ThreadData>>> {
    let (partner, messages) = service::conversation(&state.db, user.id(), partner_id).await?;

    Ok(Json(ApiResponse::success(ThreadData {
        user: partner,
        messages,
    })))
}
