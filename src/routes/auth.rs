use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::auth::AuthUser;
use crate::error::Result;
use crate::models::User;
use crate::routes::extract::ApiJson;
use crate::routes::response::ApiResponse;
use crate::services::users::{self as service, Session};

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionData {
    pub user: User,
    pub token: String,
}

impl From<Session> for SessionData {
    fn from(session: Session) -> Self {
        Self {
            user: session.user,
            token: session.token,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserData {
    pub user: User,
}

/// Register a new user
///
/// Returns 201 with the user and a bearer token, 409 if the username is
/// taken, 400 if the username or password is malformed.
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CredentialsRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SessionData>>)> {
    let session =
        service::register(&state.db, &state.config, &payload.username, &payload.password).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(SessionData::from(session)).with_message("User registered")),
    ))
}

/// Exchange username and password for a bearer token
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CredentialsRequest>,
) -> Result<Json<ApiResponse<SessionData>>> {
    let session =
        service::login(&state.db, &state.config, &payload.username, &payload.password).await?;

    Ok(Json(ApiResponse::success(SessionData::from(session))))
}

/// Current user
pub async fn me(user: AuthUser, State(state): State<AppState>) -> Result<Json<ApiResponse<UserData>>> {
    let user = service::get(&state.db, user.id()).await?;

    Ok(Json(ApiResponse::success(UserData { user })))
}
