pub mod admin;
pub mod auth;
pub mod collections;
pub mod extract;
pub mod health;
pub mod mantras;
pub mod messages;
pub mod response;

use axum::{
    Router,
    routing::{get, post},
};

use crate::AppState;

pub use admin::admin_stats;
pub use auth::{login, me, register};
pub use collections::{
    add_mantra_to_collection, create_collection, delete_collection, get_collection,
    list_collections, remove_mantra_from_collection, update_collection,
};
pub use health::health_check;
pub use mantras::{create_mantra, get_mantra, like_mantra, list_mantras, unlike_mantra};
pub use messages::{get_conversation, list_conversations, send_message};

/// Build the application router (without CORS or tracing layers)
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/mantras", get(list_mantras).post(create_mantra))
        .route("/mantras/{id}", get(get_mantra))
        .route("/mantras/{id}/like", post(like_mantra).delete(unlike_mantra))
        .route("/collections", get(list_collections).post(create_collection))
        .route(
            "/collections/{id}",
            get(get_collection)
                .put(update_collection)
                .delete(delete_collection),
        )
        .route(
            "/collections/{id}/mantras/{mantra_id}",
            post(add_mantra_to_collection).delete(remove_mantra_from_collection),
        )
        .route("/messages", get(list_conversations).post(send_message))
        .route("/messages/{user_id}", get(get_conversation))
        .route("/admin/stats", get(admin_stats))
        .with_state(state)
}
