use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use std::fs;

use crate::routes::extract::ApiQuery;
use crate::{AppError, AppState, db, error::Result};

/// Query parameters for admin stats endpoint
#[derive(Debug, Deserialize)]
pub struct AdminQuery {
    pub key: String,
}

/// Database statistics response
#[derive(Debug, Serialize)]
pub struct AdminStatsResponse {
    pub user_count: u64,
    pub mantra_count: u64,
    pub collection_count: u64,
    pub membership_count: u64,
    pub like_count: u64,
    pub message_count: u64,
    pub database_size_bytes: u64,
    pub database_size_human: String,
}

/// Format bytes into human-readable string
fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Admin stats endpoint
///
/// Returns row counts per table and the database file size.
///
/// GET /admin/stats?key=<admin_secret_key>
/// Disabled (401) unless `ADMIN_SECRET_KEY` is configured.
pub async fn admin_stats(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<AdminQuery>,
) -> Result<Json<AdminStatsResponse>> {
    // Check if admin endpoints are enabled
    let admin_key = state
        .config
        .admin_secret_key
        .as_ref()
        .ok_or(AppError::Unauthorized)?;

    // Verify the provided key matches
    if params.key != *admin_key {
        tracing::warn!("Invalid admin key attempt");
        return Err(AppError::Unauthorized);
    }

    // Get database file size
    let database_size_bytes = fs::metadata(&state.config.database_path)
        .map(|m| m.len())
        .unwrap_or(0);

    // Count records in database
    let stats = db::with_db(&state.db, db::stats).await?;

    tracing::info!(
        "Admin stats requested: {} users, {} collections, {} database",
        stats.users,
        stats.collections,
        format_bytes(database_size_bytes)
    );

    Ok(Json(AdminStatsResponse {
        user_count: stats.users,
        mantra_count: stats.mantras,
        collection_count: stats.collections,
        membership_count: stats.memberships,
        like_count: stats.likes,
        message_count: stats.messages,
        database_size_bytes,
        database_size_human: format_bytes(database_size_bytes),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 bytes");
        assert_eq!(format_bytes(2048), "2.00 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.00 MB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.00 GB");
    }
}
