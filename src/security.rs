use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use sha2::Sha256;

use crate::error::{AppError, Result};

type HmacSha256 = Hmac<Sha256>;

// =============================================================================
// Password Hashing
// =============================================================================

/// Hash a password with argon2id and a random salt (PHC string format)
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Crypto(e.to_string()))
}

/// Check a password against a stored PHC hash
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    let hash = match PasswordHash::new(password_hash) {
        Ok(hash) => hash,
        Err(err) => {
            tracing::error!("Failed to parse password hash: {}", err);
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &hash)
        .is_ok()
}

// =============================================================================
// Bearer Tokens
// =============================================================================

/// Compute the hex HMAC-SHA256 of `data`
fn sign(data: &str, secret: &str) -> Option<String> {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => {
            tracing::error!("Failed to create HMAC instance");
            return None;
        }
    };
    mac.update(data.as_bytes());
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// Verify HMAC-SHA256 signature
///
/// Comparison happens inside `verify_slice`, which is constant time.
pub fn verify_hmac(data: &str, signature: &str, secret: &str) -> bool {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => {
            tracing::error!("Failed to create HMAC instance");
            return false;
        }
    };

    mac.update(data.as_bytes());

    let sig_bytes = match hex::decode(signature) {
        Ok(bytes) => bytes,
        Err(_) => {
            tracing::warn!("Invalid hex signature format");
            return false;
        }
    };

    mac.verify_slice(&sig_bytes).is_ok()
}

/// Issue a bearer token for `user_id`
///
/// Format: `<user_id>.<expires_at>.<hex hmac of "user_id.expires_at">`
pub fn issue_token(user_id: u64, now: i64, ttl_secs: i64, secret: &str) -> Result<String> {
    let payload = format!("{}.{}", user_id, now.saturating_add(ttl_secs));
    let signature = sign(&payload, secret)
        .ok_or_else(|| AppError::Crypto("token signing failed".to_string()))?;
    Ok(format!("{}.{}", payload, signature))
}

/// Validate a bearer token and return the user id it was issued for
///
/// Returns `None` for malformed, tampered or expired tokens.
pub fn verify_token(token: &str, now: i64, secret: &str) -> Option<u64> {
    let mut parts = token.splitn(3, '.');
    let user_part = parts.next()?;
    let expiry_part = parts.next()?;
    let signature = parts.next()?;

    let user_id: u64 = user_part.parse().ok()?;
    let expires_at: i64 = expiry_part.parse().ok()?;

    if !verify_hmac(&format!("{}.{}", user_part, expiry_part), signature, secret) {
        tracing::warn!("Rejected token with invalid signature");
        return None;
    }

    if now >= expires_at {
        tracing::debug!("Rejected expired token for user {}", user_id);
        return None;
    }

    Some(user_id)
}
