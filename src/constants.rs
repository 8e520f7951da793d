/// Maximum collection name length (characters, after trimming)
pub const MAX_COLLECTION_NAME_LEN: usize = 100;

/// Maximum collection description length (characters)
pub const MAX_COLLECTION_DESCRIPTION_LEN: usize = 500;

/// Maximum mantra title length (characters)
pub const MAX_MANTRA_TITLE_LEN: usize = 200;

/// Maximum length of the key takeaway and each narrative field of a mantra
pub const MAX_MANTRA_TEXT_LEN: usize = 1000;

/// Username length bounds
pub const MIN_USERNAME_LEN: usize = 3;
pub const MAX_USERNAME_LEN: usize = 32;

/// Minimum password length
pub const MIN_PASSWORD_LEN: usize = 8;

/// Default bearer token lifetime (30 days)
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 2_592_000;

/// Upper bound accepted for `TOKEN_TTL_SECS` (one year)
pub const MAX_TOKEN_TTL_SECS: i64 = 31_536_000;

/// Maximum chat message length (characters, after trimming)
pub const MAX_MESSAGE_LEN: usize = 2000;

// =============================================================================
// Error Messages
// =============================================================================

pub const ERR_COLLECTION_NOT_FOUND: &str = "Collection not found";

pub const ERR_MANTRA_NOT_FOUND: &str = "Mantra not found";

pub const ERR_MEMBERSHIP_NOT_FOUND: &str = "Mantra not found in collection";

pub const ERR_LIKE_NOT_FOUND: &str = "Like not found";

pub const ERR_USER_NOT_FOUND: &str = "User not found";

pub const ERR_FORBIDDEN: &str = "You do not have permission to access this collection";

pub const ERR_UNAUTHENTICATED: &str = "Authentication required";

pub const ERR_INVALID_CREDENTIALS: &str = "Invalid username or password";

pub const ERR_INTERNAL: &str = "Internal server error";

pub const ERR_COLLECTION_NAME_REQUIRED: &str = "Collection name is required";

pub const ERR_INVALID_USERNAME: &str =
    "Username must be 3-32 characters of letters, digits or underscores";

pub const ERR_PASSWORD_TOO_SHORT: &str = "Password must be at least 8 characters";

pub const ERR_MESSAGE_CONTENT_REQUIRED: &str = "Message content is required";

pub const ERR_MESSAGE_TO_SELF: &str = "Cannot send a message to yourself";
