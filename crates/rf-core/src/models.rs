//! # Domain Models
//!
//! These structs represent the core entities of Rusty-Feed.
//! We use UUID v7 for time-ordered, globally unique identification.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

/// Avatar assigned at signup when no image is uploaded.
/// Shared by many accounts, so it is never deleted from blob storage.
pub const DEFAULT_AVATAR: &str = "/images/avatar/default_user.png";

/// The authenticated identity behind a request, decoded from a session token.
/// Request-scoped; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub is_admin: bool,
}

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Unique across the store; the UNIQUE constraint is authoritative.
    pub email: String,
    /// Argon2 PHC string. Never serialized out through the API layer.
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    /// Media reference for the profile image, or [`DEFAULT_AVATAR`].
    pub avatar: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// A published post with its reaction state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    /// Immutable after creation.
    pub author_id: Uuid,
    pub content: String,
    /// Media reference handled by the MediaStore, if any.
    pub attachment: Option<String>,
    /// Derived counter; always equals `users_liked.len()`.
    pub likes: i64,
    /// Duplicate-free set of actors who liked this post.
    /// Only the reaction ledger may touch this field.
    pub users_liked: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn is_liked_by(&self, actor_id: Uuid) -> bool {
        self.users_liked.contains(&actor_id)
    }
}

/// Fields an author (or admin) may change on a post.
/// `id`, `author_id` and the reaction pair are deliberately absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostPatch {
    pub content: Option<String>,
    pub attachment: Option<String>,
}

/// Fields a user may change on their own profile.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar: Option<String>,
}

/// Result of a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub user_id: Uuid,
    pub is_admin: bool,
    pub token: String,
}
