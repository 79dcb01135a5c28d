//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the binary.

use async_trait::async_trait;
use crate::error::Result;
use crate::models::{Actor, Post, PostPatch, User, UserPatch};
use uuid::Uuid;

/// Data persistence contract for user accounts.
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn insert_user(&self, user: User) -> Result<()>;
    async fn find_user(&self, id: Uuid) -> Result<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn update_user(&self, id: Uuid, patch: &UserPatch) -> Result<()>;
    async fn delete_user(&self, id: Uuid) -> Result<()>;
}

/// Data persistence contract for posts and their reaction state.
#[async_trait]
pub trait PostRepo: Send + Sync {
    async fn insert_post(&self, post: Post) -> Result<()>;
    async fn find_post(&self, id: Uuid) -> Result<Option<Post>>;
    async fn list_posts(&self) -> Result<Vec<Post>>;
    /// Partial update of author-editable fields only.
    async fn update_post(&self, id: Uuid, patch: &PostPatch) -> Result<()>;
    async fn delete_post(&self, id: Uuid) -> Result<()>;

    /// Compare-and-swap on the `users_liked`/`likes` pair, which must always
    /// move together. Writes `next` (and its length as the counter) only if
    /// the stored set still equals `expected`; returns false on a lost race
    /// so the caller can reload and retry.
    async fn swap_reactions(&self, id: Uuid, expected: &[Uuid], next: &[Uuid]) -> Result<bool>;
}

/// Media storage contract for handling uploads and their removal.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Saves raw bytes and returns a stable media reference.
    async fn save_upload(&self, data: Vec<u8>, content_type: &str) -> Result<String>;
    /// Removes a previously saved blob. Callers treat failure as non-fatal.
    async fn delete(&self, media_ref: &str) -> Result<()>;
    /// Public URL for a media reference.
    fn url(&self, media_ref: &str) -> String;
}

/// Credential and session-token contract.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// One-way salted hash; CPU-bound, must not block the async reactor.
    async fn hash_password(&self, plain: &str) -> Result<String>;

    /// Returns false on mismatch or malformed hash; never errors for those.
    async fn verify_password(&self, plain: &str, hash: &str) -> Result<bool>;

    /// Signs a claim set for the given account.
    fn issue_token(&self, actor_id: Uuid, is_admin: bool) -> Result<String>;

    /// Decodes and checks a bearer token. Fails `Unauthorized` on bad
    /// signature, malformed input, or expiry. Never fails open.
    fn verify_token(&self, token: &str) -> Result<Actor>;
}
