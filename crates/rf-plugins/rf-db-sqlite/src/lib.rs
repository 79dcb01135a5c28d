//! # rf-db-sqlite Implementation
//!
//! This module implements the data mapping between the SQLite relational
//! model and the `rf-core` domain models. The liked set is persisted as a
//! JSON text column next to its derived counter; the two are only ever
//! written together.

use async_trait::async_trait;
use rf_core::error::{AppError, Result};
use rf_core::models::{Post, PostPatch, User, UserPatch};
use rf_core::traits::{PostRepo, UserRepo};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;
use uuid::Uuid;

pub struct SqliteRepo {
    pool: SqlitePool,
}

// Helpers for UUID conversion
fn uuid_to_blob(id: Uuid) -> Vec<u8> {
    id.as_bytes().to_vec()
}

fn blob_to_uuid(blob: &[u8]) -> Uuid {
    Uuid::from_slice(blob).unwrap_or_default()
}

/// Canonical JSON encoding for the liked set. The CAS compares equality of
/// this text, so every write must go through the same encoder.
fn liked_to_json(users_liked: &[Uuid]) -> Result<String> {
    serde_json::to_string(users_liked)
        .map_err(|err| AppError::Internal(format!("liked set encoding failed: {err}")))
}

fn store_err(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return AppError::Conflict("email address already in use".to_string());
        }
    }
    AppError::Internal(format!("store error: {err}"))
}

impl SqliteRepo {
    /// Connects (creating the file if needed) and applies the schema.
    pub async fn new(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|err| AppError::Internal(format!("bad database url: {err}")))?
            .create_if_missing(true);
        // One connection: SQLite allows a single writer, and :memory:
        // databases are per-connection.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(store_err)?;

        let repo = Self { pool };
        repo.init_schema().await?;
        Ok(repo)
    }

    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS users (
                id            BLOB PRIMARY KEY,
                email         TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                first_name    TEXT NOT NULL,
                last_name     TEXT NOT NULL,
                avatar        TEXT NOT NULL,
                is_admin      INTEGER NOT NULL DEFAULT 0,
                created_at    TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS posts (
                id          BLOB PRIMARY KEY,
                author_id   BLOB NOT NULL,
                content     TEXT NOT NULL,
                attachment  TEXT,
                likes       INTEGER NOT NULL DEFAULT 0,
                users_liked TEXT NOT NULL DEFAULT '[]',
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(())
    }

    fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> User {
        User {
            id: blob_to_uuid(row.get::<Vec<u8>, _>("id").as_slice()),
            email: row.get("email"),
            password_hash: row.get("password_hash"),
            first_name: row.get("first_name"),
            last_name: row.get("last_name"),
            avatar: row.get("avatar"),
            is_admin: row.get("is_admin"),
            created_at: row.get("created_at"),
        }
    }

    fn row_to_post(row: &sqlx::sqlite::SqliteRow) -> Post {
        Post {
            id: blob_to_uuid(row.get::<Vec<u8>, _>("id").as_slice()),
            author_id: blob_to_uuid(row.get::<Vec<u8>, _>("author_id").as_slice()),
            content: row.get("content"),
            attachment: row.get("attachment"),
            likes: row.get("likes"),
            users_liked: serde_json::from_str(&row.get::<String, _>("users_liked"))
                .unwrap_or_default(),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }
}

#[async_trait]
impl UserRepo for SqliteRepo {
    /// The UNIQUE column on email is the authoritative duplicate guard;
    /// its violation surfaces as Conflict.
    async fn insert_user(&self, user: User) -> Result<()> {
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, first_name, last_name, avatar, is_admin, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(uuid_to_blob(user.id))
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.first_name)
        .bind(user.last_name)
        .bind(user.avatar)
        .bind(user.is_admin)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(row.map(|r| Self::row_to_user(&r)))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(row.map(|r| Self::row_to_user(&r)))
    }

    async fn update_user(&self, id: Uuid, patch: &UserPatch) -> Result<()> {
        let result = sqlx::query(
            "UPDATE users SET
                first_name = COALESCE(?, first_name),
                last_name  = COALESCE(?, last_name),
                avatar     = COALESCE(?, avatar)
             WHERE id = ?",
        )
        .bind(patch.first_name.as_deref())
        .bind(patch.last_name.as_deref())
        .bind(patch.avatar.as_deref())
        .bind(uuid_to_blob(id))
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("user".to_string(), id.to_string()));
        }
        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("user".to_string(), id.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl PostRepo for SqliteRepo {
    async fn insert_post(&self, post: Post) -> Result<()> {
        sqlx::query(
            "INSERT INTO posts (id, author_id, content, attachment, likes, users_liked, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(uuid_to_blob(post.id))
        .bind(uuid_to_blob(post.author_id))
        .bind(post.content)
        .bind(post.attachment)
        .bind(post.likes)
        .bind(liked_to_json(&post.users_liked)?)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(())
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>> {
        let row = sqlx::query("SELECT * FROM posts WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(row.map(|r| Self::row_to_post(&r)))
    }

    async fn list_posts(&self) -> Result<Vec<Post>> {
        let rows = sqlx::query("SELECT * FROM posts ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(rows.iter().map(Self::row_to_post).collect())
    }

    /// Partial update of the author-editable columns only. The id, author
    /// and reaction pair are not reachable from here.
    async fn update_post(&self, id: Uuid, patch: &PostPatch) -> Result<()> {
        let result = sqlx::query(
            "UPDATE posts SET
                content    = COALESCE(?, content),
                attachment = COALESCE(?, attachment),
                updated_at = ?
             WHERE id = ?",
        )
        .bind(patch.content.as_deref())
        .bind(patch.attachment.as_deref())
        .bind(chrono::Utc::now())
        .bind(uuid_to_blob(id))
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("post".to_string(), id.to_string()));
        }
        Ok(())
    }

    async fn delete_post(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("post".to_string(), id.to_string()));
        }
        Ok(())
    }

    /// Conditional single-statement write: the set and its counter move
    /// together, and only if nobody else won the race since the caller's
    /// read. A stale `expected` matches zero rows.
    async fn swap_reactions(&self, id: Uuid, expected: &[Uuid], next: &[Uuid]) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE posts SET users_liked = ?, likes = ?, updated_at = ?
             WHERE id = ? AND users_liked = ?",
        )
        .bind(liked_to_json(next)?)
        .bind(next.len() as i64)
        .bind(chrono::Utc::now())
        .bind(uuid_to_blob(id))
        .bind(liked_to_json(expected)?)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(result.rows_affected() == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    async fn repo() -> SqliteRepo {
        SqliteRepo::new("sqlite::memory:").await.unwrap()
    }

    fn sample_user(email: &str) -> User {
        User {
            id: Uuid::now_v7(),
            email: email.to_string(),
            password_hash: "$argon2id$fake".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            avatar: rf_core::models::DEFAULT_AVATAR.to_string(),
            is_admin: false,
            created_at: Utc::now(),
        }
    }

    fn sample_post(author_id: Uuid) -> Post {
        let now = Utc::now();
        Post {
            id: Uuid::now_v7(),
            author_id,
            content: "hello".to_string(),
            attachment: None,
            likes: 0,
            users_liked: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_user_round_trip() {
        let repo = repo().await;
        let user = sample_user("ada@example.org");
        repo.insert_user(user.clone()).await.unwrap();

        let found = repo.find_user(user.id).await.unwrap().unwrap();
        assert_eq!(found.email, "ada@example.org");

        let by_email = repo.find_user_by_email("ada@example.org").await.unwrap();
        assert_eq!(by_email.unwrap().id, user.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let repo = repo().await;
        repo.insert_user(sample_user("dup@example.org")).await.unwrap();

        let err = repo
            .insert_user(sample_user("dup@example.org"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        // Exactly one record survived.
        let found = repo.find_user_by_email("dup@example.org").await.unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn test_post_round_trip_and_patch() {
        let repo = repo().await;
        let author = Uuid::now_v7();
        let post = sample_post(author);
        repo.insert_post(post.clone()).await.unwrap();

        let patch = PostPatch { content: Some("edited".into()), attachment: Some("ref.png".into()) };
        repo.update_post(post.id, &patch).await.unwrap();

        let found = repo.find_post(post.id).await.unwrap().unwrap();
        assert_eq!(found.content, "edited");
        assert_eq!(found.attachment.as_deref(), Some("ref.png"));
        // Author and reaction state untouched by a patch.
        assert_eq!(found.author_id, author);
        assert_eq!(found.likes, 0);
        assert!(found.users_liked.is_empty());
    }

    #[tokio::test]
    async fn test_swap_reactions_cas() {
        let repo = repo().await;
        let post = sample_post(Uuid::now_v7());
        repo.insert_post(post.clone()).await.unwrap();

        let a = Uuid::now_v7();
        let b = Uuid::now_v7();

        // First writer wins.
        assert!(repo.swap_reactions(post.id, &[], &[a]).await.unwrap());

        // Second writer with a stale snapshot loses, state untouched.
        assert!(!repo.swap_reactions(post.id, &[], &[b]).await.unwrap());
        let current = repo.find_post(post.id).await.unwrap().unwrap();
        assert_eq!(current.users_liked, vec![a]);
        assert_eq!(current.likes, 1);

        // After reloading, the second writer succeeds and both survive.
        assert!(repo.swap_reactions(post.id, &[a], &[a, b]).await.unwrap());
        let current = repo.find_post(post.id).await.unwrap().unwrap();
        assert_eq!(current.users_liked, vec![a, b]);
        assert_eq!(current.likes, 2);
    }

    #[tokio::test]
    async fn test_concurrent_likes_are_both_reflected() {
        use rf_core::lifecycle::PostService;
        use rf_core::models::Actor;
        use rf_core::traits::{MediaStore, PostRepo};
        use std::sync::Arc;

        struct NoMedia;

        #[async_trait]
        impl MediaStore for NoMedia {
            async fn save_upload(&self, _data: Vec<u8>, _ct: &str) -> Result<String> {
                Ok("unused".to_string())
            }
            async fn delete(&self, _media_ref: &str) -> Result<()> {
                Ok(())
            }
            fn url(&self, media_ref: &str) -> String {
                media_ref.to_string()
            }
        }

        let repo = Arc::new(repo().await);
        let svc = PostService::new(repo.clone() as Arc<dyn PostRepo>, Arc::new(NoMedia));

        let author = Actor { id: Uuid::now_v7(), is_admin: false };
        let post = svc.create(&author, "race me".into(), None).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..4 {
            let svc = svc.clone();
            let actor = Actor { id: Uuid::now_v7(), is_admin: false };
            let post_id = post.id;
            handles.push(tokio::spawn(async move {
                svc.react(post_id, &actor, 1).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        // No lost updates: every like survived and the counter matches.
        let current = svc.get(post.id).await.unwrap();
        assert_eq!(current.likes, 4);
        assert_eq!(current.users_liked.len(), 4);
    }

    #[tokio::test]
    async fn test_patch_missing_rows_report_not_found() {
        let repo = repo().await;
        let id = Uuid::now_v7();

        let err = repo.update_post(id, &PostPatch::default()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_, _)));
        let err = repo.delete_post(id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_, _)));
        let err = repo.delete_user(id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_, _)));
    }
}
