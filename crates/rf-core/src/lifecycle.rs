//! # Resource Lifecycle
//!
//! Orchestration for posts and user accounts. Each service is handed its
//! collaborators once at startup and owns the ordering rules: lookup, then
//! authorization, then the mutation, and only then any blob cleanup.

use std::sync::Arc;
use chrono::Utc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{
    Actor, Post, PostPatch, Session, User, UserPatch, DEFAULT_AVATAR,
};
use crate::policy;
use crate::reaction::{self, Reaction};
use crate::traits::{AuthProvider, MediaStore, PostRepo, UserRepo};

/// Bounded optimistic retries for the reaction compare-and-swap.
const MAX_REACTION_RETRIES: u32 = 4;

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepo>,
    media: Arc<dyn MediaStore>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepo>, media: Arc<dyn MediaStore>) -> Self {
        Self { posts, media }
    }

    /// New posts always start with an empty reaction ledger.
    pub async fn create(
        &self,
        author: &Actor,
        content: String,
        attachment: Option<String>,
    ) -> Result<Post> {
        let now = Utc::now();
        let post = Post {
            id: Uuid::now_v7(),
            author_id: author.id,
            content,
            attachment,
            likes: 0,
            users_liked: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.posts.insert_post(post.clone()).await?;
        Ok(post)
    }

    pub async fn get(&self, id: Uuid) -> Result<Post> {
        self.posts
            .find_post(id)
            .await?
            .ok_or_else(|| AppError::NotFound("post".to_string(), id.to_string()))
    }

    pub async fn list(&self) -> Result<Vec<Post>> {
        self.posts.list_posts().await
    }

    /// Content/attachment edit by the author or an admin. The patch type
    /// cannot express `author_id` or the liked set, so those fields are
    /// structurally immune to tampering. A replaced attachment is released
    /// only after the record update has succeeded.
    pub async fn update(&self, id: Uuid, actor: &Actor, patch: PostPatch) -> Result<Post> {
        let before = self.get(id).await?;
        policy::authorize_mutation(actor, before.author_id)?;

        self.posts.update_post(id, &patch).await?;

        if let (Some(new_ref), Some(old_ref)) = (&patch.attachment, &before.attachment) {
            if new_ref != old_ref {
                self.release(old_ref).await;
            }
        }
        self.get(id).await
    }

    /// Removes a post and, best-effort, its attachment. An orphaned blob is
    /// less harmful than an undeletable post, so a failed blob delete is
    /// logged and the record delete proceeds.
    pub async fn delete(&self, id: Uuid, actor: &Actor) -> Result<()> {
        let post = self.get(id).await?;
        policy::authorize_mutation(actor, post.author_id)?;

        if let Some(att) = &post.attachment {
            self.release(att).await;
        }
        self.posts.delete_post(id).await
    }

    /// One like/unlike transition for `(post, actor)`, persisted through the
    /// repo's compare-and-swap so two concurrent reactions from different
    /// actors are both reflected. Ledger rejections (already liked, nothing
    /// to remove, bad flag) never write.
    pub async fn react(&self, id: Uuid, actor: &Actor, flag: i64) -> Result<Post> {
        let reaction = Reaction::from_flag(flag)?;

        for _ in 0..MAX_REACTION_RETRIES {
            let post = self.get(id).await?;
            let next = reaction::apply(&post.users_liked, actor.id, reaction)?;
            if self.posts.swap_reactions(id, &post.users_liked, &next).await? {
                return self.get(id).await;
            }
            log::debug!("reaction CAS conflict on post {id}, retrying");
        }
        Err(AppError::Internal(format!(
            "reaction on post {id} kept conflicting after {MAX_REACTION_RETRIES} attempts"
        )))
    }

    async fn release(&self, media_ref: &str) {
        if let Err(err) = self.media.delete(media_ref).await {
            log::warn!("leaving orphaned blob {media_ref}: {err}");
        }
    }
}

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepo>,
    media: Arc<dyn MediaStore>,
    auth: Arc<dyn AuthProvider>,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepo>,
        media: Arc<dyn MediaStore>,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        Self { users, media, auth }
    }

    /// Registers an account. The email pre-check here only improves the
    /// error message; the store's unique constraint is the source of truth
    /// and also maps to `Conflict` when two signups race.
    pub async fn signup(
        &self,
        email: String,
        password: String,
        first_name: String,
        last_name: String,
        avatar: Option<String>,
    ) -> Result<User> {
        if self.users.find_user_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("email address already in use".to_string()));
        }

        let password_hash = self.auth.hash_password(&password).await?;
        let user = User {
            id: Uuid::now_v7(),
            email,
            password_hash,
            first_name,
            last_name,
            avatar: avatar.unwrap_or_else(|| DEFAULT_AVATAR.to_string()),
            is_admin: false,
            created_at: Utc::now(),
        };
        self.users.insert_user(user.clone()).await?;
        Ok(user)
    }

    /// An unknown email reports NotFound; a wrong password reports
    /// Unauthorized. Distinct on purpose, matching the public contract.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let user = self
            .users
            .find_user_by_email(email)
            .await?
            .ok_or_else(|| AppError::NotFound("user".to_string(), email.to_string()))?;

        if !self.auth.verify_password(password, &user.password_hash).await? {
            return Err(AppError::Unauthorized("incorrect login or password".to_string()));
        }

        let token = self.auth.issue_token(user.id, user.is_admin)?;
        Ok(Session {
            user_id: user.id,
            is_admin: user.is_admin,
            token,
        })
    }

    pub async fn profile(&self, actor: &Actor) -> Result<User> {
        self.get(actor.id).await
    }

    pub async fn get(&self, id: Uuid) -> Result<User> {
        self.users
            .find_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound("user".to_string(), id.to_string()))
    }

    /// Self-only profile edit. A replaced avatar is released after the
    /// record update succeeds; the shared default avatar is exempt.
    pub async fn update(&self, id: Uuid, actor: &Actor, patch: UserPatch) -> Result<User> {
        let before = self.get(id).await?;
        policy::authorize_self(actor, id)?;

        self.users.update_user(id, &patch).await?;

        if let Some(new_avatar) = &patch.avatar {
            if before.avatar != *new_avatar && before.avatar != DEFAULT_AVATAR {
                self.release(&before.avatar).await;
            }
        }
        self.get(id).await
    }

    /// Self-only account removal; avatar blob is best-effort.
    pub async fn delete(&self, id: Uuid, actor: &Actor) -> Result<()> {
        let user = self.get(id).await?;
        policy::authorize_self(actor, id)?;

        if user.avatar != DEFAULT_AVATAR {
            self.release(&user.avatar).await;
        }
        self.users.delete_user(id).await
    }

    async fn release(&self, media_ref: &str) {
        if let Err(err) = self.media.delete(media_ref).await {
            log::warn!("leaving orphaned blob {media_ref}: {err}");
        }
    }
}
