//! # rf-api Handlers
//!
//! This module coordinates the flow between HTTP requests and the lifecycle
//! services. Each endpoint has its own typed request/response structs so the
//! core stays transport-free.

use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthedActor;
use crate::error::ApiError;
use crate::upload::{self, FilePart};
use crate::validation;
use crate::AppState;
use rf_core::models::{Post, PostPatch, User, UserPatch};

type ApiResult = Result<HttpResponse, ApiError>;

// ───────────────────────── request / response shapes ────────────────────────

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user_id: Uuid,
    pub is_admin: bool,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Self {
        Self { message: message.to_string() }
    }
}

/// Public view of a user: everything except the password hash.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar: String,
    pub is_admin: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            avatar: user.avatar,
            is_admin: user.is_admin,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub attachment: Option<String>,
    pub likes: i64,
    pub users_liked: Vec<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            author_id: post.author_id,
            content: post.content,
            attachment: post.attachment,
            likes: post.likes,
            users_liked: post.users_liked,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PostBody {
    pub content: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct PostPatchBody {
    pub content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserPatchBody {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Two-valued reaction discriminator: 1 = like, 0 = unlike.
#[derive(Debug, Deserialize)]
pub struct ReactionRequest {
    pub like: i64,
}

// ──────────────────────────────── auth & users ──────────────────────────────

/// Registers an account. Multipart: a `user` JSON part plus an optional
/// `avatar` image.
pub async fn signup(state: web::Data<AppState>, payload: Multipart) -> ApiResult {
    let form = upload::read_form::<SignupRequest>(payload, "user", "avatar").await?;
    validation::validate_credentials(&form.body.email, &form.body.password)?;

    let avatar = save_optional(&state, form.file).await?;
    state
        .users
        .signup(
            form.body.email,
            form.body.password,
            form.body.first_name,
            form.body.last_name,
            avatar,
        )
        .await?;

    Ok(HttpResponse::Created().json(MessageResponse::new("user created")))
}

pub async fn login(state: web::Data<AppState>, body: web::Json<LoginRequest>) -> ApiResult {
    validation::validate_credentials(&body.email, &body.password)?;

    let session = state.users.login(&body.email, &body.password).await?;
    Ok(HttpResponse::Ok().json(SessionResponse {
        user_id: session.user_id,
        is_admin: session.is_admin,
        token: session.token,
    }))
}

pub async fn profile(state: web::Data<AppState>, actor: AuthedActor) -> ApiResult {
    let user = state.users.profile(&actor.0).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// Self-only profile edit. Multipart: a `user` JSON part plus an optional
/// replacement `avatar`.
pub async fn update_user(
    state: web::Data<AppState>,
    actor: AuthedActor,
    path: web::Path<Uuid>,
    payload: Multipart,
) -> ApiResult {
    let user_id = path.into_inner();
    let form = upload::read_form::<UserPatchBody>(payload, "user", "avatar").await?;

    let patch = UserPatch {
        first_name: form.body.first_name,
        last_name: form.body.last_name,
        avatar: save_optional(&state, form.file).await?,
    };
    let user = state.users.update(user_id, &actor.0, patch).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

pub async fn delete_user(
    state: web::Data<AppState>,
    actor: AuthedActor,
    path: web::Path<Uuid>,
) -> ApiResult {
    state.users.delete(path.into_inner(), &actor.0).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("user deleted")))
}

// ──────────────────────────────────── posts ─────────────────────────────────

/// Publishes a post. Multipart: a `post` JSON part plus an optional
/// `attachment` image.
pub async fn create_post(
    state: web::Data<AppState>,
    actor: AuthedActor,
    payload: Multipart,
) -> ApiResult {
    let form = upload::read_form::<PostBody>(payload, "post", "attachment").await?;
    let attachment = save_optional(&state, form.file).await?;

    let post = state
        .posts
        .create(&actor.0, form.body.content, attachment)
        .await?;
    Ok(HttpResponse::Created().json(PostResponse::from(post)))
}

pub async fn list_posts(state: web::Data<AppState>, _actor: AuthedActor) -> ApiResult {
    let posts = state.posts.list().await?;
    let body: Vec<PostResponse> = posts.into_iter().map(PostResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

pub async fn get_post(
    state: web::Data<AppState>,
    _actor: AuthedActor,
    path: web::Path<Uuid>,
) -> ApiResult {
    let post = state.posts.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(PostResponse::from(post)))
}

/// Author-or-admin edit. Multipart: a `post` JSON part plus an optional
/// replacement `attachment`; the old blob is released once the update lands.
pub async fn update_post(
    state: web::Data<AppState>,
    actor: AuthedActor,
    path: web::Path<Uuid>,
    payload: Multipart,
) -> ApiResult {
    let post_id = path.into_inner();
    let form = upload::read_form::<PostPatchBody>(payload, "post", "attachment").await?;

    let patch = PostPatch {
        content: form.body.content,
        attachment: save_optional(&state, form.file).await?,
    };
    let post = state.posts.update(post_id, &actor.0, patch).await?;
    Ok(HttpResponse::Ok().json(PostResponse::from(post)))
}

pub async fn delete_post(
    state: web::Data<AppState>,
    actor: AuthedActor,
    path: web::Path<Uuid>,
) -> ApiResult {
    state.posts.delete(path.into_inner(), &actor.0).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("post deleted")))
}

pub async fn like_post(
    state: web::Data<AppState>,
    actor: AuthedActor,
    path: web::Path<Uuid>,
    body: web::Json<ReactionRequest>,
) -> ApiResult {
    let post = state
        .posts
        .react(path.into_inner(), &actor.0, body.like)
        .await?;
    Ok(HttpResponse::Ok().json(PostResponse::from(post)))
}

// ──────────────────────────────────── misc ──────────────────────────────────

/// Persists an uploaded file part, if any, returning its media reference.
async fn save_optional(
    state: &web::Data<AppState>,
    file: Option<FilePart>,
) -> Result<Option<String>, ApiError> {
    match file {
        Some(part) => {
            let media_ref = state.media.save_upload(part.data, &part.content_type).await?;
            Ok(Some(media_ref))
        }
        None => Ok(None),
    }
}
