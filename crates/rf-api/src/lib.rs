//! # rf-api
//!
//! The web routing and orchestration layer for Rusty-Feed. Handlers stay
//! thin: decode the request, call the lifecycle services, shape the JSON.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod upload;
pub mod validation;

use actix_web::web;
use std::sync::Arc;

use rf_core::lifecycle::{PostService, UserService};
use rf_core::traits::{AuthProvider, MediaStore};

/// State shared across all Actix-web workers, assembled once in the binary.
pub struct AppState {
    pub posts: PostService,
    pub users: UserService,
    pub auth: Arc<dyn AuthProvider>,
    pub media: Arc<dyn MediaStore>,
}

/// Configures the routes for the API.
///
/// # Developer Note
/// We use a scoped configuration to allow the main binary to mount
/// the API under different paths if needed.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(
                web::scope("/auth")
                    .route("/signup", web::post().to(handlers::signup))
                    .route("/login", web::post().to(handlers::login))
                    .route("/profile", web::get().to(handlers::profile))
                    .route("/user/{user_id}", web::put().to(handlers::update_user))
                    .route("/user/{user_id}", web::delete().to(handlers::delete_user)),
            )
            .service(
                web::scope("/posts")
                    .route("", web::get().to(handlers::list_posts))
                    .route("", web::post().to(handlers::create_post))
                    .route("/{post_id}", web::get().to(handlers::get_post))
                    .route("/{post_id}", web::put().to(handlers::update_post))
                    .route("/{post_id}", web::delete().to(handlers::delete_post))
                    .route("/{post_id}/like", web::post().to(handlers::like_post)),
            ),
    );
}
