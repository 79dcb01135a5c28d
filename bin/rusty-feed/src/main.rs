//! # Rusty-Feed Binary
//!
//! The entry point that assembles the application based on compile-time
//! features. Configuration is read from the environment once and handed to
//! every component at construction time; nothing global and mutable.

use actix_web::{web, App, HttpServer};
use rf_api::{middleware, AppState};
use rf_core::lifecycle::{PostService, UserService};
use rf_core::traits::{AuthProvider, MediaStore, PostRepo, UserRepo};
use std::sync::Arc;

// Feature-gated imports: This is the "Compiled-to-Order" magic
#[cfg(feature = "db-sqlite")]
use rf_db_sqlite::SqliteRepo;

#[cfg(feature = "storage-local")]
use rf_storage_local::LocalMediaStore;

#[cfg(feature = "auth-jwt")]
use rf_auth_jwt::JwtAuthProvider;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let db_url = std::env::var("RF_DB_URL").unwrap_or_else(|_| "sqlite:rusty_feed.db".into());
    let token_secret = std::env::var("RF_TOKEN_SECRET")
        .expect("RF_TOKEN_SECRET must be set; refusing to sign sessions with a default");
    let media_root = std::env::var("RF_MEDIA_ROOT").unwrap_or_else(|_| "./data/uploads".into());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);

    // 1. Initialize Database Implementation
    #[cfg(feature = "db-sqlite")]
    let repo = Arc::new(
        SqliteRepo::new(&db_url)
            .await
            .expect("Failed to init SQLite"),
    );

    // 2. Initialize Storage Implementation
    #[cfg(feature = "storage-local")]
    let media: Arc<dyn MediaStore> = Arc::new(LocalMediaStore::new(
        media_root.clone().into(),
        "/images".into(),
    ));

    // 3. Initialize Auth Implementation
    #[cfg(feature = "auth-jwt")]
    let auth: Arc<dyn AuthProvider> = Arc::new(JwtAuthProvider::new(&token_secret));

    // 4. Wire the lifecycle services and wrap in AppState
    let posts = PostService::new(repo.clone() as Arc<dyn PostRepo>, media.clone());
    let users = UserService::new(repo as Arc<dyn UserRepo>, media.clone(), auth.clone());

    let state = web::Data::new(AppState { posts, users, auth, media });

    log::info!("🚀 Rusty-Feed starting on http://0.0.0.0:{port}");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::standard_middleware())
            .wrap(middleware::cors_policy())
            .configure(rf_api::configure_routes)
            .service(actix_files::Files::new("/images", media_root.clone()))
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
