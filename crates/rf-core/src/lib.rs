//! rusty-feed/crates/rf-core/src/lib.rs
//!
//! The central domain logic and interface definitions for Rusty-Feed.

pub mod models;
pub mod traits;
pub mod error;
pub mod policy;
pub mod reaction;
pub mod lifecycle;

// Re-exporting for easier access in other crates
pub use models::*;
pub use traits::*;
pub use error::*;


#[cfg(test)]
mod tests {
    use super::models::*;
    use uuid::Uuid;

    #[test]
    fn test_post_creation_v7() {
        let id = Uuid::now_v7();
        let post = Post {
            id,
            author_id: Uuid::now_v7(),
            content: "Hello Rust!".to_string(),
            attachment: None,
            likes: 0,
            users_liked: vec![],
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        assert_eq!(post.id, id);
        assert_eq!(post.likes, post.users_liked.len() as i64);
    }
}
