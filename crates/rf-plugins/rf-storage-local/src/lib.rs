//! # rf-storage-local
//!
//! Local filesystem implementation of `MediaStore`.
//! Features: content-addressable storage, directory sharding, and
//! delete-by-reference for attachment/avatar replacement.

use async_trait::async_trait;
use rf_core::error::{AppError, Result};
use rf_core::traits::MediaStore;
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use tokio::fs;

/// Upload types accepted by the original image pipeline.
const ACCEPTED_TYPES: &[(&str, &str)] = &[
    ("image/jpg", "jpg"),
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
];

pub struct LocalMediaStore {
    /// Root directory for all uploads (e.g., "./data/uploads")
    root_path: PathBuf,
    /// Public URL prefix (e.g., "/images")
    url_prefix: String,
}

impl LocalMediaStore {
    pub fn new(root: PathBuf, url_prefix: String) -> Self {
        Self { root_path: root, url_prefix }
    }

    fn extension_for(content_type: &str) -> Option<&'static str> {
        ACCEPTED_TYPES
            .iter()
            .find(|(mime, _)| *mime == content_type)
            .map(|(_, ext)| *ext)
    }

    /// Generates a sharded path: "ab/cd/abcdef...hash.ext"
    fn sharded_path(&self, media_ref: &str) -> PathBuf {
        let mut path = self.root_path.clone();
        if media_ref.len() >= 4 {
            path.push(&media_ref[0..2]);
            path.push(&media_ref[2..4]);
        }
        path.push(media_ref);
        path
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    /// Saves an upload under its SHA-256 hash, which deduplicates identical
    /// files for free. Unsupported content types are rejected before any
    /// filesystem work.
    async fn save_upload(&self, data: Vec<u8>, content_type: &str) -> Result<String> {
        let ext = Self::extension_for(content_type).ok_or_else(|| {
            AppError::Validation(format!("unsupported upload type: {content_type}"))
        })?;

        let mut hasher = Sha256::new();
        hasher.update(&data);
        let media_ref = format!("{:x}.{ext}", hasher.finalize());

        let target = self.sharded_path(&media_ref);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|err| AppError::Internal(format!("blob dir creation failed: {err}")))?;
        }

        if !target.exists() {
            fs::write(&target, &data)
                .await
                .map_err(|err| AppError::Internal(format!("blob write failed: {err}")))?;
        }

        Ok(media_ref)
    }

    /// Removes a blob. An already-missing file counts as success; callers
    /// treat any other failure as non-fatal and log it.
    async fn delete(&self, media_ref: &str) -> Result<()> {
        let target = self.sharded_path(media_ref);
        match fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AppError::Internal(format!(
                "blob delete failed for {media_ref}: {err}"
            ))),
        }
    }

    fn url(&self, media_ref: &str) -> String {
        if media_ref.len() >= 4 {
            format!(
                "{}/{}/{}/{}",
                self.url_prefix,
                &media_ref[0..2],
                &media_ref[2..4],
                media_ref
            )
        } else {
            format!("{}/{}", self.url_prefix, media_ref)
        }
    }
}
