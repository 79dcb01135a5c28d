//! Minimal multipart reader for the two upload-bearing endpoints.
//!
//! The upstream clients send a JSON part (the entity fields) plus one
//! optional file part; everything else in the payload is ignored.

use actix_multipart::Multipart;
use futures_util::TryStreamExt;
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use rf_core::error::AppError;

/// One collected file part: raw bytes and the declared content type.
pub struct FilePart {
    pub data: Vec<u8>,
    pub content_type: String,
}

/// Parsed form: the JSON part decoded into `T`, plus the optional file.
pub struct UploadForm<T> {
    pub body: T,
    pub file: Option<FilePart>,
}

fn bad_payload(err: impl std::fmt::Display) -> ApiError {
    ApiError(AppError::Validation(format!("malformed multipart payload: {err}")))
}

/// Drains the multipart stream, decoding the part named `json_field` as JSON
/// and collecting the part named `file_field` (if present) as bytes.
pub async fn read_form<T: DeserializeOwned>(
    mut payload: Multipart,
    json_field: &str,
    file_field: &str,
) -> Result<UploadForm<T>, ApiError> {
    let mut json_bytes: Option<Vec<u8>> = None;
    let mut file: Option<FilePart> = None;

    while let Some(mut field) = payload.try_next().await.map_err(bad_payload)? {
        let name = field.name().to_string();

        let mut data = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(bad_payload)? {
            data.extend_from_slice(&chunk);
        }

        if name == json_field {
            json_bytes = Some(data);
        } else if name == file_field {
            let content_type = field
                .content_type()
                .map(|mime| mime.essence_str().to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string());
            file = Some(FilePart { data, content_type });
        }
        // Unknown parts are drained and dropped.
    }

    let json_bytes = json_bytes.ok_or_else(|| {
        ApiError(AppError::Validation(format!("missing '{json_field}' form field")))
    })?;
    let body = serde_json::from_slice(&json_bytes).map_err(bad_payload)?;

    Ok(UploadForm { body, file })
}
