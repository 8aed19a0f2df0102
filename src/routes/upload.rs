/**
 * Upload Routes
 * File storage collaborator: documents for works, images for covers
 */
use axum::{
    extract::{Multipart, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::path::PathBuf;
use uuid::Uuid;

use crate::routes::ErrorResponse;

const MAX_FILE_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Extensions a work document or cover image may carry.
const ALLOWED_EXTENSIONS: &[&str] = &[
    "docx", "pdf", "pptx", "html", "txt", "md", "jpg", "jpeg", "png", "webp", "gif",
];

/// Extensions whose content is binary and must match a known signature.
const SNIFFED_EXTENSIONS: &[&str] =
    &["docx", "pdf", "pptx", "jpg", "jpeg", "png", "webp", "gif"];

fn upload_dir() -> PathBuf {
    std::env::var("UPLOAD_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("uploads/works"))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub url: String,
    pub name: String,
    pub size: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFileInfo {
    pub name: String,
    pub url: String,
    pub size: u64,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileListResponse {
    pub files: Vec<StoredFileInfo>,
    pub total: usize,
}

/// Match binary uploads against their file signatures.
fn matches_magic_bytes(ext: &str, bytes: &[u8]) -> bool {
    match ext {
        "pdf" => bytes.starts_with(b"%PDF"),
        // docx/pptx are ZIP containers: PK 03 04
        "docx" | "pptx" => bytes.starts_with(&[0x50, 0x4B, 0x03, 0x04]),
        "jpg" | "jpeg" => bytes.starts_with(&[0xFF, 0xD8, 0xFF]),
        "png" => bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47]),
        "gif" => bytes.starts_with(&[0x47, 0x49, 0x46, 0x38]),
        "webp" => {
            bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP"
        }
        _ => false,
    }
}

fn sanitize_filename(filename: &str) -> bool {
    // Reject path traversal and special characters
    !filename.contains("..")
        && !filename.contains('/')
        && !filename.contains('\\')
        && !filename.contains('\0')
}

/// POST /api/uploads
/// Stores the first multipart field and answers with `{url, name}`.
pub async fn upload_file(mut multipart: Multipart) -> impl IntoResponse {
    let dir = upload_dir();
    if let Err(e) = tokio::fs::create_dir_all(&dir).await {
        tracing::error!(error = %e, "failed to create upload directory");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new("failed to initialize upload directory")),
        )
            .into_response();
    }

    let field = match multipart.next_field().await {
        Ok(Some(field)) => field,
        Ok(None) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("no file provided")),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!(error = %e, "multipart error");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("invalid multipart data")),
            )
                .into_response();
        }
    };

    let original_name = field.file_name().unwrap_or("unknown").to_string();
    let ext = original_name
        .rsplit('.')
        .next()
        .unwrap_or("")
        .to_lowercase();

    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(
                "unsupported file type; allowed: docx, pdf, pptx, html, txt, md and images",
            )),
        )
            .into_response();
    }

    let bytes = match field.bytes().await {
        Ok(b) => b,
        Err(e) => {
            tracing::error!(error = %e, "failed to read upload bytes");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("failed to read file data")),
            )
                .into_response();
        }
    };

    if bytes.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("empty file")),
        )
            .into_response();
    }
    if bytes.len() > MAX_FILE_SIZE {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("file too large; maximum size is 10MB")),
        )
            .into_response();
    }

    if SNIFFED_EXTENSIONS.contains(&ext.as_str()) && !matches_magic_bytes(&ext, &bytes) {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(
                "file content does not match its extension",
            )),
        )
            .into_response();
    }

    let stored_name = format!("{}.{}", Uuid::new_v4(), ext);
    let path = dir.join(&stored_name);
    if let Err(e) = tokio::fs::write(&path, &bytes).await {
        tracing::error!(error = %e, "failed to write upload file");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new("failed to save file")),
        )
            .into_response();
    }

    tracing::info!(name = %stored_name, size = bytes.len(), "file uploaded");
    (
        StatusCode::CREATED,
        Json(UploadResponse {
            url: format!("/uploads/works/{stored_name}"),
            name: original_name,
            size: bytes.len(),
        }),
    )
        .into_response()
}

/// DELETE /api/uploads/{filename}
pub async fn delete_file(Path(filename): Path<String>) -> impl IntoResponse {
    if !sanitize_filename(&filename) {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("invalid filename")),
        )
            .into_response();
    }

    let path = upload_dir().join(&filename);
    if !path.exists() {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("file not found")),
        )
            .into_response();
    }

    if let Err(e) = tokio::fs::remove_file(&path).await {
        tracing::error!(name = %filename, error = %e, "failed to delete file");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new("failed to delete file")),
        )
            .into_response();
    }

    tracing::info!(name = %filename, "file deleted");
    StatusCode::NO_CONTENT.into_response()
}

/// GET /api/uploads - stored files, newest first
pub async fn list_files() -> impl IntoResponse {
    let dir = upload_dir();
    if !dir.exists() {
        return (
            StatusCode::OK,
            Json(FileListResponse {
                files: vec![],
                total: 0,
            }),
        )
            .into_response();
    }

    let mut entries = match tokio::fs::read_dir(&dir).await {
        Ok(entries) => entries,
        Err(e) => {
            tracing::error!(error = %e, "failed to read upload directory");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("failed to list files")),
            )
                .into_response();
        }
    };

    let mut files = Vec::new();
    while let Ok(Some(entry)) = entries.next_entry().await {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => continue,
        };
        let ext = name.rsplit('.').next().unwrap_or("").to_lowercase();
        if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
            continue;
        }
        let metadata = match entry.metadata().await {
            Ok(m) => m,
            Err(_) => continue,
        };
        let created_at = metadata
            .created()
            .or_else(|_| metadata.modified())
            .map(|t| {
                let dt: chrono::DateTime<chrono::Utc> = t.into();
                dt.to_rfc3339()
            })
            .unwrap_or_default();

        files.push(StoredFileInfo {
            url: format!("/uploads/works/{name}"),
            name,
            size: metadata.len(),
            created_at,
        });
    }

    files.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let total = files.len();
    (StatusCode::OK, Json(FileListResponse { files, total })).into_response()
}
