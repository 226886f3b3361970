//! HTTP handlers for listing, uploading and downloading objects.
//! Uploads are buffered (bounded by the configured cap) before the single
//! backend write; downloads stream the backend body straight through.

use crate::{
    errors::AppError,
    models::object::{FileEntry, ListFilesResponse, UploadResponse, UploadedFile},
    services::keys::{basename, build_key, sanitize_filename},
    state::AppState,
};
use axum::{
    Json,
    body::Body,
    extract::{
        Query, State,
        multipart::{Field, Multipart, MultipartRejection},
        rejection::QueryRejection,
    },
    http::{HeaderMap, HeaderValue, header},
    response::Response,
};
use bytes::{Bytes, BytesMut};
use chrono::Utc;
use serde::Deserialize;

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";
pub const DEFAULT_LIST_LIMIT: i64 = 50;
pub const MAX_LIST_LIMIT: i64 = 200;
const FILE_REQUIRED: &str = "File is required";

/// Query params accepted by `GET /list` and `GET /files`.
///
/// `limit` stays a string so a malformed value falls back to the default
/// instead of rejecting the request.
#[derive(Debug, Deserialize)]
pub struct ListFilesQuery {
    pub limit: Option<String>,
}

/// Query params accepted by `GET /download`.
#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub key: Option<String>,
}

/// The `file` part of an upload, fully buffered.
struct IncomingFile {
    filename: String,
    content_type: Option<String>,
    data: Bytes,
}

/// `GET /list`, `GET /files` — list up to `limit` objects under the prefix.
pub async fn list_files(
    State(state): State<AppState>,
    query: Result<Query<ListFilesQuery>, QueryRejection>,
) -> Result<Json<ListFilesResponse>, AppError> {
    let bucket = state.bucket()?;
    let Query(q) = query?;
    let max_keys = resolve_limit(q.limit.as_deref());

    let objects = state
        .store
        .list(bucket, state.prefix(), max_keys)
        .await
        .map_err(|err| AppError::storage_internal(err, "Failed to list files"))?;

    Ok(Json(ListFilesResponse {
        files: objects.into_iter().map(FileEntry::from).collect(),
    }))
}

/// `POST /upload` — multipart form with a `file` part and an optional `key`.
///
/// A request that is not `multipart/form-data` carries no file part and is
/// answered like a form without one.
pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let bucket = state.bucket()?;
    let mut multipart = multipart.map_err(|rejection| {
        tracing::debug!(reason = %rejection.body_text(), "upload without multipart body");
        AppError::bad_request(FILE_REQUIRED)
    })?;
    let max_bytes = state.config.max_upload_bytes;

    let mut file: Option<IncomingFile> = None;
    let mut key_override: Option<String> = None;
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") if file.is_none() => {
                file = Some(read_file_field(field, max_bytes).await?);
            }
            Some("key") => key_override = Some(field.text().await?),
            // Anything else, including repeated `file` parts, is skipped by
            // advancing to the next field.
            _ => {}
        }
    }

    let file = file.ok_or_else(|| AppError::bad_request(FILE_REQUIRED))?;
    let key = key_override
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .unwrap_or_else(|| build_key(&state.config.prefix, &file.filename, Utc::now()));
    let content_type = file
        .content_type
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
    let size = file.data.len();

    state
        .store
        .put(bucket, &key, file.data, &content_type)
        .await
        .map_err(|err| AppError::storage_internal(err, "Failed to upload"))?;

    tracing::info!(key = %key, size_bytes = size, content_type = %content_type, "file uploaded");

    Ok(Json(UploadResponse {
        ok: true,
        file: UploadedFile {
            key,
            size,
            content_type,
        },
    }))
}

/// `GET /download?key=...` — stream an object back as an attachment.
///
/// Errors before the body starts are JSON with the backend's status; a
/// failure mid-stream aborts the response body instead.
pub async fn download_file(
    State(state): State<AppState>,
    query: Result<Query<DownloadQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let bucket = state.bucket()?;
    let Query(q) = query?;
    let key = q.key.as_deref().map(str::trim).unwrap_or_default();
    if key.is_empty() {
        return Err(AppError::bad_request("key query param is required"));
    }

    let object = state
        .store
        .get(bucket, key)
        .await
        .map_err(|err| AppError::from_storage(err, "Failed to download"))?;

    let mut response = Response::new(Body::from_stream(object.body));
    set_download_headers(
        response.headers_mut(),
        key,
        object.content_type.as_deref(),
        object.content_length,
    );

    Ok(response)
}

/// Clamp the requested listing size into `0..=MAX_LIST_LIMIT`.
/// Missing or non-numeric values use `DEFAULT_LIST_LIMIT`.
fn resolve_limit(raw: Option<&str>) -> i32 {
    let requested = raw
        .and_then(|value| value.trim().parse::<i64>().ok())
        .unwrap_or(DEFAULT_LIST_LIMIT);
    requested.clamp(0, MAX_LIST_LIMIT) as i32
}

/// Buffer a file part, giving up as soon as it grows past `max_bytes`.
async fn read_file_field(mut field: Field<'_>, max_bytes: usize) -> Result<IncomingFile, AppError> {
    let filename = field.file_name().unwrap_or_default().to_string();
    let content_type = field
        .content_type()
        .map(str::trim)
        .filter(|ct| !ct.is_empty())
        .map(str::to_string);

    let mut buf = BytesMut::new();
    while let Some(chunk) = field.chunk().await? {
        if buf.len() + chunk.len() > max_bytes {
            tracing::warn!(filename = %filename, max_bytes, "upload rejected: file too large");
            return Err(AppError::payload_too_large("File too large"));
        }
        buf.extend_from_slice(&chunk);
    }

    Ok(IncomingFile {
        filename,
        content_type,
        data: buf.freeze(),
    })
}

fn set_download_headers(
    headers: &mut HeaderMap,
    key: &str,
    content_type: Option<&str>,
    content_length: Option<u64>,
) {
    let content_type = content_type
        .filter(|ct| !ct.is_empty())
        .unwrap_or(DEFAULT_CONTENT_TYPE);
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(content_type)
            .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CONTENT_TYPE)),
    );

    if let Some(length) = content_length {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
    }

    headers.insert(header::CONTENT_DISPOSITION, content_disposition(basename(key)));
}

/// `attachment; filename="<name>"`, falling back to the sanitised name when
/// the raw one cannot be carried in a quoted header value.
fn content_disposition(filename: &str) -> HeaderValue {
    let name = if filename.contains('"') {
        sanitize_filename(filename)
    } else {
        filename.to_string()
    };
    HeaderValue::from_str(&format!("attachment; filename=\"{}\"", name))
        .or_else(|_| {
            HeaderValue::from_str(&format!(
                "attachment; filename=\"{}\"",
                sanitize_filename(filename)
            ))
        })
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}
