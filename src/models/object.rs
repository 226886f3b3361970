//! JSON shapes for object listings and upload results.

use crate::services::storage_service::ObjectSummary;
use chrono::SecondsFormat;
use serde::Serialize;

/// One listed object.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub key: String,

    /// Size in bytes.
    pub size: i64,

    /// ISO-8601 UTC with millisecond precision, `null` when the backend
    /// did not report it.
    pub last_modified: Option<String>,
}

impl From<ObjectSummary> for FileEntry {
    fn from(summary: ObjectSummary) -> Self {
        Self {
            key: summary.key,
            size: summary.size,
            last_modified: summary
                .last_modified
                .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Millis, true)),
        }
    }
}

/// Body of `GET /list` and `GET /files`.
#[derive(Serialize, Debug)]
pub struct ListFilesResponse {
    pub files: Vec<FileEntry>,
}

/// The object written by an upload.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub key: String,
    pub size: usize,
    pub content_type: String,
}

/// Body of a successful `POST /upload`.
#[derive(Serialize, Debug)]
pub struct UploadResponse {
    pub ok: bool,
    pub file: UploadedFile,
}
