//! src/services/storage_service.rs
//!
//! The storage capability the HTTP handlers depend on. Handlers only ever
//! list, put and get; everything else (durability, pagination, multipart
//! assembly) belongs to the backend behind this trait.

use async_trait::async_trait;
use axum::http::StatusCode;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use std::io;
use thiserror::Error;

/// A single entry returned by a bucket listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    pub key: String,
    pub size: i64,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Streaming body of a fetched object.
pub type ObjectBody = BoxStream<'static, io::Result<Bytes>>;

/// An object fetched for download: metadata plus a body that has not been
/// read yet.
pub struct ObjectDownload {
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    pub body: ObjectBody,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object `{key}` not found in bucket `{bucket}`")]
    NotFound { bucket: String, key: String },
    /// Failure reported by the storage service. `status` is the HTTP status
    /// of the backend response when one was received.
    #[error("{message}")]
    Backend { status: Option<u16>, message: String },
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl StorageError {
    /// HTTP status to surface when this error is passed through to a caller.
    pub fn status_code(&self) -> StatusCode {
        match self {
            StorageError::NotFound { .. } => StatusCode::NOT_FOUND,
            StorageError::Backend {
                status: Some(code), ..
            } => StatusCode::from_u16(*code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            StorageError::Backend { status: None, .. } | StorageError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Object storage operations used by the gateway.
///
/// Implementations must be safe to share across requests; the S3 client and
/// the in-memory store both synchronise internally.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List up to `max_keys` objects under `prefix`, in key order.
    async fn list(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        max_keys: i32,
    ) -> StorageResult<Vec<ObjectSummary>>;

    /// Store `body` under `key`, replacing any existing object.
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> StorageResult<()>;

    /// Open an object for streaming download.
    async fn get(&self, bucket: &str, key: &str) -> StorageResult<ObjectDownload>;
}
