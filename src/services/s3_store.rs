//! `ObjectStore` backed by Amazon S3 (or any S3-compatible service).

use crate::services::storage_service::{
    ObjectDownload, ObjectStore, ObjectSummary, StorageError, StorageResult,
};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_config::meta::region::RegionProviderChain;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::{ByteStream, DateTime as SmithyDateTime};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use std::time::Instant;
use tokio_util::io::ReaderStream;

/// S3 storage client. Credentials come from the default AWS provider chain;
/// retries are whatever the SDK's standard retry mode does.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    /// Build a client for `region`.
    ///
    /// When `endpoint_url` is set (MinIO, DigitalOcean Spaces, ...) requests
    /// go to that endpoint with path-style addressing.
    pub async fn new(region: String, endpoint_url: Option<String>) -> Self {
        let region_provider = RegionProviderChain::first_try(aws_config::Region::new(region));
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(region_provider)
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self {
            client: Client::from_conf(builder.build()),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn list(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        max_keys: i32,
    ) -> StorageResult<Vec<ObjectSummary>> {
        let start = Instant::now();

        let mut request = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .max_keys(max_keys);
        if let Some(prefix) = prefix {
            request = request.prefix(prefix);
        }

        let output = request.send().await.map_err(|e| {
            tracing::error!(
                error = %DisplayErrorContext(&e),
                bucket = %bucket,
                prefix = ?prefix,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 list failed"
            );
            backend_error(e)
        })?;

        let files: Vec<ObjectSummary> = output
            .contents()
            .iter()
            .filter_map(|item| {
                Some(ObjectSummary {
                    key: item.key()?.to_string(),
                    size: item.size().unwrap_or_default(),
                    last_modified: item.last_modified().and_then(to_chrono),
                })
            })
            .collect();

        tracing::debug!(
            bucket = %bucket,
            count = files.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 list successful"
        );

        Ok(files)
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> StorageResult<()> {
        let size = body.len();
        let start = Instant::now();

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %DisplayErrorContext(&e),
                    bucket = %bucket,
                    key = %key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 upload failed"
                );
                backend_error(e)
            })?;

        tracing::info!(
            bucket = %bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(())
    }

    async fn get(&self, bucket: &str, key: &str) -> StorageResult<ObjectDownload> {
        let start = Instant::now();

        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(
                    error = %DisplayErrorContext(&e),
                    bucket = %bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 download failed"
                );
                backend_error(e)
            })?;

        let content_type = output.content_type().map(str::to_string);
        let content_length = output
            .content_length()
            .and_then(|len| u64::try_from(len).ok());

        // Mid-stream failures surface as body errors; the status line is
        // already on the wire by then.
        let bucket = bucket.to_string();
        let key = key.to_string();
        let body = ReaderStream::new(output.body.into_async_read())
            .map(move |chunk| {
                if let Err(err) = &chunk {
                    tracing::error!(
                        error = %err,
                        bucket = %bucket,
                        key = %key,
                        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                        "S3 stream download error"
                    );
                }
                chunk
            })
            .boxed();

        Ok(ObjectDownload {
            content_type,
            content_length,
            body,
        })
    }
}

/// Convert an SDK failure into a `StorageError::Backend`, keeping the HTTP
/// status of the S3 response and the service's own message when present.
fn backend_error<E>(err: SdkError<E, HttpResponse>) -> StorageError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    let status = err.raw_response().map(|resp| resp.status().as_u16());
    let message = err
        .as_service_error()
        .and_then(|service_err| service_err.message())
        .map(str::to_string)
        .unwrap_or_else(|| DisplayErrorContext(&err).to_string());
    StorageError::Backend { status, message }
}

fn to_chrono(dt: &SmithyDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(dt.secs(), dt.subsec_nanos())
}
