use crate::config::AppConfig;
use crate::errors::AppError;
use crate::services::storage_service::ObjectStore;
use std::sync::Arc;

/// Shared state handed to every handler: read-only configuration and the
/// storage backend.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn ObjectStore>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }

    /// The configured bucket, or the configuration error every storage
    /// endpoint reports without one.
    pub fn bucket(&self) -> Result<&str, AppError> {
        self.config
            .bucket
            .as_deref()
            .ok_or_else(AppError::bucket_not_configured)
    }

    /// Listing prefix; `None` when no prefix is configured.
    pub fn prefix(&self) -> Option<&str> {
        Some(self.config.prefix.as_str()).filter(|p| !p.is_empty())
    }
}
