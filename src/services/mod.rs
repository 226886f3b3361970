//! Storage backends and key helpers used by the HTTP handlers.

pub mod keys;
pub mod memory_store;
pub mod s3_store;
pub mod storage_service;
