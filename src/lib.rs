//! HTTP gateway in front of an object-storage bucket: list, upload
//! (buffered, size-capped) and streaming download.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
