//! Wire types returned by the HTTP handlers.
//!
//! Objects themselves live in the storage backend; these are read-through
//! views serialised as JSON via `serde`.

pub mod object;
