//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the key/blob storage contract the journal is persisted through.
//! - Map the two journal namespaces onto typed read-all / upsert-one APIs.
//!
//! # Invariants
//! - Namespace reads fail soft: broken storage reads as an empty namespace.
//! - Namespace writes replace the whole blob in one storage call.

pub mod blob_store;
pub mod journal_store;
