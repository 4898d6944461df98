//! # siteforge_store
//!
//! Best-effort local persistence: stored project snapshots and external
//! provider connections, kept under fixed well-known keys in an injected
//! key-value store.
//!
//! This layer is a convenience cache, not a system of record. Every
//! operation reports failure as a boolean (logged, never raised) so a lost
//! cache can never block the primary orchestration flow.

pub mod connection;
pub mod kv;
pub mod project;

pub use connection::{ConnectionStore, IntegrationConnection, ProviderKind};
pub use kv::{JsonFileStore, KeyValueStore, MemoryStore};
pub use project::{ProjectStore, StoredFile, StoredProject};
