//! Persisted session state for Vigil.
//!
//! This crate owns the one piece of durable state in the system: the
//! [`SessionRecord`](vigil_session::SessionRecord) with its two
//! timestamps. It is split in two layers:
//!
//! 1. **Backend** ([`StorageBackend`]) - a synchronous string key-value
//!    contract. [`MemoryBackend`] for tests and single-process apps,
//!    [`FileBackend`] for state that survives restarts.
//! 2. **Store** ([`SessionStore`]) - the session-shaped operations on top
//!    (initialize, touch, read-and-evaluate, clear) under one fixed key.
//!
//! # Failure direction
//!
//! Storage is allowed to fail; sessions are not allowed to silently
//! outlive their budgets because of it. Every read or write error here is
//! logged and treated as "the operation had no effect", which makes a
//! broken backend look like an absent session and pushes the user toward
//! re-authentication instead of extending a session nobody can verify.

mod backend;
mod error;
mod file;
mod store;

pub use backend::{MemoryBackend, StorageBackend};
pub use error::StoreError;
pub use file::FileBackend;
pub use store::{SESSION_KEY, SessionStore};
