//! Durable key-value storage behind the list store.
//!
//! # Responsibility
//! - Define the `get`/`set` slot contract the list store consumes.
//! - Keep SQLite details inside the persistence boundary.
//!
//! # Invariants
//! - `set` replaces the whole value of a slot in one statement.
//! - Implementations are `Send + Sync` so one instance can be shared with the
//!   background writer of every store.

pub mod kv_repo;
pub mod memory_kv;
