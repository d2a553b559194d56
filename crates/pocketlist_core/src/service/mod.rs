//! Use-case services for the Notes and Tasks screens.
//!
//! # Responsibility
//! - Validate user input before a record reaches its store.
//! - Track per-screen expansion state next to the collection it refers to.
//!
//! # Invariants
//! - Records are created only through `create_*`, which assign fresh ids.
//! - Services never bypass the store's persistence contract.

pub mod note_service;
pub mod selection;
pub mod task_service;
