//! Record model for the two list collections.
//!
//! # Responsibility
//! - Define the `Note` and `Task` records mirrored into durable slots.
//! - Define the shared `Record` contract the list store relies on.
//!
//! # Invariants
//! - Every record carries a `RecordId` unique within its collection.
//! - Wire field names are camelCase.

pub mod note;
pub mod record;
pub mod task;
