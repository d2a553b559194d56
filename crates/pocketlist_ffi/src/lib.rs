//! Flutter-facing bridge over `pocketlist_core`.

pub mod api;
