//! Transient records exchanged with clients.
//!
//! Nothing here is persisted; the provider's asset store is the source of truth.

pub mod asset;
pub mod form;
pub mod upload;
