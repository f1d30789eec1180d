//! Views over status results.
//!
//! The service omits whatever does not apply to the current player state
//! and is loose about value types, so these views read only what the
//! commands need and never reject a result.

pub mod status;

pub use status::{Resource, Status, Track};
