//! Progress domain module.
//!
//! Statistics derived on demand from the attempt history. Nothing here is
//! stored.

pub mod badge;
pub mod snapshot;

pub use badge::{Badge, BEGINNER_MAX, PRO_MIN, PRO_MIN_ATTEMPTS};
pub use snapshot::ProgressSnapshot;
