//! DocQuest - Clinical Case Simulation Engine
//!
//! Learners interview a simulated patient, submit a provisional diagnosis
//! with investigations and a management plan, and receive rubric-based
//! feedback. Scored attempts go to an append-only history from which
//! progress and badges are derived.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
