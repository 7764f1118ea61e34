//! Case domain module.
//!
//! Case definitions, their scoring rubric, the read-only catalog and the
//! selection policy for daily challenges and reattempts.

mod catalog;
mod definition;
mod selector;

pub use catalog::{CaseCatalog, CatalogError};
pub use definition::{
    Case, PatientFacts, ReferenceAnswer, Rubric, RubricCriterion, WEIGHT_TOLERANCE,
};
pub use selector::CaseSelector;
