//! Case selection policy.
//!
//! "Today's challenge" must be reproducible: the same calendar date and the
//! same catalog always feature the same case. The date is hashed with SHA-256
//! rather than `std`'s hasher, whose output is not stable across releases.

use chrono::NaiveDate;
use sha2::{Digest, Sha256};

use super::{Case, CaseCatalog, CatalogError};
use crate::domain::foundation::CaseId;

/// Stateless selection policy over a catalog.
pub struct CaseSelector;

impl CaseSelector {
    /// Picks the featured case for a calendar date.
    ///
    /// The catalog is never empty, so this always yields a case.
    pub fn today_challenge(catalog: &CaseCatalog, date: NaiveDate) -> &Case {
        let position = Self::index_for(date, catalog.len());
        &catalog.cases()[position]
    }

    /// Resolves a reattempt request to its case.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the id is not in the catalog
    pub fn reattempt<'a>(case_id: &CaseId, catalog: &'a CaseCatalog) -> Result<&'a Case, CatalogError> {
        catalog.find(case_id)
    }

    fn index_for(date: NaiveDate, len: usize) -> usize {
        let digest = Sha256::digest(date.format("%Y-%m-%d").to_string().as_bytes());
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        (u64::from_be_bytes(prefix) % len.max(1) as u64) as usize
    }
}
