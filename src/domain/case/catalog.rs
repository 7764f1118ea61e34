//! Case catalog - the fixed, read-only set of cases.
//!
//! Loaded once at startup from a JSON (`{"cases": [...]}`) or YAML file and
//! never mutated afterwards. Order of the source file is preserved; the daily
//! challenge depends on it.

use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use thiserror::Error;

use super::Case;
use crate::domain::foundation::{CaseId, ErrorCode};

/// Errors raised while loading or querying the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("case not found: {0}")]
    NotFound(CaseId),

    #[error("catalog contains no cases")]
    Empty,

    #[error("duplicate case id in catalog: {0}")]
    DuplicateId(CaseId),

    #[error("failed to read catalog {path}: {message}")]
    Io { path: String, message: String },

    #[error("failed to parse catalog: {0}")]
    Parse(String),

    #[error("unsupported catalog format: {0}")]
    UnsupportedFormat(String),
}

impl CatalogError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CatalogError::NotFound(_) => ErrorCode::CaseNotFound,
            _ => ErrorCode::CatalogError,
        }
    }

    /// Only a failed read may succeed on a second attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CatalogError::Io { .. })
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    cases: Vec<Case>,
}

/// Ordered collection of cases keyed by unique id.
///
/// # Invariants
///
/// - At least one case
/// - Case ids are unique
#[derive(Debug, Clone)]
pub struct CaseCatalog {
    cases: Vec<Case>,
    index: HashMap<CaseId, usize>,
}

impl CaseCatalog {
    /// Builds a catalog from cases in display order.
    pub fn new(cases: Vec<Case>) -> Result<Self, CatalogError> {
        if cases.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut index = HashMap::with_capacity(cases.len());
        for (position, case) in cases.iter().enumerate() {
            if index.insert(case.id().clone(), position).is_some() {
                return Err(CatalogError::DuplicateId(case.id().clone()));
            }
        }

        Ok(Self { cases, index })
    }

    /// Parses a JSON catalog document.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile =
            serde_json::from_str(json).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Self::new(file.cases)
    }

    /// Parses a YAML catalog document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile =
            serde_yaml::from_str(yaml).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Self::new(file.cases)
    }

    /// Loads a catalog file, choosing the parser from its extension.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| CatalogError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let catalog = match extension.as_str() {
            "json" => Self::from_json_str(&content)?,
            "yaml" | "yml" => Self::from_yaml_str(&content)?,
            other => return Err(CatalogError::UnsupportedFormat(other.to_string())),
        };

        tracing::info!(
            path = %path.display(),
            cases = catalog.len(),
            "Loaded case catalog"
        );
        Ok(catalog)
    }

    /// Returns the case with the given id, if any.
    pub fn get(&self, id: &CaseId) -> Option<&Case> {
        self.index.get(id).map(|&position| &self.cases[position])
    }

    /// Returns the case with the given id.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the id is absent
    pub fn find(&self, id: &CaseId) -> Result<&Case, CatalogError> {
        self.get(id).ok_or_else(|| CatalogError::NotFound(id.clone()))
    }

    /// Returns the case at a position in catalog order.
    pub fn at(&self, position: usize) -> Option<&Case> {
        self.cases.get(position)
    }

    /// All cases in catalog order.
    pub fn cases(&self) -> &[Case] {
        &self.cases
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Distinct categories, sorted alphabetically.
    pub fn categories(&self) -> Vec<&str> {
        self.cases
            .iter()
            .map(Case::category)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Cases belonging to a category, in catalog order.
    pub fn cases_in_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Case> + 'a {
        self.cases.iter().filter(move |c| c.category() == category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG_JSON: &str = r#"{
        "cases": [
            {
                "id": "C1",
                "title": "Right lower quadrant pain",
                "category": "Surgery",
                "presenting_complaint": "Abdominal pain since yesterday",
                "reference_diagnosis": "Acute appendicitis",
                "reference_plan": "Surgical referral"
            },
            {
                "id": "C2",
                "title": "Crushing chest pain",
                "category": "Cardiology",
                "presenting_complaint": "Chest pain for two hours",
                "reference_diagnosis": "Acute myocardial infarction",
                "reference_plan": "Aspirin, ECG, cath lab activation"
            },
            {
                "id": "C3",
                "title": "Fever and flank pain",
                "category": "Surgery",
                "presenting_complaint": "Fever and left flank pain",
                "reference_diagnosis": "Pyelonephritis",
                "reference_plan": "Urine culture and IV antibiotics"
            }
        ]
    }"#;

    #[test]
    fn parses_json_catalog_in_order() {
        let catalog = CaseCatalog::from_json_str(CATALOG_JSON).unwrap();
        let ids: Vec<_> = catalog.cases().iter().map(|c| c.id().as_str()).collect();
        assert_eq!(ids, vec!["C1", "C2", "C3"]);
    }

    #[test]
    fn parses_yaml_catalog() {
        let yaml = r#"
cases:
  - id: Y1
    title: Headache
    category: Neurology
    presenting_complaint: Sudden severe headache
    reference_diagnosis: Subarachnoid haemorrhage
    reference_plan: Urgent CT head
"#;
        let catalog = CaseCatalog::from_yaml_str(yaml).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.at(0).unwrap().category(), "Neurology");
    }

    #[test]
    fn rejects_empty_catalog() {
        let result = CaseCatalog::from_json_str(r#"{"cases": []}"#);
        assert_eq!(result.unwrap_err(), CatalogError::Empty);
    }

    #[test]
    fn rejects_duplicate_ids() {
        let case = CaseCatalog::from_json_str(CATALOG_JSON).unwrap().cases()[0].clone();
        let result = CaseCatalog::new(vec![case.clone(), case]);
        assert!(matches!(result, Err(CatalogError::DuplicateId(_))));
    }

    #[test]
    fn malformed_document_is_a_parse_error() {
        let result = CaseCatalog::from_json_str("{\"cases\": [");
        assert!(matches!(result, Err(CatalogError::Parse(_))));
    }

    #[test]
    fn find_reports_missing_case() {
        let catalog = CaseCatalog::from_json_str(CATALOG_JSON).unwrap();
        let missing = CaseId::new("C99").unwrap();

        let err = catalog.find(&missing).unwrap_err();
        assert_eq!(err, CatalogError::NotFound(missing));
        assert_eq!(err.code(), ErrorCode::CaseNotFound);
    }

    #[test]
    fn categories_are_distinct_and_sorted() {
        let catalog = CaseCatalog::from_json_str(CATALOG_JSON).unwrap();
        assert_eq!(catalog.categories(), vec!["Cardiology", "Surgery"]);
    }

    #[test]
    fn cases_in_category_keeps_catalog_order() {
        let catalog = CaseCatalog::from_json_str(CATALOG_JSON).unwrap();
        let surgery: Vec<_> = catalog
            .cases_in_category("Surgery")
            .map(|c| c.id().as_str())
            .collect();
        assert_eq!(surgery, vec!["C1", "C3"]);
    }

    #[tokio::test]
    async fn load_rejects_unknown_extension() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("cases.txt");
        std::fs::write(&path, CATALOG_JSON).unwrap();

        let result = CaseCatalog::load(&path).await;
        assert!(matches!(result, Err(CatalogError::UnsupportedFormat(_))));
    }

    #[tokio::test]
    async fn load_reads_json_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("cases.json");
        std::fs::write(&path, CATALOG_JSON).unwrap();

        let catalog = CaseCatalog::load(&path).await.unwrap();
        assert_eq!(catalog.len(), 3);
    }

    #[tokio::test]
    async fn load_reports_missing_file() {
        let result = CaseCatalog::load("/nonexistent/cases.json").await;
        assert!(matches!(result, Err(CatalogError::Io { .. })));
    }
}
