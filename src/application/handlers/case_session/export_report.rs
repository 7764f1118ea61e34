//! ExportReportHandler - Renders the feedback report of a scored session.

use std::sync::Arc;

use crate::domain::case::CaseCatalog;
use crate::domain::session::{CaseSession, SessionError};
use crate::ports::{ExportError, ExportedReport, ReportFormat, ReportRenderer};

/// Command to export a report.
#[derive(Debug, Clone, Copy)]
pub struct ExportReportCommand {
    pub format: ReportFormat,
}

/// Handler for report export. Read-only over the session.
pub struct ExportReportHandler {
    catalog: Arc<CaseCatalog>,
    renderers: Vec<Arc<dyn ReportRenderer>>,
}

impl ExportReportHandler {
    /// `renderers` holds at most one renderer per format; the first match wins.
    pub fn new(catalog: Arc<CaseCatalog>, renderers: Vec<Arc<dyn ReportRenderer>>) -> Self {
        Self { catalog, renderers }
    }

    pub fn handle(
        &self,
        session: &CaseSession,
        cmd: ExportReportCommand,
    ) -> Result<ExportedReport, SessionError> {
        let sealed = session.sealed_result()?;
        let case = self.catalog.find(session.case_id())?;

        let renderer = self
            .renderers
            .iter()
            .find(|r| r.format() == cmd.format)
            .ok_or_else(|| {
                SessionError::Export(ExportError::UnsupportedFormat(cmd.format.to_string()).to_string())
            })?;
        let content = renderer
            .render(case, &sealed)
            .map_err(|err| SessionError::Export(err.to_string()))?;

        let base_filename = format!("docquest-{}-{}", case.id(), session.id());
        let report = ExportedReport::new(content, cmd.format, &base_filename);

        tracing::info!(
            session_id = %session.id(),
            format = %cmd.format,
            bytes = report.content.len(),
            "Exported report"
        );
        Ok(report)
    }
}
