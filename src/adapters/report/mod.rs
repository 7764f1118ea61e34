//! Report Renderer Adapters.
//!
//! - `MarkdownReportRenderer` - Plain Markdown feedback report
//! - `HtmlReportRenderer` - Same report as a standalone HTML page (pulldown-cmark)

mod html_report;
mod markdown_report;

pub use html_report::HtmlReportRenderer;
pub use markdown_report::MarkdownReportRenderer;

use std::sync::Arc;

use crate::ports::ReportRenderer;

/// One renderer per supported report format.
pub fn default_renderers() -> Vec<Arc<dyn ReportRenderer>> {
    vec![
        Arc::new(MarkdownReportRenderer::new()),
        Arc::new(HtmlReportRenderer::new()),
    ]
}
