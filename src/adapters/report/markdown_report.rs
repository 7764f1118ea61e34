//! Markdown feedback report.

use std::fmt::Write;

use crate::domain::case::Case;
use crate::domain::session::SealedResult;
use crate::ports::{ExportError, ReportFormat, ReportRenderer};

/// Renders a sealed result as a Markdown document.
#[derive(Debug, Clone, Default)]
pub struct MarkdownReportRenderer;

impl MarkdownReportRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Builds the Markdown text of the report.
    pub fn compose(&self, case: &Case, result: &SealedResult) -> Result<String, ExportError> {
        self.write_report(case, result)
            .map_err(|e| ExportError::RenderFailed(e.to_string()))
    }

    fn write_report(&self, case: &Case, result: &SealedResult) -> Result<String, std::fmt::Error> {
        let submission = result.submission();
        let feedback = result.feedback();
        let reference = case.reference_answer();
        let mut out = String::new();

        writeln!(out, "# Case Report: {}", case.title())?;
        writeln!(out)?;
        writeln!(out, "- **Case:** {} ({})", case.id(), case.category())?;
        writeln!(out, "- **Session:** {}", result.session_id())?;
        writeln!(
            out,
            "- **Scored:** {}",
            result.scored_at().as_datetime().format("%Y-%m-%d %H:%M UTC")
        )?;
        writeln!(out, "- **Questions asked:** {}", result.question_count())?;
        writeln!(out)?;

        writeln!(out, "## Presenting Complaint")?;
        writeln!(out)?;
        writeln!(out, "{}", case.presenting_complaint())?;
        writeln!(out)?;

        writeln!(out, "## Your Submission")?;
        writeln!(out)?;
        writeln!(out, "- **Provisional diagnosis:** {}", submission.provisional_diagnosis())?;
        writeln!(out, "- **Investigations:** {}", join_or_none(submission.investigations()))?;
        writeln!(out, "- **Management plan:** {}", or_none(submission.management_plan()))?;
        writeln!(out)?;

        writeln!(out, "## Reference Answer")?;
        writeln!(out)?;
        writeln!(out, "- **Diagnosis:** {}", reference.diagnosis)?;
        writeln!(out, "- **Investigations:** {}", join_or_none(reference.investigations))?;
        writeln!(out, "- **Management plan:** {}", or_none(reference.management_plan))?;
        writeln!(out)?;

        writeln!(out, "## Score: {}", feedback.score())?;
        writeln!(out)?;
        writeln!(out, "| Criterion | Weight | Score |")?;
        writeln!(out, "|-----------|--------|-------|")?;
        for criterion in feedback.criterion_scores() {
            writeln!(
                out,
                "| {} | {:.0}% | {} |",
                criterion.criterion,
                criterion.weight * 100.0,
                criterion.score.value()
            )?;
        }
        writeln!(out)?;

        if feedback.red_flags() {
            writeln!(out, "> **Red flag:** the plan misses something unsafe. Review the gaps below.")?;
            writeln!(out)?;
        }

        write_section(&mut out, "Strengths", feedback.strengths())?;
        write_section(&mut out, "Gaps", feedback.gaps())?;
        write_section(&mut out, "Learning Points", feedback.learning_points())?;

        Ok(out)
    }
}

impl ReportRenderer for MarkdownReportRenderer {
    fn format(&self) -> ReportFormat {
        ReportFormat::Markdown
    }

    fn render(&self, case: &Case, result: &SealedResult) -> Result<Vec<u8>, ExportError> {
        Ok(self.compose(case, result)?.into_bytes())
    }
}

fn write_section(out: &mut String, heading: &str, items: &[String]) -> std::fmt::Result {
    writeln!(out, "## {}", heading)?;
    writeln!(out)?;
    if items.is_empty() {
        writeln!(out, "_None noted._")?;
    }
    for item in items {
        writeln!(out, "- {}", item)?;
    }
    writeln!(out)
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "None".to_string()
    } else {
        items.join(", ")
    }
}

fn or_none(text: &str) -> &str {
    if text.is_empty() {
        "None"
    } else {
        text
    }
}
