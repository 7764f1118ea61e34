//! HTML feedback report rendered with pulldown-cmark.

use pulldown_cmark::{html, Event, Options, Parser};

use super::MarkdownReportRenderer;
use crate::domain::case::Case;
use crate::domain::session::SealedResult;
use crate::ports::{ExportError, ReportFormat, ReportRenderer};

/// Renders the Markdown report as a standalone HTML page.
///
/// Raw HTML in learner or evaluator text is escaped, never passed through.
#[derive(Debug, Clone)]
pub struct HtmlReportRenderer {
    markdown: MarkdownReportRenderer,
    include_default_css: bool,
}

impl Default for HtmlReportRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlReportRenderer {
    pub fn new() -> Self {
        Self {
            markdown: MarkdownReportRenderer::new(),
            include_default_css: true,
        }
    }

    /// Disable default CSS styling.
    pub fn without_default_css(mut self) -> Self {
        self.include_default_css = false;
        self
    }

    fn to_html(markdown: &str) -> String {
        let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
        let parser = Parser::new_ext(markdown, options).map(|event| match event {
            Event::Html(raw) => Event::Text(raw),
            other => other,
        });

        let mut body = String::new();
        html::push_html(&mut body, parser);
        body
    }

    fn wrap_html(&self, body: String, title: &str) -> String {
        let css = if self.include_default_css {
            DEFAULT_CSS
        } else {
            ""
        };

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
{css}
    </style>
</head>
<body>
    <article class="case-report">
{body}
    </article>
</body>
</html>"#,
            title = html_escape(title),
            css = css,
            body = body
        )
    }
}

impl ReportRenderer for HtmlReportRenderer {
    fn format(&self) -> ReportFormat {
        ReportFormat::Html
    }

    fn render(&self, case: &Case, result: &SealedResult) -> Result<Vec<u8>, ExportError> {
        let markdown = self.markdown.compose(case, result)?;
        let title = format!("Case Report: {}", case.title());
        Ok(self.wrap_html(Self::to_html(&markdown), &title).into_bytes())
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const DEFAULT_CSS: &str = r#"
body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Arial, sans-serif;
    line-height: 1.6;
    color: #1f2937;
    max-width: 860px;
    margin: 0 auto;
    padding: 2rem;
}
h1 { border-bottom: 2px solid #0f766e; padding-bottom: 0.5rem; }
h2 { border-bottom: 1px solid #e5e7eb; padding-bottom: 0.25rem; margin-top: 1.5em; }
table { border-collapse: collapse; margin: 1em 0; }
th, td { border: 1px solid #e5e7eb; padding: 0.4rem 0.8rem; text-align: left; }
th { background: #f3f4f6; }
blockquote { border-left: 4px solid #dc2626; margin: 1em 0; padding: 0.5em 1em; background: #fef2f2; }
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::case::Rubric;
    use crate::domain::foundation::{CaseId, Score};
    use crate::domain::session::{CaseSession, Commentary, EvaluationFeedback, Submission};

    fn case(title: &str) -> Case {
        Case::new(
            CaseId::new("C2").unwrap(),
            title,
            "Cardiology",
            "Chest pain for two hours",
            "Acute myocardial infarction",
            "Aspirin and cath lab",
        )
    }

    fn sealed(diagnosis: &str) -> SealedResult {
        let mut session = CaseSession::start(CaseId::new("C2").unwrap());
        session
            .submit(Submission::new(diagnosis, vec!["ECG".into()], "Aspirin").unwrap())
            .unwrap();
        let feedback = EvaluationFeedback::from_criterion_scores(
            &Rubric::standard(),
            vec![
                ("diagnosis".into(), Score::new(90)),
                ("investigations".into(), Score::new(90)),
                ("management".into(), Score::new(90)),
            ],
            Commentary::default(),
        )
        .unwrap();
        session.record_feedback(feedback).unwrap();
        session.sealed_result().unwrap()
    }

    fn render(case: &Case, result: &SealedResult) -> String {
        String::from_utf8(HtmlReportRenderer::new().render(case, result).unwrap()).unwrap()
    }

    #[test]
    fn renders_full_document_with_table() {
        let html = render(&case("Crushing chest pain"), &sealed("STEMI"));

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Case Report: Crushing chest pain</title>"));
        assert!(html.contains("<table>"));
        assert!(html.contains("<h2>Score: 90/100</h2>"));
    }

    #[test]
    fn raw_html_in_submission_is_escaped() {
        let html = render(&case("Chest pain"), &sealed("<script>alert(1)</script>"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn title_is_escaped() {
        let html = render(&case("Pain <&> fever"), &sealed("MI"));
        assert!(html.contains("<title>Case Report: Pain &lt;&amp;&gt; fever</title>"));
    }

    #[test]
    fn css_can_be_disabled() {
        let renderer = HtmlReportRenderer::new().without_default_css();
        let html = String::from_utf8(renderer.render(&case("X"), &sealed("MI")).unwrap()).unwrap();
        assert!(!html.contains("font-family"));
        assert_eq!(renderer.format(), ReportFormat::Html);
    }
}
