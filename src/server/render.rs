//! HTML pages for the survey.

use std::fmt::Write;

use crate::catalog::{Question, QuestionKind};
use crate::storage::ResponseRecord;

/// Closing message shown once the survey is finished.
pub const THANK_YOU_MESSAGE: &str = "Thank you for your responses!";

/// Escape text for element content and quoted attribute values.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n{}\n</body>\n</html>\n",
        escape_html(title),
        body
    )
}

/// Everything needed to draw one question form.
#[derive(Debug, Clone, Copy)]
pub struct QuestionView<'a> {
    /// Question being shown.
    pub question: &'a Question,
    /// Zero-based position in the catalog.
    pub index: usize,
    /// Number of questions in the catalog.
    pub total: usize,
    /// Text to prefill the input with.
    pub current_answer: Option<&'a str>,
    /// Validation or storage message shown above the form.
    pub error: Option<&'a str>,
}

impl QuestionView<'_> {
    /// The Back button is hidden on the first question.
    pub fn show_back_button(&self) -> bool {
        self.index > 0
    }
}

/// Render a question form posting `response` and `action` to `/question`.
pub fn render_question(view: &QuestionView<'_>) -> String {
    let q = view.question;
    let current = view.current_answer.unwrap_or("");
    let mut body = String::new();

    let _ = writeln!(
        body,
        "<p class=\"progress\">Question {} of {}</p>",
        view.index + 1,
        view.total
    );
    if let Some(error) = view.error {
        let _ = writeln!(body, "<p class=\"error\" role=\"alert\">{}</p>", escape_html(error));
    }
    let _ = writeln!(body, "<form method=\"post\" action=\"/question\">");
    let _ = writeln!(
        body,
        "<label for=\"response\">{}{}</label>",
        escape_html(&q.prompt),
        if q.mandatory { " *" } else { "" }
    );

    match &q.kind {
        QuestionKind::Text => {
            let _ = writeln!(
                body,
                "<input type=\"text\" id=\"response\" name=\"response\" value=\"{}\">",
                escape_html(current)
            );
        }
        QuestionKind::Choice { options } => {
            for option in options {
                let checked = if option == current { " checked" } else { "" };
                let _ = writeln!(
                    body,
                    "<label><input type=\"radio\" name=\"response\" value=\"{0}\"{1}> {0}</label>",
                    escape_html(option),
                    checked
                );
            }
        }
        QuestionKind::Range {
            min,
            max,
            min_label,
            max_label,
        } => {
            if let Some(label) = min_label {
                let _ = write!(body, "<span class=\"range-label\">{}</span>", escape_html(label));
            }
            for value in *min..=*max {
                let value_str = value.to_string();
                let checked = if value_str == current { " checked" } else { "" };
                let _ = write!(
                    body,
                    "<label><input type=\"radio\" name=\"response\" value=\"{0}\"{1}> {0}</label>",
                    value_str, checked
                );
            }
            if let Some(label) = max_label {
                let _ = write!(body, "<span class=\"range-label\">{}</span>", escape_html(label));
            }
            body.push('\n');
        }
    }

    if view.show_back_button() {
        let _ = writeln!(
            body,
            "<button type=\"submit\" name=\"action\" value=\"Back\">Back</button>"
        );
    }
    let _ = writeln!(
        body,
        "<button type=\"submit\" name=\"action\" value=\"Next\">Next</button>"
    );
    body.push_str("</form>");

    page(&q.prompt, &body)
}

/// Render the results table.
pub fn render_results(records: &[ResponseRecord]) -> String {
    let mut body = String::from(
        "<h1>Responses</h1>\n<table>\n<tr><th>Session</th><th>Start time</th><th>#</th><th>Question</th><th>Answer</th></tr>\n",
    );
    for r in records {
        let _ = writeln!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_html(&r.session_id),
            r.start_time.format("%Y-%m-%d %H:%M:%S UTC"),
            r.question_index,
            escape_html(&r.question_prompt),
            escape_html(r.answer.as_deref().unwrap_or(""))
        );
    }
    body.push_str("</table>");
    page("Responses", &body)
}
