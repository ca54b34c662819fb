//! Structured result rendering with a local error boundary.
//!
//! Arbitrary JSON results are rendered to an HTML fragment. Failures are
//! caught here and surfaced inline; "could not render" and "no data" stay
//! distinct, and nothing propagates to the surrounding page.

use askama::Template;
use serde_json::Value;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;

pub const DEFAULT_MAX_DEPTH: usize = 16;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResultViewError {
    #[error("result nests deeper than {0} levels")]
    TooDeep(usize),

    #[error("renderer panicked: {0}")]
    Panicked(String),

    #[error("template error: {0}")]
    Template(String),
}

impl From<askama::Error> for ResultViewError {
    fn from(e: askama::Error) -> Self {
        ResultViewError::Template(e.to_string())
    }
}

const NO_DATA_HTML: &str = "<p class=\"result-empty\">No data</p>";
const FAILED_HTML: &str = "<p class=\"result-error\">Could not render result</p>";

#[derive(Template)]
#[template(source = r#"<p class="result-error">Could not render result: {{ reason }}</p>"#, ext = "html")]
struct FailedMessage<'a> {
    reason: &'a str,
}

#[derive(Template)]
#[template(source = "{{ text }}", ext = "html")]
struct ResultText<'a> {
    text: &'a str,
}

#[derive(Template)]
#[template(
    source = r#"<ol class="result-list">{% for item in items %}<li>{{ item|safe }}</li>{% endfor %}</ol>"#,
    ext = "html"
)]
struct ResultList {
    items: Vec<String>,
}

#[derive(Template)]
#[template(
    source = r#"<table class="result-table">
{%- for (key, value) in rows -%}
<tr><th>{{ key }}</th><td>{{ value|safe }}</td></tr>
{%- endfor -%}
</table>"#,
    ext = "html"
)]
struct ResultTable<'a> {
    rows: Vec<(&'a str, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    Rendered(String),
    NoData,
    Failed(String),
}

impl RenderOutcome {
    /// Inline fragment for the embedding page.
    pub fn to_html(&self) -> String {
        match self {
            RenderOutcome::Rendered(html) => html.clone(),
            RenderOutcome::NoData => NO_DATA_HTML.to_string(),
            RenderOutcome::Failed(reason) => FailedMessage { reason }
                .render()
                .unwrap_or_else(|_| FAILED_HTML.to_string()),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, RenderOutcome::Failed(_))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ResultView {
    max_depth: usize,
}

impl ResultView {
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn render(&self, value: &Value) -> RenderOutcome {
        if is_empty(value) {
            return RenderOutcome::NoData;
        }
        Self::guard(|| self.render_value(value, 0).map(Some))
    }

    /// Run any renderer behind the boundary. `Ok(None)` means no data.
    pub fn guard<F, E>(render: F) -> RenderOutcome
    where
        F: FnOnce() -> Result<Option<String>, E>,
        E: std::fmt::Display,
    {
        match panic::catch_unwind(AssertUnwindSafe(render)) {
            Ok(Ok(Some(html))) => RenderOutcome::Rendered(html),
            Ok(Ok(None)) => RenderOutcome::NoData,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Result rendering failed");
                RenderOutcome::Failed(e.to_string())
            }
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                let error = ResultViewError::Panicked(message);
                tracing::warn!(%error, "Result renderer panicked");
                RenderOutcome::Failed(error.to_string())
            }
        }
    }

    fn render_value(&self, value: &Value, depth: usize) -> Result<String, ResultViewError> {
        if depth > self.max_depth {
            return Err(ResultViewError::TooDeep(self.max_depth));
        }

        let html = match value {
            Value::Null => "<span class=\"result-null\">&mdash;</span>".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => ResultText { text: s }.render()?,
            Value::Array(items) => ResultList {
                items: items
                    .iter()
                    .map(|item| self.render_value(item, depth + 1))
                    .collect::<Result<_, _>>()?,
            }
            .render()?,
            Value::Object(map) => ResultTable {
                rows: map
                    .iter()
                    .map(|(key, item)| Ok((key.as_str(), self.render_value(item, depth + 1)?)))
                    .collect::<Result<_, ResultViewError>>()?,
            }
            .render()?,
        };
        Ok(html)
    }
}

impl Default for ResultView {
    fn default() -> Self {
        Self::new()
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_values_are_no_data() {
        let view = ResultView::new();
        for value in [json!(null), json!([]), json!({})] {
            assert_eq!(view.render(&value), RenderOutcome::NoData);
        }
        assert_eq!(RenderOutcome::NoData.to_html(), "<p class=\"result-empty\">No data</p>");
    }

    #[test]
    fn renders_nested_structures() {
        let value = json!({"opens": 42, "clicks": [1, 2], "label": "<b>x</b>"});
        let RenderOutcome::Rendered(html) = ResultView::new().render(&value) else {
            panic!("expected rendered outcome");
        };
        assert!(html.contains("<th>opens</th><td>42</td>"));
        assert!(html.contains("<ol class=\"result-list\"><li>1</li><li>2</li></ol>"));
        assert!(html.contains("&lt;b&gt;x&lt;/b&gt;"));
    }

    #[test]
    fn too_deep_is_failed_not_no_data() {
        let value = json!({"a": {"b": {"c": 1}}});
        let outcome = ResultView::with_max_depth(1).render(&value);
        assert!(outcome.is_failed());
        assert!(outcome.to_html().starts_with("<p class=\"result-error\">Could not render result:"));
    }

    #[test]
    fn panics_are_contained() {
        let outcome = ResultView::guard::<_, ResultViewError>(|| panic!("boom"));
        assert_eq!(outcome, RenderOutcome::Failed("renderer panicked: boom".to_string()));
    }

    #[test]
    fn guard_passes_through_no_data() {
        let outcome = ResultView::guard::<_, ResultViewError>(|| Ok(None));
        assert_eq!(outcome, RenderOutcome::NoData);
    }
}
