//! Template-literal views.
//!
//! A [`LiteralView`] holds a string with `${path}` placeholders and fills
//! them from JSON data, the way a template literal interpolates its
//! expressions. Paths are dotted (`user.name`, `items.0.title`); array
//! elements are addressed by index. `$${` produces a literal `${`.

use async_trait::async_trait;
use regex::{Captures, Regex};
use serde_json::Value;
use tracing::debug;

use crate::error::{TemplateError, TemplateResult};
use crate::view::{trace_label, View};

/// A view rendering a template literal against JSON data.
#[derive(Debug, Clone)]
pub struct LiteralView {
    source: String,
    placeholder: Regex,
}

impl LiteralView {
    /// Create a view from template literal source.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            // Match $${ (escape) or ${ path }
            placeholder: Regex::new(r"\$\$\{|\$\{\s*([^}]*?)\s*\}")
                .expect("placeholder pattern is valid"),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Paths referenced by the template, in order of appearance.
    pub fn placeholders(&self) -> Vec<&str> {
        self.placeholder
            .captures_iter(&self.source)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
            .collect()
    }

    /// Interpolate `data` into the template.
    pub fn interpolate(&self, data: &Value) -> TemplateResult<String> {
        let mut output = String::with_capacity(self.source.len());
        let mut last = 0;

        for caps in self.placeholder.captures_iter(&self.source) {
            let whole = caps.get(0).map_or(0..0, |m| m.range());
            output.push_str(&self.source[last..whole.start]);
            last = whole.end;
            output.push_str(&self.expand(&caps, data)?);
        }

        output.push_str(&self.source[last..]);
        Ok(output)
    }

    fn expand(&self, caps: &Captures<'_>, data: &Value) -> TemplateResult<String> {
        let Some(path) = caps.get(1) else {
            return Ok("${".to_string());
        };
        let path = path.as_str();
        if path.is_empty() {
            return Err(TemplateError::Failed("empty placeholder".to_string()));
        }

        let value =
            lookup(data, path).ok_or_else(|| TemplateError::MissingField(path.to_string()))?;
        to_text(value)
    }
}

#[async_trait(?Send)]
impl View for LiteralView {
    type Data = Value;

    fn template(&self, data: &Value) -> TemplateResult<String> {
        debug!(
            view = self.class_reference(),
            "{}",
            trace_label(self.class_reference(), "template")
        );
        self.interpolate(data)
    }
}

/// Resolve a dotted path inside `data`.
fn lookup<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(data, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn to_text(value: &Value) -> TemplateResult<String> {
    Ok(match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => serde_json::to_string(value)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_interpolate_fields() {
        let view = LiteralView::new("Hello, ${name}! You have ${ inbox.unread } messages.");
        let rendered = view
            .interpolate(&json!({"name": "A", "inbox": {"unread": 3}}))
            .unwrap();
        assert_eq!(rendered, "Hello, A! You have 3 messages.");
    }

    #[test]
    fn test_interpolate_array_index_and_scalars() {
        let view = LiteralView::new("${items.1.title}|${flag}|${none}|${items.0}");
        let data = json!({
            "items": [{"title": "first"}, {"title": "second"}],
            "flag": true,
            "none": null,
        });
        assert_eq!(
            view.interpolate(&data).unwrap(),
            r#"second|true|null|{"title":"first"}"#
        );
    }

    #[test]
    fn test_missing_field_is_an_error() {
        let view = LiteralView::new("<p>${user.email}</p>");
        let err = view.interpolate(&json!({"user": {}})).unwrap_err();
        assert!(matches!(err, TemplateError::MissingField(path) if path == "user.email"));
    }

    #[test]
    fn test_empty_placeholder_is_an_error() {
        let view = LiteralView::new("${ }");
        assert!(matches!(
            view.interpolate(&json!({})),
            Err(TemplateError::Failed(_))
        ));
    }

    #[test]
    fn test_escape_and_plain_text() {
        let view = LiteralView::new("cost: $$${price} and $${literal}");
        // In "$$${price}" the first '$' is text and "$${" is the escape.
        assert_eq!(
            view.interpolate(&json!({"price": 5})).unwrap(),
            "cost: $${price} and ${literal}"
        );
        assert_eq!(
            LiteralView::new("no placeholders").interpolate(&json!(null)).unwrap(),
            "no placeholders"
        );
    }

    #[test]
    fn test_placeholders() {
        let view = LiteralView::new("${a} $${b} ${ c.d }");
        assert_eq!(view.placeholders(), vec!["a", "c.d"]);
    }

    #[test]
    fn test_template_hook_uses_interpolation() {
        let view = LiteralView::new("<h1>${title}</h1>");
        assert_eq!(view.template(&json!({"title": "Hi"})).unwrap(), "<h1>Hi</h1>");
    }
}
