//! Tera-based rendering of override templates.

use std::error::Error as _;

use serde::Serialize;
use tera::{Context, Tera};

use super::filters;
use crate::error::{Result, VivError};

/// Renders one template at a time against a value context.
///
/// Holds a Tera instance with the helper filters registered; every render works on a
/// clone of it, so no compiled template outlives its call.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    base: Tera,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer {
    pub fn new() -> Self {
        let mut base = Tera::default();
        base.autoescape_on(vec![]);
        filters::register(&mut base);
        Self { base }
    }

    /// Render `template` (named `name` in errors) with the keys of `values` as top-level
    /// variables.
    pub fn render<V: Serialize>(&self, name: &str, template: &[u8], values: &V) -> Result<Vec<u8>> {
        let render_error = |message: String| VivError::Render {
            path: name.to_string(),
            message,
        };

        let text = std::str::from_utf8(template)
            .map_err(|e| render_error(format!("template is not valid UTF-8: {e}")))?;
        let context = Context::from_serialize(values).map_err(|e| render_error(describe(&e)))?;

        let mut tera = self.base.clone();
        tera.add_raw_template(name, text)
            .map_err(|e| render_error(describe(&e)))?;
        let rendered = tera
            .render(name, &context)
            .map_err(|e| render_error(describe(&e)))?;

        Ok(rendered.into_bytes())
    }
}

/// Flatten a Tera error and its causes into one line.
fn describe(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_yaml::Value;

    fn context() -> Value {
        serde_yaml::from_str(
            r#"
Values:
  image:
    repository: nginx
    tag: "1.25"
  labels:
    app: web
    tier: frontend
Release:
  Name: demo
"#,
        )
        .unwrap()
    }

    fn render(template: &str) -> Result<String> {
        TemplateRenderer::new()
            .render("vivs/values.yaml", template.as_bytes(), &context())
            .map(|bytes| String::from_utf8(bytes).unwrap())
    }

    #[test]
    fn test_render_values() {
        let out = render("image: {{ Values.image.repository }}:{{ Values.image.tag }}\nname: {{ Release.Name }}").unwrap();
        assert_eq!(out, "image: nginx:1.25\nname: demo");
    }

    #[test]
    fn test_helpers_available() {
        let out = render("labels:{{ Values.labels | to_yaml | nindent(width=2) }}").unwrap();
        let parsed: Value = serde_yaml::from_str(&out).unwrap();
        assert_eq!(parsed["labels"]["tier"], Value::String("frontend".into()));

        let out = render("tag: {{ Values.image.tag | quote }}").unwrap();
        assert_eq!(out, "tag: \"1.25\"");

        let out = render("pull: {{ Values.image.pullPolicy | default(value=\"IfNotPresent\") }}").unwrap();
        assert_eq!(out, "pull: IfNotPresent");
    }

    #[test]
    fn test_no_html_escaping() {
        let out = render("url: {{ \"a&b<c>\" }}").unwrap();
        assert_eq!(out, "url: a&b<c>");
    }

    #[test]
    fn test_parse_error_names_file() {
        let err = render("broken: {{ Values.image.tag ").unwrap_err();
        match err {
            VivError::Render { path, message } => {
                assert_eq!(path, "vivs/values.yaml");
                assert!(!message.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_execution_error() {
        let err = render("x: {{ Values.missing.key }}").unwrap_err();
        assert!(matches!(err, VivError::Render { .. }));

        let err = render("x: {{ Values.nothing | default(value=\"\") | required(msg=\"nothing is required\") }}")
            .unwrap_err();
        assert!(err.to_string().contains("nothing is required"));
    }
}
