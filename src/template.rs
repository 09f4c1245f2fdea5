//! URI template rendering for REST-JSON operations
//!
//! Handles `{label}` and greedy `{label+}` placeholders in operation URIs,
//! e.g. `/cluster/{clusterArn}` or `/objects/{key+}`.

use crate::error::{Error, Result};
use crate::types::JsonObject;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Regex for matching URI labels: {name} or {name+}
static LABEL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-zA-Z_][a-zA-Z0-9_]*)(\+)?\}").unwrap());

/// A placeholder found in a URI template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriLabel {
    /// Member name inside the braces
    pub name: String,
    /// `{name+}`: slashes are kept unencoded
    pub greedy: bool,
}

/// Extract all labels from a URI template, in order of appearance
pub fn labels(template: &str) -> Vec<UriLabel> {
    LABEL_REGEX
        .captures_iter(template)
        .map(|cap| UriLabel {
            name: cap[1].to_string(),
            greedy: cap.get(2).is_some(),
        })
        .collect()
}

/// Check if a string contains URI labels
pub fn has_labels(s: &str) -> bool {
    LABEL_REGEX.is_match(s)
}

/// Render a URI template, percent-encoding each label value
///
/// Every label must have a non-empty value; an empty path segment would
/// address a different resource.
pub fn render_uri(template: &str, values: &JsonObject) -> Result<String> {
    let mut missing = Vec::new();

    let rendered = LABEL_REGEX.replace_all(template, |cap: &regex::Captures<'_>| {
        let name = &cap[1];
        let greedy = cap.get(2).is_some();
        match values.get(name).map(value_to_string) {
            Some(raw) if !raw.is_empty() => encode_label(&raw, greedy),
            _ => {
                missing.push(name.to_string());
                String::new()
            }
        }
    });

    if missing.is_empty() {
        Ok(rendered.into_owned())
    } else {
        Err(Error::config(format!(
            "URI '{template}' is missing values for labels: {}",
            missing.join(", ")
        )))
    }
}

/// Percent-encode a label value; greedy labels keep their slashes
fn encode_label(raw: &str, greedy: bool) -> String {
    if greedy {
        raw.split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/")
    } else {
        urlencoding::encode(raw).into_owned()
    }
}

/// Convert a JSON value to a string for URI and query substitution
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
