//! Value extraction from JSON and HTML pages

use crate::error::{Error, Result};
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

// ============================================================================
// JSON
// ============================================================================

/// Extract every value matched by a path.
///
/// Arrays are flattened into their elements; a missing path yields nothing.
/// Paths containing wildcards go through JSONPath.
pub fn extract_all(value: &Value, path: &str) -> Result<Vec<Value>> {
    if path.contains('*') && !path.contains("[-") {
        return extract_with_jsonpath(value, path);
    }

    match extract_simple_path(value, path) {
        Some(Value::Array(arr)) => Ok(arr),
        Some(Value::Null) | None => Ok(vec![]),
        Some(v) => Ok(vec![v]),
    }
}

/// Extract a value using simple dot-notation path (`data.items`, `list[0]`,
/// `list[-1]`)
pub fn extract_simple_path(value: &Value, path: &str) -> Option<Value> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    if path.is_empty() || path == "$" {
        return Some(value.clone());
    }

    let mut current = value;
    for part in path.split('.') {
        let Some(bracket_pos) = part.find('[') else {
            current = current.get(part)?;
            continue;
        };

        let name = &part[..bracket_pos];
        let index_str = part[bracket_pos + 1..].strip_suffix(']')?;

        if !name.is_empty() {
            current = current.get(name)?;
        }

        let index = index_str.parse::<i64>().ok()?;
        let Value::Array(arr) = current else {
            return None;
        };
        let idx = if index < 0 {
            arr.len().checked_sub(index.unsigned_abs() as usize)?
        } else {
            index as usize
        };
        current = arr.get(idx)?;
    }

    Some(current.clone())
}

/// Extract values using jsonpath-rust
fn extract_with_jsonpath(value: &Value, path: &str) -> Result<Vec<Value>> {
    use jsonpath_rust::JsonPath;

    let jp = JsonPath::try_from(path)
        .map_err(|e| Error::extract(path, format!("Invalid JSONPath: {e}")))?;

    match jp.find(value) {
        Value::Array(arr) => Ok(arr),
        Value::Null => Ok(vec![]),
        other => Ok(vec![other]),
    }
}

/// Read a count from a JSON number or numeric string
pub fn value_as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => parse_count(s),
        _ => None,
    }
}

/// Read a value as a string key (IDs, URLs)
pub fn value_as_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// ============================================================================
// HTML
// ============================================================================

/// A CSS selector, optionally reading an attribute: `a.title@href`.
///
/// An empty selector (`@href`) targets the scoping element itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSelector {
    css: String,
    attr: Option<String>,
}

impl FieldSelector {
    /// Split a `selector@attribute` pattern
    pub fn new(pattern: &str) -> Self {
        match pattern.rsplit_once('@') {
            Some((css, attr)) if is_attr_name(attr) => Self {
                css: css.trim().to_string(),
                attr: Some(attr.to_string()),
            },
            _ => Self {
                css: pattern.trim().to_string(),
                attr: None,
            },
        }
    }

    /// CSS part of the pattern
    pub fn css(&self) -> &str {
        &self.css
    }

    /// Attribute part of the pattern
    pub fn attr(&self) -> Option<&str> {
        self.attr.as_deref()
    }

    /// Check that the CSS part parses
    pub fn validate(&self, field: &str) -> Result<()> {
        self.selector(field).map(|_| ())
    }

    fn selector(&self, field: &str) -> Result<Option<Selector>> {
        if self.css.is_empty() {
            return Ok(None);
        }
        parse_selector(field, &self.css).map(Some)
    }

    /// First match in a document, or `null`
    pub fn extract_from_document(&self, field: &str, document: &Html) -> Result<Value> {
        let Some(selector) = self.selector(field)? else {
            return Ok(Value::Null);
        };
        Ok(document
            .select(&selector)
            .next()
            .map_or(Value::Null, |el| self.read(el)))
    }

    /// First match inside an element (or the element itself), or `null`
    pub fn extract_from_element(&self, field: &str, element: ElementRef<'_>) -> Result<Value> {
        match self.selector(field)? {
            Some(selector) => Ok(element
                .select(&selector)
                .next()
                .map_or(Value::Null, |el| self.read(el))),
            None => Ok(self.read(element)),
        }
    }

    /// Check whether the selector matches anything in a document
    pub fn matches(&self, field: &str, document: &Html) -> Result<bool> {
        match self.selector(field)? {
            Some(selector) => Ok(document.select(&selector).next().is_some()),
            None => Ok(false),
        }
    }

    fn read(&self, element: ElementRef<'_>) -> Value {
        match &self.attr {
            Some(attr) => element
                .value()
                .attr(attr)
                .map_or(Value::Null, |v| Value::String(v.trim().to_string())),
            None => Value::String(element_text(element)),
        }
    }
}

fn is_attr_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
}

/// Text content with whitespace collapsed
pub fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse the first number in a text such as `"1,204 results"`
pub fn parse_count(text: &str) -> Option<u64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || matches!(*c, ',' | '\u{a0}' | ' '))
        .filter(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

fn parse_selector(field: &str, css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::extract(field, format!("invalid selector '{css}': {e}")))
}

/// Check that a plain CSS selector parses
pub fn validate_selector(field: &str, css: &str) -> Result<()> {
    parse_selector(field, css).map(|_| ())
}

/// Select every element matched by a CSS selector
pub fn select_elements<'a>(document: &'a Html, css: &str) -> Result<Vec<ElementRef<'a>>> {
    let selector = parse_selector("items_path", css)?;
    Ok(document.select(&selector).collect())
}
