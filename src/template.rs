//! Template interpolation for site definitions
//!
//! Handles `{{ variable }}` interpolation in list and item URLs.
//! Supports `{{ page }}`, nested item access like `{{ item.slug }}` and
//! user variables like `{{ vars.category }}`.

use crate::error::{Error, Result};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Regex for matching template variables: {{ variable.path }}
static TEMPLATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([a-zA-Z_][a-zA-Z0-9_]*(?:\.[a-zA-Z_][a-zA-Z0-9_]*)*)\s*\}\}")
        .expect("template regex is valid")
});

/// Context for template interpolation
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    /// Current list page
    pub page: Option<u32>,
    /// Current item record
    pub item: Value,
    /// User variables from the site definition
    pub vars: Value,
}

impl TemplateContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create context with user variables
    pub fn with_vars(vars: Value) -> Self {
        Self {
            vars,
            ..Default::default()
        }
    }

    /// Set the page number
    pub fn set_page(&mut self, page: u32) -> &mut Self {
        self.page = Some(page);
        self
    }

    /// Set the item record
    pub fn set_item(&mut self, item: Value) -> &mut Self {
        self.item = item;
        self
    }

    /// Set user variables
    pub fn set_vars(&mut self, vars: Value) -> &mut Self {
        self.vars = vars;
        self
    }

    /// Get a value by path (e.g., "item.slug").
    ///
    /// Unknown roots are looked up in the user variables.
    pub fn get(&self, path: &str) -> Option<Value> {
        let parts: Vec<&str> = path.split('.').collect();

        match parts.as_slice() {
            ["page"] => self.page.map(Value::from),
            ["item", rest @ ..] => get_nested_value(&self.item, rest).cloned(),
            ["vars", rest @ ..] => get_nested_value(&self.vars, rest).cloned(),
            _ => get_nested_value(&self.vars, &parts).cloned(),
        }
    }
}

/// Get a nested value from a JSON value by path
fn get_nested_value<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for part in path {
        match current {
            Value::Object(map) => {
                current = map.get(*part)?;
            }
            _ => return None,
        }
    }
    Some(current)
}

/// Render a template string with the given context
pub fn render(template: &str, ctx: &TemplateContext) -> Result<String> {
    let mut result = String::with_capacity(template.len());
    let mut last = 0;
    let mut errors = Vec::new();

    for cap in TEMPLATE_REGEX.captures_iter(template) {
        let (Some(full_match), Some(var_path)) = (cap.get(0), cap.get(1)) else {
            continue;
        };

        result.push_str(&template[last..full_match.start()]);
        match ctx.get(var_path.as_str()) {
            Some(value) => result.push_str(&value_to_string(&value)),
            None => errors.push(var_path.as_str().to_string()),
        }
        last = full_match.end();
    }
    result.push_str(&template[last..]);

    if errors.is_empty() {
        Ok(result)
    } else {
        Err(Error::undefined_var(errors.join(", ")))
    }
}

/// Check if a string contains template variables
pub fn has_templates(s: &str) -> bool {
    TEMPLATE_REGEX.is_match(s)
}

/// Extract all variable names from a template
pub fn extract_variables(template: &str) -> Vec<String> {
    TEMPLATE_REGEX
        .captures_iter(template)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// Convert a JSON value to a string for template substitution
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        // For complex types, use JSON serialization
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_substitution() {
        let mut ctx = TemplateContext::new();
        ctx.set_page(3);

        let result = render("https://shop.example.com/list?page={{ page }}", &ctx).unwrap();
        assert_eq!(result, "https://shop.example.com/list?page=3");
    }

    #[test]
    fn test_item_and_vars_substitution() {
        let mut ctx = TemplateContext::with_vars(json!({"lang": "en"}));
        ctx.set_item(json!({"slug": "blue-kettle", "meta": {"shop": 7}}));

        let result = render(
            "/{{ vars.lang }}/{{ item.meta.shop }}/{{ item.slug }}?l={{ lang }}",
            &ctx,
        )
        .unwrap();
        assert_eq!(result, "/en/7/blue-kettle?l=en");
    }

    #[test]
    fn test_undefined_variable() {
        let ctx = TemplateContext::new();
        let result = render("{{ page }}/{{ item.missing }}", &ctx);
        let message = result.unwrap_err().to_string();
        assert!(message.contains("page"));
        assert!(message.contains("item.missing"));
    }

    #[test]
    fn test_no_templates() {
        let ctx = TemplateContext::new();
        let result = render("plain string without templates", &ctx).unwrap();
        assert_eq!(result, "plain string without templates");
    }

    #[test]
    fn test_repeated_variable() {
        let mut ctx = TemplateContext::new();
        ctx.set_page(2);
        assert_eq!(render("{{page}}-{{ page }}", &ctx).unwrap(), "2-2");
    }

    #[test]
    fn test_has_templates() {
        assert!(has_templates("{{ page }}"));
        assert!(has_templates("prefix {{ item.id }} suffix"));
        assert!(!has_templates("no templates here"));
        assert!(!has_templates("{ not a template }"));
    }

    #[test]
    fn test_extract_variables() {
        let vars = extract_variables("{{ page }} and {{ item.id }}");
        assert_eq!(vars, vec!["page", "item.id"]);
    }

    #[test]
    fn test_value_to_string() {
        assert_eq!(value_to_string(&json!(true)), "true");
        assert_eq!(value_to_string(&json!(null)), "");
        assert_eq!(value_to_string(&json!([1, 2])), "[1,2]");
    }
}
