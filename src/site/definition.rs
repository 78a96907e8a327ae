//! Site definition types
//!
//! A site definition describes a paginated listing declaratively so it can
//! be scraped without writing an [`ItemListSource`](crate::ItemListSource).

use crate::error::{Error, Result};
use crate::template::{self, TemplateContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

// ============================================================================
// Site Definition
// ============================================================================

/// Declarative description of a listing and its item pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteDefinition {
    /// Site name, used in logs
    pub name: String,

    /// List page URL template, e.g. `https://shop/list?page={{ page }}`
    pub list_url: String,

    /// Base for relative item URLs (defaults to the first list page)
    #[serde(default)]
    pub base_url: Option<String>,

    /// Format of the list pages
    #[serde(default)]
    pub format: PageFormat,

    /// Where the items are: a JSON path for JSON pages, a CSS selector
    /// for HTML pages
    pub items_path: String,

    /// Fields extracted from each item element of an HTML list page
    #[serde(default)]
    pub item_fields: BTreeMap<String, String>,

    /// Field of the item record holding its URL
    #[serde(default)]
    pub item_url: Option<String>,

    /// Item URL template over `{{ item.* }}`; used when `item_url` is unset
    #[serde(default)]
    pub item_url_template: Option<String>,

    /// Field of the item record holding its ID (defaults to the last URL
    /// path segment)
    #[serde(default)]
    pub item_id: Option<String>,

    /// Path (JSON) or selector (HTML) of the total item count
    #[serde(default)]
    pub total_items_path: Option<String>,

    /// Path (JSON) or selector (HTML) of the page size
    #[serde(default)]
    pub page_size_path: Option<String>,

    /// Path (JSON, boolean) or selector (HTML, presence) telling whether
    /// another page follows
    #[serde(default)]
    pub has_more_path: Option<String>,

    /// User variables available to templates
    #[serde(default)]
    pub vars: BTreeMap<String, Value>,

    /// How item pages are read
    #[serde(default)]
    pub detail: DetailSpec,
}

/// Format of a fetched page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageFormat {
    /// JSON document
    #[default]
    Json,
    /// HTML document
    Html,
}

/// How an item page is turned into an item
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DetailSpec {
    /// The decoded JSON body is the item
    #[default]
    Json,
    /// Fields are extracted with CSS selectors (`selector` or
    /// `selector@attribute`)
    Html {
        /// Field name to selector
        fields: BTreeMap<String, String>,
    },
}

impl PageFormat {
    /// Lowercase name
    pub fn as_str(self) -> &'static str {
        match self {
            PageFormat::Json => "json",
            PageFormat::Html => "html",
        }
    }
}

impl DetailSpec {
    /// Lowercase name of the detail mode
    pub fn kind(&self) -> &'static str {
        match self {
            DetailSpec::Json => "json",
            DetailSpec::Html { .. } => "html",
        }
    }
}

impl SiteDefinition {
    /// Render the list URL for a page
    pub fn render_list_url(&self, page: u32) -> Result<String> {
        let mut ctx = self.template_context();
        ctx.set_page(page);
        template::render(&self.list_url, &ctx)
    }

    /// Template context holding the user variables
    pub fn template_context(&self) -> TemplateContext {
        let vars = self
            .vars
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect::<serde_json::Map<_, _>>();
        TemplateContext::with_vars(Value::Object(vars))
    }

    /// Check the definition for mistakes that would only surface mid-run
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::invalid_value("site.name", "cannot be empty"));
        }

        if self.list_url.trim().is_empty() {
            return Err(Error::invalid_value("site.list_url", "cannot be empty"));
        }

        let list_vars = template::extract_variables(&self.list_url);
        if !list_vars.iter().any(|v| v == "page") {
            return Err(Error::invalid_value(
                "site.list_url",
                "must contain {{ page }} to paginate",
            ));
        }
        for var in &list_vars {
            let known = var == "page" || var.starts_with("vars.") || self.vars.contains_key(var);
            if !known {
                return Err(Error::invalid_value(
                    "site.list_url",
                    format!("unknown template variable '{var}'"),
                ));
            }
        }

        if self.items_path.trim().is_empty() {
            return Err(Error::invalid_value("site.items_path", "cannot be empty"));
        }

        match (&self.item_url, &self.item_url_template) {
            (None, None) => {
                return Err(Error::invalid_value(
                    "site.item_url",
                    "either item_url or item_url_template is required",
                ));
            }
            (Some(_), Some(_)) => {
                return Err(Error::invalid_value(
                    "site.item_url",
                    "item_url and item_url_template are mutually exclusive",
                ));
            }
            _ => {}
        }

        if let Some(template) = &self.item_url_template {
            if let Some(var) = template::extract_variables(template)
                .into_iter()
                .find(|v| v == "page")
            {
                return Err(Error::invalid_value(
                    "site.item_url_template",
                    format!("'{var}' is not available for items"),
                ));
            }
        }

        match self.format {
            PageFormat::Json if !self.item_fields.is_empty() => {
                return Err(Error::invalid_value(
                    "site.item_fields",
                    "only applies to HTML list pages",
                ));
            }
            PageFormat::Html if self.item_fields.is_empty() => {
                return Err(Error::invalid_value(
                    "site.item_fields",
                    "HTML list pages need at least one field",
                ));
            }
            _ => {}
        }

        if let Some(base) = &self.base_url {
            url::Url::parse(base)
                .map_err(|e| Error::invalid_value("site.base_url", e.to_string()))?;
        }

        if let DetailSpec::Html { fields } = &self.detail {
            if fields.is_empty() {
                return Err(Error::invalid_value(
                    "site.detail.fields",
                    "at least one field is required",
                ));
            }
        }

        Ok(())
    }
}
