//! Declarative sites
//!
//! Describe a listing in YAML instead of implementing
//! [`ItemListSource`](crate::ItemListSource) by hand:
//!
//! ```yaml
//! name: shop
//! list_url: "https://shop.example.com/api/products?page={{ page }}"
//! items_path: data.products
//! item_url_template: "/api/products/{{ item.slug }}"
//! item_id: sku
//! total_items_path: meta.total
//! page_size_path: meta.per_page
//! ```
//!
//! JSON list pages locate items with dot paths (`data.items`, `list[0]`)
//! or JSONPath when the path has a wildcard. HTML list pages locate items
//! with a CSS selector and read `item_fields` from each match.

mod definition;
mod extract;
mod source;

pub use definition::{DetailSpec, PageFormat, SiteDefinition};
pub use extract::{element_text, extract_all, extract_simple_path, parse_count, FieldSelector};
pub use source::{DeclarativeSite, HtmlRecord, SiteDocument};
