//! Normalized payload shapes shared by live and mock answers.

use super::request::{AffiliateRequest, SearchQuery, DEFAULT_CURRENCY};
use crate::upstream::{scalar_string, UpstreamError};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    pub category_id: String,
    pub category_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_category_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryList {
    pub categories: Vec<Category>,
    pub total_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub product_id: String,
    pub title: String,
    /// Two-decimal string, e.g. `"19.99"`
    pub sale_price: String,
    pub original_price: String,
    pub currency: String,
    /// Percentage string, e.g. `"35%"`
    pub discount: String,
    /// Positive feedback rate, e.g. `"96.4%"`
    pub rating: String,
    pub orders: u64,
    /// Percentage string, e.g. `"7.50%"`
    pub commission_rate: String,
    pub image_url: String,
    pub product_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promotion_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total_count: u64,
    pub current_page: u32,
    pub page_size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromotionLink {
    pub source_value: String,
    pub promotion_link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkList {
    pub links: Vec<PromotionLink>,
    pub total_count: usize,
}

/// The `data` of a normalized result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Categories(CategoryList),
    Products(ProductPage),
    Links(LinkList),
}

impl Payload {
    pub fn is_empty(&self) -> bool {
        match self {
            Payload::Categories(c) => c.categories.is_empty(),
            Payload::Products(p) => p.products.is_empty(),
            Payload::Links(l) => l.links.is_empty(),
        }
    }
}

/// Upstream lists are wrapped twice: `{"products": {"product": [...]}}`.
fn nested_list<'a>(raw: &'a Value, outer: &str, inner: &str) -> &'a [Value] {
    raw.get(outer)
        .and_then(|o| o.get(inner))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn first_string(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| scalar_string(item.get(*k)))
}

/// Render a price with two decimals; leave unparseable values untouched.
pub fn format_price(raw: &str) -> String {
    match raw.trim().parse::<f64>() {
        Ok(p) if p.is_finite() => format!("{p:.2}"),
        _ => raw.to_string(),
    }
}

fn category_from_upstream(item: &Value) -> Option<Category> {
    Some(Category {
        category_id: scalar_string(item.get("category_id"))?,
        category_name: scalar_string(item.get("category_name")).unwrap_or_default(),
        parent_category_id: scalar_string(item.get("parent_category_id")),
    })
}

fn product_from_upstream(item: &Value) -> Option<Product> {
    let product_id = scalar_string(item.get("product_id"))?;
    let price = |keys: &[&str]| {
        first_string(item, keys)
            .map(|p| format_price(&p))
            .unwrap_or_default()
    };

    Some(Product {
        title: first_string(item, &["product_title", "title"]).unwrap_or_default(),
        sale_price: price(&["target_sale_price", "sale_price"]),
        original_price: price(&["target_original_price", "original_price"]),
        currency: first_string(item, &["target_sale_price_currency", "sale_price_currency"])
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        discount: first_string(item, &["discount"]).unwrap_or_default(),
        rating: first_string(item, &["evaluate_rate"]).unwrap_or_default(),
        orders: scalar_string(item.get("lastest_volume"))
            .and_then(|v| v.parse().ok())
            .unwrap_or(0),
        commission_rate: first_string(item, &["commission_rate", "hot_product_commission_rate"])
            .unwrap_or_default(),
        image_url: first_string(item, &["product_main_image_url"]).unwrap_or_default(),
        product_url: first_string(item, &["product_detail_url"]).unwrap_or_default(),
        promotion_link: first_string(item, &["promotion_link"]),
        category_id: first_string(item, &["second_level_category_id", "first_level_category_id"]),
        category_name: first_string(
            item,
            &["second_level_category_name", "first_level_category_name"],
        ),
        shop_name: first_string(item, &["shop_name"]),
        product_id,
    })
}

fn product_page(raw: &Value, query: Option<&SearchQuery>) -> ProductPage {
    let products: Vec<Product> = nested_list(raw, "products", "product")
        .iter()
        .filter_map(product_from_upstream)
        .collect();
    let total_count = scalar_string(raw.get("total_record_count"))
        .and_then(|v| v.parse().ok())
        .unwrap_or(products.len() as u64);
    let current_page = scalar_string(raw.get("current_page_no"))
        .and_then(|v| v.parse().ok())
        .or(query.map(|q| q.page_no))
        .unwrap_or(1);
    let page_size = query
        .map(|q| q.page_size)
        .unwrap_or(products.len() as u32);

    ProductPage {
        products,
        total_count,
        current_page,
        page_size,
    }
}

/// Reshape an unwrapped upstream result into the payload for `request`.
pub fn normalize_upstream(request: &AffiliateRequest, raw: &Value) -> Result<Payload, UpstreamError> {
    if !raw.is_object() {
        return Err(UpstreamError::decode(format!(
            "expected a result object for {}, got {}",
            request.method(),
            raw
        )));
    }

    let payload = match request {
        AffiliateRequest::Categories => {
            let categories: Vec<Category> = nested_list(raw, "categories", "category")
                .iter()
                .filter_map(category_from_upstream)
                .collect();
            Payload::Categories(CategoryList {
                total_count: categories.len(),
                categories,
            })
        }
        AffiliateRequest::ChildCategories { parent_id } => {
            let categories: Vec<Category> = nested_list(raw, "categories", "category")
                .iter()
                .filter_map(category_from_upstream)
                .filter(|c| c.parent_category_id.as_deref() == Some(parent_id.as_str()))
                .collect();
            Payload::Categories(CategoryList {
                total_count: categories.len(),
                categories,
            })
        }
        AffiliateRequest::ProductSearch(q) | AffiliateRequest::HotProducts(q) => {
            Payload::Products(product_page(raw, Some(q)))
        }
        AffiliateRequest::ProductDetails { .. } => Payload::Products(product_page(raw, None)),
        AffiliateRequest::AffiliateLinks { .. } => {
            let links: Vec<PromotionLink> = nested_list(raw, "promotion_links", "promotion_link")
                .iter()
                .filter_map(|item| {
                    Some(PromotionLink {
                        source_value: scalar_string(item.get("source_value"))?,
                        promotion_link: scalar_string(item.get("promotion_link"))?,
                    })
                })
                .collect();
            Payload::Links(LinkList {
                total_count: links.len(),
                links,
            })
        }
    };

    Ok(payload)
}
