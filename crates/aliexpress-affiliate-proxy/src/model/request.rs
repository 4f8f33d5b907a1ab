//! Capability requests and their upstream parameter sets.

use crate::signing::{ParamValue, Params};

pub const CATEGORY_GET: &str = "aliexpress.affiliate.category.get";
pub const PRODUCT_QUERY: &str = "aliexpress.affiliate.product.query";
pub const PRODUCT_DETAIL_GET: &str = "aliexpress.affiliate.productdetail.get";
pub const LINK_GENERATE: &str = "aliexpress.affiliate.link.generate";
pub const HOT_PRODUCT_QUERY: &str = "aliexpress.affiliate.hotproduct.query";

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 50;
pub const MAX_BATCH_SIZE: usize = 50;
pub const DEFAULT_CURRENCY: &str = "USD";
pub const DEFAULT_LANGUAGE: &str = "EN";

/// The six operations the proxy exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Categories,
    ChildCategories,
    ProductSearch,
    ProductDetails,
    AffiliateLinks,
    HotProducts,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Categories => "categories",
            Capability::ChildCategories => "child_categories",
            Capability::ProductSearch => "product_search",
            Capability::ProductDetails => "product_details",
            Capability::AffiliateLinks => "affiliate_links",
            Capability::HotProducts => "hot_products",
        }
    }
}

/// Product search/hot-product filters.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub keywords: Option<String>,
    pub category_ids: Vec<String>,
    pub page_no: u32,
    pub page_size: u32,
    pub sort: Option<String>,
    pub min_sale_price: Option<f64>,
    pub max_sale_price: Option<f64>,
    pub target_currency: Option<String>,
    pub target_language: Option<String>,
    pub ship_to_country: Option<String>,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            keywords: None,
            category_ids: Vec::new(),
            page_no: 1,
            page_size: DEFAULT_PAGE_SIZE,
            sort: None,
            min_sale_price: None,
            max_sale_price: None,
            target_currency: None,
            target_language: None,
            ship_to_country: None,
        }
    }
}

impl SearchQuery {
    pub fn keywords(keywords: impl Into<String>) -> Self {
        Self {
            keywords: Some(keywords.into()),
            ..Default::default()
        }
    }

    pub fn with_page(mut self, page_no: u32, page_size: u32) -> Self {
        self.page_no = page_no;
        self.page_size = page_size;
        self
    }

    /// Clamp paging into the range the upstream accepts and drop blank filters.
    pub fn normalized(mut self) -> Self {
        self.page_no = self.page_no.max(1);
        self.page_size = self.page_size.clamp(1, MAX_PAGE_SIZE);
        self.keywords = self
            .keywords
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        self.category_ids.retain(|c| !c.trim().is_empty());
        self
    }

    fn insert_params(&self, params: &mut Params, tracking_id: &str) {
        params.insert("keywords".into(), self.keywords.clone().into());
        if !self.category_ids.is_empty() {
            params.insert("category_ids".into(), self.category_ids.join(",").into());
        }
        params.insert("page_no".into(), self.page_no.into());
        params.insert("page_size".into(), self.page_size.into());
        params.insert("sort".into(), self.sort.clone().into());
        params.insert("min_sale_price".into(), self.min_sale_price.into());
        params.insert("max_sale_price".into(), self.max_sale_price.into());
        params.insert(
            "target_currency".into(),
            currency_or_default(&self.target_currency).into(),
        );
        params.insert(
            "target_language".into(),
            language_or_default(&self.target_language).into(),
        );
        params.insert("ship_to_country".into(), self.ship_to_country.clone().into());
        params.insert("tracking_id".into(), tracking_id.into());
    }
}

fn currency_or_default(currency: &Option<String>) -> String {
    currency
        .as_deref()
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_CURRENCY)
        .to_uppercase()
}

fn language_or_default(language: &Option<String>) -> String {
    language
        .as_deref()
        .filter(|l| !l.is_empty())
        .unwrap_or(DEFAULT_LANGUAGE)
        .to_uppercase()
}

/// One call into the service, independent of whether it is answered live or mocked.
#[derive(Debug, Clone, PartialEq)]
pub enum AffiliateRequest {
    Categories,
    ChildCategories {
        parent_id: String,
    },
    ProductSearch(SearchQuery),
    ProductDetails {
        product_ids: Vec<String>,
        target_currency: Option<String>,
        target_language: Option<String>,
    },
    AffiliateLinks {
        urls: Vec<String>,
    },
    HotProducts(SearchQuery),
}

impl AffiliateRequest {
    pub fn capability(&self) -> Capability {
        match self {
            AffiliateRequest::Categories => Capability::Categories,
            AffiliateRequest::ChildCategories { .. } => Capability::ChildCategories,
            AffiliateRequest::ProductSearch(_) => Capability::ProductSearch,
            AffiliateRequest::ProductDetails { .. } => Capability::ProductDetails,
            AffiliateRequest::AffiliateLinks { .. } => Capability::AffiliateLinks,
            AffiliateRequest::HotProducts(_) => Capability::HotProducts,
        }
    }

    /// Upstream method name. Child categories are filtered locally from category.get.
    pub fn method(&self) -> &'static str {
        match self {
            AffiliateRequest::Categories | AffiliateRequest::ChildCategories { .. } => {
                CATEGORY_GET
            }
            AffiliateRequest::ProductSearch(_) => PRODUCT_QUERY,
            AffiliateRequest::ProductDetails { .. } => PRODUCT_DETAIL_GET,
            AffiliateRequest::AffiliateLinks { .. } => LINK_GENERATE,
            AffiliateRequest::HotProducts(_) => HOT_PRODUCT_QUERY,
        }
    }

    /// Trim list arguments and clamp paging.
    pub fn normalized(self) -> Self {
        fn clean(values: Vec<String>) -> Vec<String> {
            values
                .into_iter()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .collect()
        }

        match self {
            AffiliateRequest::ChildCategories { parent_id } => AffiliateRequest::ChildCategories {
                parent_id: parent_id.trim().to_string(),
            },
            AffiliateRequest::ProductSearch(q) => AffiliateRequest::ProductSearch(q.normalized()),
            AffiliateRequest::HotProducts(q) => AffiliateRequest::HotProducts(q.normalized()),
            AffiliateRequest::ProductDetails {
                product_ids,
                target_currency,
                target_language,
            } => AffiliateRequest::ProductDetails {
                product_ids: clean(product_ids),
                target_currency,
                target_language,
            },
            AffiliateRequest::AffiliateLinks { urls } => {
                AffiliateRequest::AffiliateLinks { urls: clean(urls) }
            }
            other => other,
        }
    }

    /// Reject arguments no backend could answer.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            AffiliateRequest::ChildCategories { parent_id } if parent_id.is_empty() => {
                Err("parent category id must not be empty".to_string())
            }
            AffiliateRequest::ProductDetails { product_ids, .. } => {
                if product_ids.is_empty() {
                    return Err("at least one product id is required".to_string());
                }
                if product_ids.len() > MAX_BATCH_SIZE {
                    return Err(format!("at most {MAX_BATCH_SIZE} product ids per request"));
                }
                Ok(())
            }
            AffiliateRequest::AffiliateLinks { urls } => {
                if urls.is_empty() {
                    return Err("at least one url is required".to_string());
                }
                if urls.len() > MAX_BATCH_SIZE {
                    return Err(format!("at most {MAX_BATCH_SIZE} urls per request"));
                }
                Ok(())
            }
            AffiliateRequest::ProductSearch(q) | AffiliateRequest::HotProducts(q) => {
                for (name, price) in [
                    ("min_sale_price", q.min_sale_price),
                    ("max_sale_price", q.max_sale_price),
                ] {
                    if price.is_some_and(|p| !p.is_finite()) {
                        return Err(format!("{name} must be a finite number"));
                    }
                }
                match (q.min_sale_price, q.max_sale_price) {
                    (Some(min), Some(max)) if min > max => Err(format!(
                        "min_sale_price ({min}) is greater than max_sale_price ({max})"
                    )),
                    _ => Ok(()),
                }
            }
            _ => Ok(()),
        }
    }

    /// Caller parameters for the upstream call (system fields are added when signing).
    pub fn to_params(&self, tracking_id: &str) -> Params {
        let mut params = Params::new();
        match self {
            AffiliateRequest::Categories | AffiliateRequest::ChildCategories { .. } => {}
            AffiliateRequest::ProductSearch(q) | AffiliateRequest::HotProducts(q) => {
                q.insert_params(&mut params, tracking_id);
            }
            AffiliateRequest::ProductDetails {
                product_ids,
                target_currency,
                target_language,
            } => {
                params.insert("product_ids".into(), product_ids.join(",").into());
                params.insert(
                    "target_currency".into(),
                    currency_or_default(target_currency).into(),
                );
                params.insert(
                    "target_language".into(),
                    language_or_default(target_language).into(),
                );
                params.insert("tracking_id".into(), tracking_id.into());
            }
            AffiliateRequest::AffiliateLinks { urls } => {
                params.insert("promotion_link_type".into(), ParamValue::Integer(0));
                params.insert("source_values".into(), urls.join(",").into());
                params.insert("tracking_id".into(), tracking_id.into());
            }
        }
        params
    }
}
