//! Request and payload types shared by the live and mock paths.

mod payload;
mod request;

pub use payload::{
    format_price, normalize_upstream, Category, CategoryList, LinkList, Payload, Product,
    ProductPage, PromotionLink,
};
pub use request::{
    AffiliateRequest, Capability, SearchQuery, CATEGORY_GET, DEFAULT_CURRENCY, DEFAULT_LANGUAGE,
    DEFAULT_PAGE_SIZE, HOT_PRODUCT_QUERY, LINK_GENERATE, MAX_BATCH_SIZE, MAX_PAGE_SIZE,
    PRODUCT_DETAIL_GET, PRODUCT_QUERY,
};
