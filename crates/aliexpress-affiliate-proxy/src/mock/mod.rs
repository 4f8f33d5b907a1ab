//! Synthetic payloads for when the upstream API is unavailable.
//!
//! Item order is stable (archetype by archetype, variant by variant) so paging
//! never repeats or skips items; prices, ratings and order counts are drawn
//! fresh on every call. Every affiliate link produced here contains
//! [`MOCK_LINK_MARKER`], so generated links are recognizable from the response
//! alone.

mod catalog;

pub use catalog::{Archetype, CategoryTemplate, ARCHETYPES, CATEGORIES, VARIANTS};

use crate::model::{
    AffiliateRequest, Category, CategoryList, LinkList, Payload, Product, ProductPage,
    PromotionLink, SearchQuery, DEFAULT_CURRENCY,
};
use crate::signing::digest;
use fake::faker::company::en::CompanyName;
use fake::Fake;
use rand::Rng;

/// Literal present in every generated affiliate link.
pub const MOCK_LINK_MARKER: &str = "mock";

const MOCK_LINK_BASE: &str = "https://s.click.aliexpress.com/mock";
const PRODUCT_ID_BASE: u64 = 1_005_006_000_000_000;
const FALLBACK_TRACKING_ID: &str = "default";

/// Position of one item in the stable catalog ordering.
#[derive(Debug, Clone, Copy)]
struct CatalogItem {
    archetype: usize,
    variant: usize,
}

impl CatalogItem {
    fn archetype(&self) -> &'static Archetype {
        &ARCHETYPES[self.archetype]
    }

    fn product_id(&self) -> String {
        (PRODUCT_ID_BASE + (self.archetype as u64) * 100 + self.variant as u64).to_string()
    }

    fn title(&self) -> String {
        format!("{} {}", VARIANTS[self.variant], self.archetype().name)
    }
}

fn expand(archetypes: &[usize]) -> Vec<CatalogItem> {
    archetypes
        .iter()
        .flat_map(|&archetype| {
            (0..VARIANTS.len()).map(move |variant| CatalogItem { archetype, variant })
        })
        .collect()
}

/// Cent-aligned sale price range `archetype` can offer inside the query's
/// price bounds, or `None` when they do not overlap.
fn price_window(archetype: &Archetype, query: &SearchQuery) -> Option<(f64, f64)> {
    let (lo, hi) = archetype.price;
    let lo = query.min_sale_price.map_or(lo, |min| lo.max(min));
    let hi = query.max_sale_price.map_or(hi, |max| hi.min(max));
    let (lo, hi) = ((lo * 100.0).ceil() / 100.0, (hi * 100.0).floor() / 100.0);
    (lo <= hi).then_some((lo, hi))
}

fn random_in<R: Rng + ?Sized>(rng: &mut R, (lo, hi): (f64, f64)) -> f64 {
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}

/// Builds mock payloads. Holds no mutable state; safe to share across tasks.
#[derive(Debug, Clone)]
pub struct MockDataGenerator {
    tracking_id: String,
}

impl Default for MockDataGenerator {
    fn default() -> Self {
        Self::new(FALLBACK_TRACKING_ID)
    }
}

impl MockDataGenerator {
    pub fn new(tracking_id: impl Into<String>) -> Self {
        let tracking_id = tracking_id.into();
        Self {
            tracking_id: if tracking_id.trim().is_empty() {
                FALLBACK_TRACKING_ID.to_string()
            } else {
                tracking_id
            },
        }
    }

    pub fn generate(&self, request: &AffiliateRequest) -> Payload {
        self.generate_with_rng(request, &mut rand::thread_rng())
    }

    pub fn generate_with_rng<R: Rng + ?Sized>(
        &self,
        request: &AffiliateRequest,
        rng: &mut R,
    ) -> Payload {
        match request {
            AffiliateRequest::Categories => Payload::Categories(self.categories()),
            AffiliateRequest::ChildCategories { parent_id } => {
                Payload::Categories(self.child_categories(parent_id))
            }
            AffiliateRequest::ProductSearch(query) => {
                Payload::Products(self.search(query, &self.search_order(query), rng))
            }
            AffiliateRequest::HotProducts(query) => {
                Payload::Products(self.search(query, &self.hot_order(query), rng))
            }
            AffiliateRequest::ProductDetails {
                product_ids,
                target_currency,
                ..
            } => Payload::Products(self.details(product_ids, target_currency.as_deref(), rng)),
            AffiliateRequest::AffiliateLinks { urls } => Payload::Links(self.links(urls)),
        }
    }

    /// A link that points nowhere real and carries the mock marker.
    pub fn mock_link(&self, source: &str) -> String {
        let token = &digest(source)[..12];
        format!(
            "{MOCK_LINK_BASE}/{}?tracking_id={}&source={}",
            token.to_lowercase(),
            urlencoding::encode(&self.tracking_id),
            urlencoding::encode(source)
        )
    }

    fn categories(&self) -> CategoryList {
        let categories: Vec<Category> = CATEGORIES
            .iter()
            .map(|c| Category {
                category_id: c.id.to_string(),
                category_name: c.name.to_string(),
                parent_category_id: c.parent.map(str::to_string),
            })
            .collect();
        CategoryList {
            total_count: categories.len(),
            categories,
        }
    }

    fn child_categories(&self, parent_id: &str) -> CategoryList {
        let mut categories: Vec<Category> = CATEGORIES
            .iter()
            .filter(|c| c.parent == Some(parent_id))
            .map(|c| Category {
                category_id: c.id.to_string(),
                category_name: c.name.to_string(),
                parent_category_id: Some(parent_id.to_string()),
            })
            .collect();

        if categories.is_empty() {
            categories = (1..=3)
                .map(|n| Category {
                    category_id: format!("{parent_id}{n:02}"),
                    category_name: format!("Subcategory {n}"),
                    parent_category_id: Some(parent_id.to_string()),
                })
                .collect();
        }

        CategoryList {
            total_count: categories.len(),
            categories,
        }
    }

    /// Archetype indices inside the price bounds that match keywords and
    /// categories. When keywords and categories match nothing, every archetype
    /// inside the price bounds is used; the price bounds always apply.
    fn search_order(&self, query: &SearchQuery) -> Vec<usize> {
        let priced: Vec<usize> = (0..ARCHETYPES.len())
            .filter(|&i| price_window(&ARCHETYPES[i], query).is_some())
            .collect();

        let selected: Vec<usize> = priced
            .iter()
            .map(|&i| (i, &ARCHETYPES[i]))
            .filter(|(_, a)| query.keywords.as_deref().map_or(true, |k| a.matches(k)))
            .filter(|(_, a)| {
                query.category_ids.is_empty()
                    || query.category_ids.iter().any(|id| id == a.category_id)
            })
            .map(|(i, _)| i)
            .collect();

        if selected.is_empty() {
            priced
        } else {
            selected
        }
    }

    /// Same selection as search, best sellers first.
    fn hot_order(&self, query: &SearchQuery) -> Vec<usize> {
        let mut order = self.search_order(query);
        order.sort_by_key(|&i| std::cmp::Reverse(ARCHETYPES[i].orders.1));
        order
    }

    fn search<R: Rng + ?Sized>(
        &self,
        query: &SearchQuery,
        archetypes: &[usize],
        rng: &mut R,
    ) -> ProductPage {
        let items = expand(archetypes);
        let page_size = query.page_size.max(1) as usize;
        let start = (query.page_no.max(1) as usize - 1).saturating_mul(page_size);
        let currency = query.target_currency.as_deref();

        let products = items
            .iter()
            .skip(start)
            .take(page_size)
            .map(|item| {
                let price =
                    price_window(item.archetype(), query).unwrap_or(item.archetype().price);
                self.product(item, item.product_id(), price, currency, rng)
            })
            .collect();

        ProductPage {
            products,
            total_count: items.len() as u64,
            current_page: query.page_no.max(1),
            page_size: query.page_size.max(1),
        }
    }

    fn details<R: Rng + ?Sized>(
        &self,
        product_ids: &[String],
        currency: Option<&str>,
        rng: &mut R,
    ) -> ProductPage {
        let products: Vec<Product> = product_ids
            .iter()
            .map(|id| {
                let seed: usize = id.bytes().map(usize::from).sum();
                let item = CatalogItem {
                    archetype: seed % ARCHETYPES.len(),
                    variant: (seed / ARCHETYPES.len()) % VARIANTS.len(),
                };
                let price = ARCHETYPES[item.archetype].price;
                self.product(&item, id.clone(), price, currency, rng)
            })
            .collect();

        ProductPage {
            total_count: products.len() as u64,
            current_page: 1,
            page_size: products.len() as u32,
            products,
        }
    }

    fn links(&self, urls: &[String]) -> LinkList {
        let links: Vec<PromotionLink> = urls
            .iter()
            .map(|url| PromotionLink {
                source_value: url.clone(),
                promotion_link: self.mock_link(url),
            })
            .collect();
        LinkList {
            total_count: links.len(),
            links,
        }
    }

    fn product<R: Rng + ?Sized>(
        &self,
        item: &CatalogItem,
        product_id: String,
        price: (f64, f64),
        currency: Option<&str>,
        rng: &mut R,
    ) -> Product {
        let archetype = item.archetype();
        let sale = ((random_in(rng, price) * 100.0).round() / 100.0).clamp(price.0, price.1);
        let discount: u32 = rng.gen_range(5..=60);
        let original = sale / (1.0 - f64::from(discount) / 100.0);
        let commission = random_in(rng, archetype.commission);
        let rating = random_in(rng, archetype.rating);
        let orders = rng.gen_range(archetype.orders.0..=archetype.orders.1);
        let shop: String = CompanyName().fake_with_rng(rng);
        let product_url = format!("https://www.aliexpress.com/item/{product_id}.html");

        Product {
            title: item.title(),
            sale_price: format!("{sale:.2}"),
            original_price: format!("{original:.2}"),
            currency: currency
                .filter(|c| !c.is_empty())
                .unwrap_or(DEFAULT_CURRENCY)
                .to_uppercase(),
            discount: format!("{discount}%"),
            rating: format!("{rating:.1}%"),
            orders,
            commission_rate: format!("{commission:.2}%"),
            image_url: format!(
                "https://ae01.alicdn.com/kf/{}-{}.jpg",
                archetype.image_slug, item.variant
            ),
            promotion_link: Some(self.mock_link(&product_url)),
            product_url,
            category_id: Some(archetype.category_id.to_string()),
            category_name: Some(archetype.category_name.to_string()),
            shop_name: Some(format!("{shop} Store")),
            product_id,
        }
    }
}
