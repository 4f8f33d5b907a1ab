//! Route dispatch for the HTTP API.

use crate::api::handlers::{catalog, system};
use crate::api::types::{error_response, not_found, BoxError, QueryParams};
use crate::api::ApiState;
use crate::metrics;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Body;
use hyper::header::{HeaderMap, AUTHORIZATION};
use hyper::{Method, Request, Response, StatusCode};
use std::sync::Arc;
use tracing::debug;

const API_KEY_HEADER: &str = "x-api-key";

/// Parsed route under `/api`
#[derive(Debug, PartialEq)]
enum ApiRoute {
    /// /api/categories
    Categories,
    /// /api/categories/:parent_id/children
    ChildCategories(String),
    /// /api/products/search
    ProductSearch,
    /// /api/products/hot
    HotProducts,
    /// /api/products/details
    ProductDetails,
    /// /api/affiliate/links
    AffiliateLinks,
}

impl ApiRoute {
    /// Parse route from path segments after `/api/`
    fn parse(segments: &[&str]) -> Option<Self> {
        match segments {
            ["categories"] => Some(ApiRoute::Categories),
            ["categories", parent_id, "children"] if !parent_id.is_empty() => Some(
                ApiRoute::ChildCategories(urlencoding::decode(parent_id).ok()?.into_owned()),
            ),
            ["products", "search"] => Some(ApiRoute::ProductSearch),
            ["products", "hot"] => Some(ApiRoute::HotProducts),
            ["products", "details"] => Some(ApiRoute::ProductDetails),
            ["affiliate", "links"] => Some(ApiRoute::AffiliateLinks),
            _ => None,
        }
    }

    /// Metrics label; path parameters are collapsed.
    fn label(&self) -> &'static str {
        match self {
            ApiRoute::Categories => "/api/categories",
            ApiRoute::ChildCategories(_) => "/api/categories/:id/children",
            ApiRoute::ProductSearch => "/api/products/search",
            ApiRoute::HotProducts => "/api/products/hot",
            ApiRoute::ProductDetails => "/api/products/details",
            ApiRoute::AffiliateLinks => "/api/affiliate/links",
        }
    }
}

/// The key presented by the caller, from `X-API-Key` or a bearer token.
/// Blank values count as absent.
fn presented_key(headers: &HeaderMap) -> Option<&str> {
    let api_key = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|k| !k.is_empty());
    api_key.or_else(|| {
        headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|k| !k.is_empty())
    })
}

fn is_authorized(state: &ApiState, headers: &HeaderMap) -> bool {
    !state.auth.is_enabled() || presented_key(headers).is_some_and(|k| state.auth.accepts(k))
}

/// Main request router
pub async fn route_request<B>(
    req: Request<B>,
    state: Arc<ApiState>,
) -> Result<Response<Full<Bytes>>, hyper::Error>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    debug!("API: {} {}", method, path);

    let (label, response) = route_by_path(&method, &path, req, &state).await;
    metrics::record_http_request(label, response.status().as_u16());
    Ok(response)
}

/// Route based on path; returns the metrics label with the response.
async fn route_by_path<B>(
    method: &Method,
    path: &str,
    req: Request<B>,
    state: &ApiState,
) -> (&'static str, Response<Full<Bytes>>)
where
    B: Body,
    B::Error: Into<BoxError>,
{
    match (method, path) {
        (&Method::GET, "/health") => return ("/health", system::handle_health(&state.facade)),
        (&Method::GET, "/metrics") => return ("/metrics", system::handle_metrics()),
        _ => {}
    }

    let Some(rest) = path.strip_prefix("/api/") else {
        return ("unmatched", not_found());
    };
    let segments: Vec<&str> = rest.trim_end_matches('/').split('/').collect();
    let Some(route) = ApiRoute::parse(&segments) else {
        return ("unmatched", not_found());
    };
    let label = route.label();

    if !is_authorized(state, req.headers()) {
        return (
            label,
            error_response(
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Missing or invalid API key",
            ),
        );
    }

    let query = QueryParams::parse(req.uri().query());
    let facade = &state.facade;
    let response = match (method, route) {
        (&Method::GET, ApiRoute::Categories) => catalog::handle_categories(facade).await,
        (&Method::GET, ApiRoute::ChildCategories(parent_id)) => {
            catalog::handle_child_categories(facade, &parent_id).await
        }
        (&Method::GET, ApiRoute::ProductSearch) => catalog::handle_search(facade, &query).await,
        (&Method::GET, ApiRoute::HotProducts) => catalog::handle_hot(facade, &query).await,
        (&Method::GET, ApiRoute::ProductDetails) => catalog::handle_details(facade, &query).await,
        (&Method::GET, ApiRoute::AffiliateLinks) => {
            catalog::handle_links_query(facade, &query).await
        }
        (&Method::POST, ApiRoute::AffiliateLinks) => {
            catalog::handle_links_body(facade, req.into_body()).await
        }
        _ => not_found(),
    };
    (label, response)
}
