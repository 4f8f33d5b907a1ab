//! Affiliate catalog handlers. Every body is a normalized result.

use crate::api::types::*;
use crate::service::{NormalizedResult, ServiceFacade};
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Body;
use hyper::{Response, StatusCode};

fn result_response(result: &NormalizedResult) -> Response<Full<Bytes>> {
    let status = if result.success {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    json_response(status, result)
}

/// GET /api/categories
pub async fn handle_categories(facade: &ServiceFacade) -> Response<Full<Bytes>> {
    result_response(&facade.get_categories().await)
}

/// GET /api/categories/{parent_id}/children
pub async fn handle_child_categories(
    facade: &ServiceFacade,
    parent_id: &str,
) -> Response<Full<Bytes>> {
    result_response(&facade.get_child_categories(parent_id).await)
}

/// GET /api/products/search
pub async fn handle_search(facade: &ServiceFacade, query: &QueryParams) -> Response<Full<Bytes>> {
    match query.search_query() {
        Ok(search) => result_response(&facade.search_products(search).await),
        Err(e) => bad_request(&e),
    }
}

/// GET /api/products/hot
pub async fn handle_hot(facade: &ServiceFacade, query: &QueryParams) -> Response<Full<Bytes>> {
    match query.search_query() {
        Ok(search) => result_response(&facade.get_hot_products(search).await),
        Err(e) => bad_request(&e),
    }
}

/// GET /api/products/details?product_ids=1,2,3
pub async fn handle_details(facade: &ServiceFacade, query: &QueryParams) -> Response<Full<Bytes>> {
    let result = facade
        .get_product_details(
            query.get_list("product_ids"),
            query.get("target_currency").map(str::to_string),
            query.get("target_language").map(str::to_string),
        )
        .await;
    result_response(&result)
}

/// GET /api/affiliate/links?urls=a,b
pub async fn handle_links_query(
    facade: &ServiceFacade,
    query: &QueryParams,
) -> Response<Full<Bytes>> {
    result_response(&facade.get_affiliate_links(query.get_list("urls")).await)
}

/// POST /api/affiliate/links with `{"urls": [...]}`
pub async fn handle_links_body<B>(facade: &ServiceFacade, body: B) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let bytes = match collect_body(body).await {
        Ok(b) => b,
        Err(e) => return bad_request(&e),
    };

    let request: LinksRequest = match serde_json::from_slice(&bytes) {
        Ok(r) => r,
        Err(e) => return bad_request(&format!("Invalid JSON body: {e}")),
    };

    result_response(&facade.get_affiliate_links(request.urls).await)
}
